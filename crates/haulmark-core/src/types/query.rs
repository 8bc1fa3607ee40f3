//! Row and query types exchanged with a [`RecordStore`](crate::traits::RecordStore).

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::filter::FilterField;
use crate::types::sorting::SortField;

/// An untyped record: named fields mapped to JSON scalars.
pub type Row = serde_json::Map<String, Value>;

/// Column that every collection uses as its primary key.
pub const ID_FIELD: &str = "id";

/// Column that every collection stamps on insert.
pub const CREATED_AT_FIELD: &str = "created_at";

/// A select request: conjunction of filters plus an optional ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    /// Filters that must all match.
    pub filters: Vec<FilterField>,
    /// Result ordering.
    pub order: Option<SortField>,
}

impl SelectQuery {
    /// A query matching every visible row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter.
    pub fn filter(mut self, filter: FilterField) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add several filters.
    pub fn filters(mut self, filters: impl IntoIterator<Item = FilterField>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Set the ordering.
    pub fn order_by(mut self, order: SortField) -> Self {
        self.order = Some(order);
        self
    }
}

/// Serialize a value into a row. The value must serialize to a JSON object.
pub fn to_row<T: Serialize>(value: &T) -> AppResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::validation(format!(
            "Expected an object of fields, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Decode a row into a typed record.
pub fn from_row<T: DeserializeOwned>(row: Row) -> AppResult<T> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Drop `null` entries so that a partial update only touches provided fields.
pub fn strip_nulls(mut row: Row) -> Row {
    row.retain(|_, value| !value.is_null());
    row
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
