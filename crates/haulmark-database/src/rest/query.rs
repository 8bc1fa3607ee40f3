//! Encoding of filters and ordering into PostgREST query parameters.

use haulmark_core::types::{FilterField, FilterOp, FilterValue, SelectQuery, SortField};

/// Query parameters for a select request.
pub fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(query.filters.iter().map(filter_param));
    if let Some(order) = &query.order {
        params.push(("order".to_string(), order_value(order)));
    }
    params
}

/// The `column=op.value` pair for one filter.
pub fn filter_param(filter: &FilterField) -> (String, String) {
    let value = match filter.op {
        FilterOp::Eq => format!("eq.{}", filter.value.to_query_string()),
        FilterOp::Ne => format!("neq.{}", filter.value.to_query_string()),
        FilterOp::Gt => format!("gt.{}", filter.value.to_query_string()),
        FilterOp::Gte => format!("gte.{}", filter.value.to_query_string()),
        FilterOp::Lt => format!("lt.{}", filter.value.to_query_string()),
        FilterOp::Lte => format!("lte.{}", filter.value.to_query_string()),
        FilterOp::Like => format!("like.{}", wildcard(&filter.value)),
        FilterOp::ILike => format!("ilike.{}", wildcard(&filter.value)),
        FilterOp::In => format!("in.({})", in_list(&filter.value)),
        FilterOp::IsNull => "is.null".to_string(),
        FilterOp::IsNotNull => "not.is.null".to_string(),
    };
    (filter.field.clone(), value)
}

/// The `id=eq.<id>` pair addressing a single row.
pub fn id_param(id: &str) -> (String, String) {
    ("id".to_string(), format!("eq.{id}"))
}

fn order_value(order: &SortField) -> String {
    format!("{}.{}.nullslast", order.field, order.direction.as_str())
}

/// PostgREST accepts `*` as the `LIKE` wildcard in URLs.
fn wildcard(value: &FilterValue) -> String {
    value.to_query_string().replace('%', "*")
}

fn in_list(value: &FilterValue) -> String {
    match value {
        FilterValue::StringList(items) => items
            .iter()
            .map(|item| quote_reserved(item))
            .collect::<Vec<_>>()
            .join(","),
        other => quote_reserved(&other.to_query_string()),
    }
}

fn quote_reserved(item: &str) -> String {
    if item.contains([',', '(', ')', '"']) {
        format!("\"{}\"", item.replace('"', "\\\""))
    } else {
        item.to_string()
    }
}
