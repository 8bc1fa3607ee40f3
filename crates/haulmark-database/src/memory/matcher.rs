//! Filter evaluation and ordering over untyped rows.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use haulmark_core::types::{FilterField, FilterOp, FilterValue, Row, SortDirection, SortField};

/// Whether `row` satisfies every filter.
pub fn matches_all(row: &Row, filters: &[FilterField]) -> bool {
    filters.iter().all(|filter| matches(row, filter))
}

/// Whether `row` satisfies one filter.
pub fn matches(row: &Row, filter: &FilterField) -> bool {
    let value = row.get(&filter.field).filter(|v| !v.is_null());

    match filter.op {
        FilterOp::IsNull => value.is_none(),
        FilterOp::IsNotNull => value.is_some(),
        FilterOp::In => match (&filter.value, value.and_then(scalar_string)) {
            (FilterValue::StringList(items), Some(actual)) => items.contains(&actual),
            _ => false,
        },
        FilterOp::Like | FilterOp::ILike => {
            let (Some(actual), FilterValue::String(pattern)) =
                (value.and_then(scalar_string), &filter.value)
            else {
                return false;
            };
            if filter.op == FilterOp::ILike {
                like(&actual.to_lowercase(), &pattern.to_lowercase())
            } else {
                like(&actual, pattern)
            }
        }
        op => {
            let Some(actual) = value else {
                return false;
            };
            let ordering = compare_to_filter(actual, &filter.value);
            match op {
                FilterOp::Eq => ordering == Some(Ordering::Equal),
                FilterOp::Ne => ordering != Some(Ordering::Equal),
                FilterOp::Gt => ordering == Some(Ordering::Greater),
                FilterOp::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                FilterOp::Lt => ordering == Some(Ordering::Less),
                FilterOp::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                _ => false,
            }
        }
    }
}

/// Sort rows in place. Nulls sort last in either direction; ties keep
/// insertion order.
pub fn sort_rows(rows: &mut [Row], order: &SortField) {
    rows.sort_by(|a, b| {
        let left = a.get(&order.field).filter(|v| !v.is_null());
        let right = b.get(&order.field).filter(|v| !v.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => {
                let ordering = compare_values(l, r);
                match order.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    });
}

fn compare_to_filter(actual: &Value, expected: &FilterValue) -> Option<Ordering> {
    match expected {
        FilterValue::Integer(i) => actual.as_f64().map(|a| a.total_cmp(&(*i as f64))),
        FilterValue::Float(f) => actual.as_f64().map(|a| a.total_cmp(f)),
        FilterValue::Boolean(b) => actual.as_bool().map(|a| a.cmp(b)),
        // A string filter is coerced to the column's type, as the hosted
        // service does.
        FilterValue::String(s) => match actual {
            Value::Number(n) => {
                let expected = s.parse::<f64>().ok()?;
                n.as_f64().map(|a| a.total_cmp(&expected))
            }
            Value::Bool(b) => s.parse::<bool>().ok().map(|e| b.cmp(&e)),
            _ => Some(compare_values(actual, &Value::String(s.clone()))),
        },
        FilterValue::StringList(_) | FilterValue::Null => None,
    }
}

/// Rank of a value's kind; values of different kinds order by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Kind {
    Null,
    Bool,
    Number,
    Timestamp,
    Text,
    Composite,
}

fn kind_of(value: &Value) -> Kind {
    match value {
        Value::Null => Kind::Null,
        Value::Bool(_) => Kind::Bool,
        Value::Number(_) => Kind::Number,
        Value::String(s) if parse_timestamp(s).is_some() => Kind::Timestamp,
        Value::String(_) => Kind::Text,
        Value::Array(_) | Value::Object(_) => Kind::Composite,
    }
}

/// Total order over JSON values: by kind first, then numbers numerically,
/// timestamps chronologically and text lexically.
fn compare_values(left: &Value, right: &Value) -> Ordering {
    let (lk, rk) = (kind_of(left), kind_of(right));
    if lk != rk {
        return lk.cmp(&rk);
    }
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        (Value::Number(l), Value::Number(r)) => {
            let l = l.as_f64().unwrap_or(f64::NAN);
            let r = r.as_f64().unwrap_or(f64::NAN);
            l.total_cmp(&r)
        }
        (Value::String(l), Value::String(r)) => match (parse_timestamp(l), parse_timestamp(r)) {
            (Some(lt), Some(rt)) => lt.cmp(&rt),
            _ => l.cmp(r),
        },
        _ => left.to_string().cmp(&right.to_string()),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// SQL `LIKE` with `%` (any run) and `_` (one character).
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}
