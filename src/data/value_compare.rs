use serde_json::Value;
use std::cmp::Ordering;

/// Compare two sort-key values with native same-kind ordering.
///
/// Numbers compare numerically, strings and booleans through Ord.
/// Anything non-comparable (missing field, null, mixed kinds, nested
/// values) compares Equal so a stable sort leaves relative order
/// unchanged.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}
