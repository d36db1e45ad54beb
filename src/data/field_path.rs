use serde_json::Value;

/// Resolve a dot-separated path against a JSON value, fanning out through
/// arrays.
///
/// At each step, if the current value is an array the remaining path is
/// resolved against every element and the results concatenated. The check
/// runs before the exhausted-path check, so a path that ends on an array
/// yields the array's elements. A missing key or a scalar hit mid-path
/// yields nothing for that branch. Resolution never fails; the worst case
/// is an empty result.
pub fn resolve<'a>(value: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let mut out = Vec::new();
    resolve_into(value, &segments, &mut out);
    out
}

fn resolve_into<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
    if let Value::Array(items) = value {
        for item in items {
            resolve_into(item, segments, out);
        }
        return;
    }

    match segments.split_first() {
        None => out.push(value),
        Some((head, rest)) => {
            if let Some(next) = value.get(*head) {
                resolve_into(next, rest, out);
            }
        }
    }
}

/// Text form of a resolved value for matching and default cell rendering.
///
/// Null carries no matchable text and yields None, as do objects and
/// arrays (an array never reaches here from `resolve`, which fans out).
pub fn match_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// All matchable text values reachable from a payload via a path.
pub fn resolve_text(value: &Value, path: &str) -> Vec<String> {
    resolve(value, path)
        .into_iter()
        .filter_map(match_text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolves_plain_nested_path() {
        let record = json!({"project": {"name": "Alpha"}});
        let values = resolve(&record, "project.name");
        assert_eq!(values, vec![&json!("Alpha")]);
    }

    #[test]
    fn test_fans_out_through_arrays() {
        let record = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        let values = resolve(&record, "a.b.c");
        assert_eq!(values, vec![&json!(1), &json!(2)]);
    }

    #[test]
    fn test_missing_path_yields_empty() {
        let record = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        assert!(resolve(&record, "a.x.y").is_empty());
    }

    #[test]
    fn test_scalar_mid_path_yields_empty() {
        let record = json!({"a": 5});
        assert!(resolve(&record, "a.b").is_empty());
    }

    #[test]
    fn test_terminal_array_yields_elements() {
        let record = json!({"tags": ["red", "green"]});
        let values = resolve_text(&record, "tags");
        assert_eq!(values, vec!["red", "green"]);
    }

    #[test]
    fn test_null_is_not_matchable() {
        let record = json!({"name": null});
        assert_eq!(resolve(&record, "name").len(), 1);
        assert!(resolve_text(&record, "name").is_empty());
    }

    #[test]
    fn test_numbers_and_bools_stringify() {
        let record = json!({"age": 30, "active": true});
        assert_eq!(resolve_text(&record, "age"), vec!["30"]);
        assert_eq!(resolve_text(&record, "active"), vec!["true"]);
    }
}
