//! Removal of empty values from request bodies and query maps
//!
//! A top-level key is dropped when its value is `null`, `false`, `""`, `[]` or
//! `{}`. Numbers are kept, zero included. Nested values are left untouched.

use serde_json::{Map, Value};

/// Whether a value counts as empty for request shaping.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

/// Drop empty top-level entries of a map.
pub fn strip_map(mut map: Map<String, Value>) -> Map<String, Value> {
    map.retain(|_, v| !is_empty_value(v));
    map
}

/// Strip an object in place; other values pass through unchanged.
pub fn strip(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_map(map)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drops_empty_and_null() {
        let body = json!({"name": "", "description": "d", "x": null});
        assert_eq!(strip(body), json!({"description": "d"}));
    }

    #[test]
    fn drops_false_and_empty_collections() {
        let body = json!({"a": false, "b": [], "c": {}, "d": true, "e": [1], "f": {"k": null}});
        assert_eq!(strip(body), json!({"d": true, "e": [1], "f": {"k": null}}));
    }

    #[test]
    fn keeps_zero() {
        let body = json!({"maxResults": 0, "ratio": 0.0});
        assert_eq!(strip(body.clone()), body);
    }

    #[test]
    fn non_objects_pass_through() {
        assert_eq!(strip(json!([null, ""])), json!([null, ""]));
        assert_eq!(strip(Value::Null), Value::Null);
    }
}
