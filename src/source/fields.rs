//! Lenient field access on flow API documents.
//!
//! The API is treated as loosely typed: absent fields yield `None` (or an
//! empty slice) and counters are accepted either as JSON numbers or as
//! numeric strings such as `"1,024"`.

use serde_json::Value;

/// Walk `path` through nested objects.
pub fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

/// Text at `path`. Numbers and booleans are rendered; null is absent.
pub fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    match at(value, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Non-negative integer at `path`. Negative values clamp to 0.
pub fn u64_at(value: &Value, path: &[&str]) -> Option<u64> {
    match at(value, path)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => parse_count(s),
        _ => None,
    }
}

/// Floating point value at `path`, numeric strings included.
pub fn f64_at(value: &Value, path: &[&str]) -> Option<f64> {
    match at(value, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Elements of the array at `key`, or an empty slice.
pub fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// True if `key` holds an array, even an empty one.
pub fn has_array(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(Value::is_array)
}

/// Identifier of an entity: `id`, falling back to `component.id`.
pub fn entity_id(entity: &Value) -> Option<String> {
    text_at(entity, &["id"])
        .or_else(|| text_at(entity, &["component", "id"]))
        .filter(|id| !id.is_empty())
}

fn parse_count(s: &str) -> Option<u64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<u64>()
        .ok()
        .or_else(|| cleaned.parse::<f64>().ok().map(|f| f.max(0.0) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_text() {
        let doc = json!({"component": {"name": "Ingest", "version": 3}});
        assert_eq!(text_at(&doc, &["component", "name"]).as_deref(), Some("Ingest"));
        assert_eq!(text_at(&doc, &["component", "version"]).as_deref(), Some("3"));
        assert_eq!(text_at(&doc, &["component", "type"]), None);
    }

    #[test]
    fn test_counts_from_numbers_and_strings() {
        let doc = json!({"a": 12, "b": "1,024", "c": "n/a", "d": -3, "e": 2.9});
        assert_eq!(u64_at(&doc, &["a"]), Some(12));
        assert_eq!(u64_at(&doc, &["b"]), Some(1024));
        assert_eq!(u64_at(&doc, &["c"]), None);
        assert_eq!(u64_at(&doc, &["d"]), Some(0));
        assert_eq!(u64_at(&doc, &["e"]), Some(2));
    }

    #[test]
    fn test_array_defaults_to_empty() {
        let doc = json!({"processors": [{"id": "p"}], "ports": null});
        assert_eq!(array(&doc, "processors").len(), 1);
        assert!(array(&doc, "ports").is_empty());
        assert!(array(&doc, "missing").is_empty());
        assert!(has_array(&doc, "processors"));
        assert!(!has_array(&doc, "ports"));
    }

    #[test]
    fn test_entity_id_fallback() {
        assert_eq!(entity_id(&json!({"id": "x"})).as_deref(), Some("x"));
        assert_eq!(entity_id(&json!({"component": {"id": "y"}})).as_deref(), Some("y"));
        assert_eq!(entity_id(&json!({"id": ""})), None);
        assert_eq!(entity_id(&json!({})), None);
    }
}
