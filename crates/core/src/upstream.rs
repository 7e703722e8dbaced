//! Pure helpers for interpreting upstream responses

use serde_json::Value;

/// Tool text for a non-success upstream status, e.g.
/// `"Failed to get assets: Not Found"`.
pub fn failure_message(prefix: &str, status_text: &str) -> String {
    format!("{prefix}: {status_text}")
}

/// Take `body[key]` when present, otherwise the body itself.
///
/// Some endpoints wrap their list (`{"categories": [...]}`) and some return a
/// bare array, depending on query options and API version.
pub fn extract_list(body: Value, key: &str) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

/// Number of elements in an array value, zero for anything else.
pub fn item_count(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

/// Summary line such as `"12 tags"`.
pub fn count_summary(value: &Value, noun: &str) -> String {
    format!("{} {noun}", item_count(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_message() {
        assert_eq!(
            failure_message("Failed to get transactions", "Unauthorized"),
            "Failed to get transactions: Unauthorized"
        );
    }

    #[test]
    fn test_extract_wrapped_list() {
        let body = json!({"assets": [{"id": 1}], "other": true});
        assert_eq!(extract_list(body, "assets"), json!([{"id": 1}]));
    }

    #[test]
    fn test_extract_bare_list() {
        let body = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(extract_list(body.clone(), "tags"), body);
    }

    #[test]
    fn test_extract_missing_key_keeps_object() {
        let body = json!({"error": "nope"});
        assert_eq!(extract_list(body.clone(), "crypto"), body);
    }

    #[test]
    fn test_count_summary() {
        assert_eq!(count_summary(&json!([1, 2, 3]), "tags"), "3 tags");
        assert_eq!(count_summary(&json!({"a": 1}), "tags"), "0 tags");
    }
}
