//! Token-Oriented Object Notation (TOON) encoder
//!
//! TOON keeps the JSON data model but drops most of its punctuation. Objects
//! become indented `key: value` lines, arrays carry their length in the header
//! (`key[3]: a,b,c`), and arrays of uniform flat records hoist their keys into
//! a single header so each record renders as one comma-separated row:
//!
//! ```text
//! transactions[2]{id,payee}:
//!   1,Coffee Shop
//!   2,Bakery
//! ```
//!
//! Arrays that are neither primitive nor uniform fall back to a `- ` list.
//!
//! Output follows the TOON v2 layout of the `@toon-format/toon` reference
//! encoder: two-space indentation, comma delimiter, no `#` length markers.
//! Inside a `- ` list item the first field shares the hyphen line and the
//! remaining fields align under it, so the rows of a tabular array opening an
//! item sit two levels below the hyphen:
//!
//! ```text
//! [1]:
//!   - items[2]{a}:
//!       1
//!       2
//!     total: 2
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

const INDENT: &str = "  ";
const DELIMITER: &str = ",";

/// Encode a JSON value as TOON text (no trailing newline).
pub fn encode(value: &Value) -> String {
    let mut lines = Vec::new();

    match value {
        Value::Object(map) => encode_object(map, 0, &mut lines),
        Value::Array(items) => encode_array("", items, 0, &mut lines),
        primitive => lines.push(encode_primitive(primitive)),
    }

    lines.join("\n")
}

fn push_line(lines: &mut Vec<String>, depth: usize, content: String) {
    lines.push(format!("{}{}", INDENT.repeat(depth), content));
}

fn encode_object(map: &Map<String, Value>, depth: usize, lines: &mut Vec<String>) {
    for (key, value) in map {
        encode_field(&encode_key(key), value, depth, lines);
    }
}

fn encode_field(key: &str, value: &Value, depth: usize, lines: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            push_line(lines, depth, format!("{key}:"));
            encode_object(map, depth + 1, lines);
        }
        Value::Array(items) => encode_array(key, items, depth, lines),
        primitive => push_line(lines, depth, format!("{key}: {}", encode_primitive(primitive))),
    }
}

/// Encode an array whose header starts with `label` (a key, `- `, or nothing at the root).
fn encode_array(label: &str, items: &[Value], depth: usize, lines: &mut Vec<String>) {
    let len = items.len();

    if items.is_empty() {
        push_line(lines, depth, format!("{label}[0]:"));
        return;
    }

    if items.iter().all(is_primitive) {
        let row = items
            .iter()
            .map(encode_primitive)
            .collect::<Vec<_>>()
            .join(DELIMITER);
        push_line(lines, depth, format!("{label}[{len}]: {row}"));
        return;
    }

    if let Some(fields) = tabular_fields(items) {
        let header = fields
            .iter()
            .map(|field| encode_key(field))
            .collect::<Vec<_>>()
            .join(DELIMITER);
        push_line(lines, depth, format!("{label}[{len}]{{{header}}}:"));

        for item in items.iter().filter_map(Value::as_object) {
            let row = fields
                .iter()
                .map(|field| item.get(*field).map(encode_primitive).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(DELIMITER);
            push_line(lines, depth + 1, row);
        }
        return;
    }

    push_line(lines, depth, format!("{label}[{len}]:"));
    for item in items {
        encode_list_item(item, depth + 1, lines);
    }
}

fn encode_list_item(item: &Value, depth: usize, lines: &mut Vec<String>) {
    match item {
        Value::Array(items) => encode_array("- ", items, depth, lines),
        Value::Object(map) if map.is_empty() => push_line(lines, depth, "-".to_string()),
        Value::Object(map) => {
            // The first field shares the hyphen line; the rest align under it.
            let mut nested = Vec::new();
            encode_object(map, depth + 1, &mut nested);

            let nested_indent = INDENT.len() * (depth + 1);
            for (index, line) in nested.into_iter().enumerate() {
                if index == 0 {
                    push_line(lines, depth, format!("- {}", &line[nested_indent..]));
                } else {
                    lines.push(line);
                }
            }
        }
        primitive => push_line(lines, depth, format!("- {}", encode_primitive(primitive))),
    }
}

/// Keys shared by every element, when the array is a list of flat records
/// with identical key sets.
fn tabular_fields(items: &[Value]) -> Option<Vec<&str>> {
    let first = items.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }

    let fields: Vec<&str> = first.keys().map(String::as_str).collect();

    let uniform = items.iter().all(|item| match item.as_object() {
        Some(map) => {
            map.len() == fields.len()
                && fields
                    .iter()
                    .all(|field| map.get(*field).is_some_and(is_primitive))
        }
        None => false,
    });

    uniform.then_some(fields)
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn encode_primitive(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => encode_number(n),
        Value::String(s) => encode_string(s),
        // Containers never reach here; render them as JSON rather than panic.
        other => other.to_string(),
    }
}

fn encode_number(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }

    match number.as_f64() {
        // -0 normalizes to 0; Display for f64 never uses exponent notation.
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

fn encode_string(s: &str) -> String {
    if needs_quotes(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

fn encode_key(key: &str) -> String {
    static BARE_KEY: OnceLock<Regex> = OnceLock::new();
    let bare = BARE_KEY.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").unwrap());

    if bare.is_match(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn needs_quotes(s: &str) -> bool {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    let numeric =
        NUMERIC.get_or_init(|| Regex::new(r"^-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?$").unwrap());

    s.is_empty()
        || s.trim() != s
        || matches!(s, "true" | "false" | "null")
        || numeric.is_match(s)
        || s.starts_with('-')
        || s.chars().any(|c| {
            matches!(c, ':' | '"' | '\\' | '[' | ']' | '{' | '}' | ',') || c.is_control()
        })
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_flat_object() {
        let value = json!({"active": true, "age": 36, "name": "Ada", "nickname": null});
        assert_eq!(
            encode(&value),
            "active: true\nage: 36\nname: Ada\nnickname: null"
        );
    }

    #[test]
    fn test_encode_nested_object() {
        let value = json!({"account": {"currency": "usd", "id": 7}});
        assert_eq!(encode(&value), "account:\n  currency: usd\n  id: 7");
    }

    #[test]
    fn test_encode_uniform_records_as_table() {
        let value = json!([
            {"id": 1, "payee": "Coffee Shop"},
            {"id": 2, "payee": "Bakery"}
        ]);
        assert_eq!(
            encode(&value),
            "[2]{id,payee}:\n  1,Coffee Shop\n  2,Bakery"
        );
    }

    #[test]
    fn test_encode_keyed_table() {
        let value = json!({"tags": [{"id": 1, "name": "travel"}, {"id": 2, "name": "food"}]});
        assert_eq!(encode(&value), "tags[2]{id,name}:\n  1,travel\n  2,food");
    }

    #[test]
    fn test_encode_primitive_array() {
        let value = json!({"ids": [1, 2, 3]});
        assert_eq!(encode(&value), "ids[3]: 1,2,3");
    }

    #[test]
    fn test_encode_empty_containers() {
        assert_eq!(encode(&json!({"items": []})), "items[0]:");
        assert_eq!(encode(&json!({})), "");
        assert_eq!(encode(&json!([])), "[0]:");
    }

    #[test]
    fn test_encode_root_primitives() {
        assert_eq!(encode(&json!(null)), "null");
        assert_eq!(encode(&json!(42)), "42");
        assert_eq!(encode(&json!("hello")), "hello");
    }

    #[test]
    fn test_non_uniform_records_use_list_form() {
        let value = json!({"items": [{"a": 1}, {"b": 2}]});
        assert_eq!(encode(&value), "items[2]:\n  - a: 1\n  - b: 2");
    }

    #[test]
    fn test_mixed_list_with_nested_fields() {
        let value = json!({"items": [1, {"a": 1, "b": [1, 2]}]});
        assert_eq!(encode(&value), "items[2]:\n  - 1\n  - a: 1\n    b[2]: 1,2");
    }

    #[test]
    fn test_records_with_nested_values_are_not_tabular() {
        let value = json!([{"id": 1, "tags": [1]}, {"id": 2, "tags": [2]}]);
        assert_eq!(
            encode(&value),
            "[2]:\n  - id: 1\n    tags[1]: 1\n  - id: 2\n    tags[1]: 2"
        );
    }

    #[test]
    fn test_table_opening_a_list_item() {
        let value = json!([{"items": [{"a": 1}, {"a": 2}], "total": 2}]);
        assert_eq!(
            encode(&value),
            "[1]:\n  - items[2]{a}:\n      1\n      2\n    total: 2"
        );
    }

    #[test]
    fn test_list_of_arrays() {
        let value = json!({"pairs": [[1, 2], [3, 4]]});
        assert_eq!(encode(&value), "pairs[2]:\n  - [2]: 1,2\n  - [2]: 3,4");
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(encode_string(""), "\"\"");
        assert_eq!(encode_string("a,b"), "\"a,b\"");
        assert_eq!(encode_string("true"), "\"true\"");
        assert_eq!(encode_string("null"), "\"null\"");
        assert_eq!(encode_string("42"), "\"42\"");
        assert_eq!(encode_string("-12.50"), "\"-12.50\"");
        assert_eq!(encode_string(" padded"), "\" padded\"");
        assert_eq!(encode_string("- item"), "\"- item\"");
        assert_eq!(encode_string("key: value"), "\"key: value\"");
        assert_eq!(encode_string("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(encode_string("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(encode_string("Coffee Shop"), "Coffee Shop");
        assert_eq!(encode_string("café"), "café");
    }

    #[test]
    fn test_key_quoting() {
        assert_eq!(encode(&json!({"first name": 1})), "\"first name\": 1");
        assert_eq!(encode(&json!({"plaid_metadata.name": 1})), "plaid_metadata.name: 1");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(encode(&json!(1.5)), "1.5");
        assert_eq!(encode(&json!(-0.0)), "0");
        assert_eq!(encode(&json!(2.0)), "2");
        assert_eq!(encode(&json!(u64::MAX)), u64::MAX.to_string());
    }

    #[test]
    fn test_numeric_strings_stay_distinguishable_in_tables() {
        let value = json!([{"amount": "12.50"}, {"amount": "3.00"}]);
        assert_eq!(encode(&value), "[2]{amount}:\n  \"12.50\"\n  \"3.00\"");
    }
}
