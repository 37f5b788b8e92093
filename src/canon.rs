//! Canonical JSON form: key-sorted, 2-space pretty, trailing newline.
//!
//! Two semantically identical documents become byte-identical under
//! `sort_keys` + `stable_stringify`, which is what golden-file
//! comparison and idempotent artifact regeneration rely on.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, SsvError};

/// Recursively reorder every object's keys lexicographically (ordinal
/// compare). Array element order is left untouched.
#[must_use]
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Render with 2-space indentation and a single trailing newline.
///
/// Idempotent together with [`sort_keys`]: applying the pair twice
/// yields the same bytes as applying it once.
#[must_use]
pub fn stable_stringify(value: &Value) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    text.push('\n');
    text
}

/// Read and parse a JSON file.
///
/// The error message is `<path>: invalid JSON (<native message>)` so
/// batch reports stay line-per-file greppable.
pub fn load_json_file(path: &Path) -> Result<Value> {
    let text =
        std::fs::read_to_string(path).map_err(|err| SsvError::io("read", path, &err))?;
    serde_json::from_str(&text)
        .map_err(|err| SsvError::Json(format!("{}: invalid JSON ({err})", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_keys_recursively() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [{"y": 1, "x": 2}]});
        let sorted = stable_stringify(&sort_keys(&value));
        let expected = "{\n  \"a\": [\n    {\n      \"x\": 2,\n      \"y\": 1\n    }\n  ],\n  \"b\": {\n    \"a\": 2,\n    \"z\": 1\n  }\n}\n";
        assert_eq!(sorted, expected);
    }

    #[test]
    fn leaves_array_order_untouched() {
        let value = json!({"items": ["c", "a", "b"]});
        let sorted = sort_keys(&value);
        assert_eq!(sorted["items"], json!(["c", "a", "b"]));
    }

    #[test]
    fn stringify_is_idempotent_with_sort() {
        let value = json!({"z": 1, "a": {"q": [3, 1, 2], "b": null}});
        let once = stable_stringify(&sort_keys(&value));
        let reparsed: Value = serde_json::from_str(&once).unwrap();
        let twice = stable_stringify(&sort_keys(&reparsed));
        assert_eq!(once, twice);
    }

    #[test]
    fn ends_with_single_newline() {
        let text = stable_stringify(&json!({"a": 1}));
        assert!(text.ends_with("}\n"));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn load_json_file_reports_path_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_json_file(&path).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("bad.json: invalid JSON ("));
    }
}
