//! In-memory value tree produced by the restricted parser.

use serde_json::{Map, Number, Value};

/// A parsed YAML-subset value.
///
/// Mappings preserve insertion order so re-serialization is
/// deterministic; lookups are by key and order carries no other
/// meaning. Document sets are small, so entries live in a `Vec` and
/// key lookup is a linear scan.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<YamlValue>),
    Mapping(Vec<(String, YamlValue)>),
}

impl YamlValue {
    /// Look up a mapping entry by key. Returns `None` for non-mappings.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&YamlValue> {
        match self {
            YamlValue::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Borrow the scalar string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            YamlValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into a `serde_json::Value` for schema validation and
    /// canonical serialization. Whole numbers convert to JSON integers
    /// so canonical output renders `1`, not `1.0`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(b) => Value::Bool(*b),
            YamlValue::Number(n) => json_number(*n),
            YamlValue::String(s) => Value::String(s.clone()),
            YamlValue::Sequence(items) => {
                Value::Array(items.iter().map(YamlValue::to_json).collect())
            }
            YamlValue::Mapping(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn json_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_lookup_by_key() {
        let value = YamlValue::Mapping(vec![
            ("a".to_string(), YamlValue::Number(1.0)),
            ("b".to_string(), YamlValue::Null),
        ]);
        assert_eq!(value.get("a"), Some(&YamlValue::Number(1.0)));
        assert_eq!(value.get("b"), Some(&YamlValue::Null));
        assert_eq!(value.get("c"), None);
        assert_eq!(YamlValue::Null.get("a"), None);
    }

    #[test]
    fn whole_numbers_convert_to_json_integers() {
        assert_eq!(YamlValue::Number(3.0).to_json().to_string(), "3");
        assert_eq!(YamlValue::Number(-2.0).to_json().to_string(), "-2");
        assert_eq!(YamlValue::Number(0.5).to_json().to_string(), "0.5");
    }

    #[test]
    fn to_json_converts_nested_collections() {
        let value = YamlValue::Mapping(vec![(
            "items".to_string(),
            YamlValue::Sequence(vec![YamlValue::String("x".to_string()), YamlValue::Null]),
        )]);
        let json = value.to_json();
        assert_eq!(json["items"][0], serde_json::json!("x"));
        assert!(json["items"][1].is_null());
    }
}
