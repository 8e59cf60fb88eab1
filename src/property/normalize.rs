//! Conversion from parsed YAML into canonical property values.

use serde_yaml::Value;

use super::value::PropertyValue;

/// Converts a parsed YAML value into a [`PropertyValue`].
///
/// Mapping keys of any scalar or collection type are re-keyed by their
/// textual form at every nesting level. Tags are dropped. When two keys
/// collapse onto the same string the later one wins.
#[must_use]
pub fn normalize(value: Value) -> PropertyValue {
    match value {
        Value::Null => PropertyValue::Null,
        Value::Bool(b) => PropertyValue::Bool(b),
        Value::Number(n) => PropertyValue::Number(n),
        Value::String(s) => PropertyValue::String(s),
        Value::Sequence(items) => PropertyValue::List(items.into_iter().map(normalize).collect()),
        Value::Mapping(mapping) => PropertyValue::Map(
            mapping.into_iter().map(|(key, value)| (key_text(&key), normalize(value))).collect(),
        ),
        Value::Tagged(tagged) => normalize(tagged.value),
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let parts: Vec<String> = items.iter().map(key_text).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Mapping(mapping) => {
            let parts: Vec<String> =
                mapping.iter().map(|(k, v)| format!("{}: {}", key_text(k), key_text(v))).collect();
            format!("{{{}}}", parts.join(", "))
        }
        Value::Tagged(tagged) => key_text(&tagged.value),
    }
}
