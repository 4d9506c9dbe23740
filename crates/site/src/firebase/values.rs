//! Firestore typed values.
//!
//! Firestore's REST API wraps every field in a one-key object naming its type
//! (`{"stringValue": "Jane"}`, `{"booleanValue": false}`). These helpers build
//! and read that shape without modelling every value type.

use serde_json::{Map, Value, json};

/// The `fields` object of a document.
pub type Fields = Map<String, Value>;

/// Wrap a string.
#[must_use]
pub fn string(value: impl Into<String>) -> Value {
    json!({ "stringValue": value.into() })
}

/// Wrap a boolean.
#[must_use]
pub fn boolean(value: bool) -> Value {
    json!({ "booleanValue": value })
}

/// Read a string field.
///
/// Timestamps written by other clients are accepted as their RFC 3339 text.
#[must_use]
pub fn read_string<'a>(fields: &'a Fields, key: &str) -> Option<&'a str> {
    let value = fields.get(key)?;
    value
        .get("stringValue")
        .or_else(|| value.get("timestampValue"))
        .and_then(Value::as_str)
}

/// Read a boolean field. Any other type reads as absent.
#[must_use]
pub fn read_bool(fields: &Fields, key: &str) -> Option<bool> {
    fields.get(key)?.get("booleanValue")?.as_bool()
}

/// Build a field map from `(name, value)` pairs.
#[must_use]
pub fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Fields {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
