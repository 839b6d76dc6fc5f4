//! JSON export of runtime values, for hosts that report results as data.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::value::Value;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Null => serializer.serialize_unit(),
            Value::Array(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for el in elements.iter() {
                    seq.serialize_element(el)?;
                }
                seq.end()
            }
            // JSON object keys are strings: use the key's display text. Keys
            // of different types can render alike (`1` and `"1"`); see `to_json`.
            Value::Hash(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for pair in pairs.values() {
                    map.serialize_entry(&pair.key.to_string(), &pair.value)?;
                }
                map.end()
            }
            Value::Function(_) | Value::Builtin(_) => serializer.collect_str(self),
            Value::Error(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

/// Convert a value into a [`serde_json::Value`].
///
/// Hash keys become their display text, so keys that differ only in type
/// (`1`, `"1"`; `true`, `"true"`) map to the same JSON key. The later one in
/// key order wins, so a string key beats the integer or boolean. A streaming
/// serializer such as `serde_json::to_string` on the value itself emits
/// both entries instead.
pub fn to_json(value: &Value) -> serde_json::Value {
    // Serializing into `serde_json::Value` cannot fail: every key is a string.
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
