use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;

use crate::Value;

/// Errors produced while reading shorthand value JSON.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("value json parse error: {0}")]
    ValueParse(String),
}

/// Normalize shorthand `Value` JSON into the canonical `{ "type": ..., "data": ... }`
/// representation understood by the serde derives on [`Value`]. Accepts
/// shorthand objects such as `{ "point": [1, 2] }` and primitive aliases like
/// `1`, `1.5`, `"text"` or `[1, [2, 3]]`.
pub fn normalize_value_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => json!({ "type": "null" }),
        JsonValue::Number(n) => {
            if n.is_i64() {
                json!({ "type": "int", "data": n })
            } else {
                json!({ "type": "float", "data": n })
            }
        }
        JsonValue::Bool(b) => json!({ "type": "bool", "data": b }),
        JsonValue::String(s) => json!({ "type": "text", "data": s }),
        JsonValue::Array(arr) => {
            let data: Vec<JsonValue> = arr.into_iter().map(normalize_value_json).collect();
            json!({ "type": "list", "data": data })
        }
        JsonValue::Object(obj) => normalize_object(obj),
    }
}

fn normalize_object(obj: Map<String, JsonValue>) -> JsonValue {
    if obj.contains_key("type") {
        return JsonValue::Object(obj);
    }
    if let Some(p) = obj.get("point") {
        return json!({ "type": "point", "data": p });
    }
    if let Some(c) = obj.get("color") {
        return json!({ "type": "color", "data": c });
    }
    if let Some(f) = obj.get("float").and_then(|x| x.as_f64()) {
        return json!({ "type": "float", "data": f });
    }
    if let Some(text) = obj.get("text").and_then(|x| x.as_str()) {
        return json!({ "type": "text", "data": text });
    }
    if let Some(JsonValue::Array(items)) = obj.get("list") {
        let data: Vec<JsonValue> = items.iter().cloned().map(normalize_value_json).collect();
        return json!({ "type": "list", "data": data });
    }
    JsonValue::Object(obj)
}

/// Parse shorthand or canonical JSON into a [`Value`].
pub fn parse_value(value: JsonValue) -> Result<Value, JsonError> {
    serde_json::from_value(normalize_value_json(value))
        .map_err(|e| JsonError::ValueParse(e.to_string()))
}

/// `deserialize_with` adapter accepting shorthand value JSON.
pub fn deserialize_value<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = JsonValue::deserialize(deserializer)?;
    parse_value(raw).map_err(serde::de::Error::custom)
}

/// Optional variant of [`deserialize_value`]; pair it with `#[serde(default)]`.
pub fn deserialize_optional_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_value(raw).map(Some).map_err(serde::de::Error::custom),
    }
}
