//! Tolerant field decoders for service-produced JSON.
//!
//! Generated stat blocks regularly carry floats where integers are expected,
//! numbers quoted as strings, or element names in odd casing. These helpers
//! turn such values into the closest sensible value instead of failing the
//! whole document.

use crate::element::Element;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

pub fn stat<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_f64)
        .map(|number| number.round().clamp(0.0, u32::MAX as f64) as u32)
        .unwrap_or(0))
}

pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_string).unwrap_or_default())
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_string)
        .filter(|text| !text.trim().is_empty()))
}

/// Unknown or missing elements fall back to fire.
pub fn element<'de, D>(deserializer: D) -> Result<Element, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_element(deserializer)?.unwrap_or_default())
}

pub fn optional_element<'de, D>(deserializer: D) -> Result<Option<Element>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(name)) => Element::from_name(&name),
        _ => None,
    })
}
