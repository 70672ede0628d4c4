//! Lenient serde adapters
//!
//! Used through `#[serde(deserialize_with = "...")]` on record fields. Each
//! adapter first decodes an arbitrary JSON value and then coerces it, so a
//! field of the wrong type never fails the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use super::numeric::numeric;

/// Any value as a finite `f64` (see [`numeric`])
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(numeric(&value))
}

/// Any value as a non-negative count
pub fn lenient_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(numeric(&value).max(0.0).trunc() as usize)
}

/// `true` only for a JSON `true`
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

/// Strings pass through, numbers are formatted, everything else is empty
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value).unwrap_or_default())
}

/// Like [`lenient_string`], but `null` and non-scalar values are `None`
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

/// Array of strings; anything that is not an array is empty
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        // Element count matters to callers, so odd elements become "" rather than vanish
        Value::Array(items) => Ok(items
            .iter()
            .map(|item| value_to_string(item).unwrap_or_default())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Object of numbers keyed by symbol; non-objects are empty
pub fn lenient_f64_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), numeric(v))).collect()),
        _ => Ok(BTreeMap::new()),
    }
}

/// Object of optional addresses keyed by symbol; non-objects are empty
pub fn lenient_address_map<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), v.as_str().map(str::to_string)))
            .collect()),
        _ => Ok(BTreeMap::new()),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_f64")]
        amount: f64,
        #[serde(default, deserialize_with = "lenient_count")]
        count: usize,
        #[serde(default, deserialize_with = "lenient_string_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "lenient_opt_string")]
        label: Option<String>,
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let probe: Probe = serde_json::from_value(json!({})).unwrap();
        assert_eq!(probe.amount, 0.0);
        assert_eq!(probe.count, 0);
        assert!(probe.list.is_empty());
        assert_eq!(probe.label, None);
    }

    #[test]
    fn test_wrong_types_coerce() {
        let probe: Probe = serde_json::from_value(json!({
            "amount": "abc",
            "count": -3,
            "list": "not-a-list",
            "label": 42
        }))
        .unwrap();
        assert_eq!(probe.amount, 0.0);
        assert_eq!(probe.count, 0);
        assert!(probe.list.is_empty());
        assert_eq!(probe.label.as_deref(), Some("42"));
    }

    #[test]
    fn test_list_keeps_element_count() {
        let probe: Probe = serde_json::from_value(json!({ "list": ["A", null, 7] })).unwrap();
        assert_eq!(probe.list, vec!["A".to_string(), String::new(), "7".to_string()]);
    }

    #[test]
    fn test_count_truncates() {
        let probe: Probe = serde_json::from_value(json!({ "count": "3.9" })).unwrap();
        assert_eq!(probe.count, 3);
    }
}
