//! Tolerant deserializers for model-produced JSON.
//!
//! A hosted model returns "roughly" the requested schema: numbers where strings
//! were asked for, `null` instead of `[]`, enum values in the wrong case. These
//! helpers turn each such field into "absent" rather than failing the whole parse.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any value that does not deserialize as `T` becomes `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], but falls back to `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Array whose malformed items are dropped. Non-arrays become `None`.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Scalar coerced to a string. Blank strings count as missing.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(Value::deserialize(deserializer)?))
}

/// List of scalars coerced to strings. Non-arrays become `None`.
pub fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items.into_iter().filter_map(scalar_to_string).collect())),
        _ => Ok(None),
    }
}

/// List of scalars coerced to strings; anything else is an empty list.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string_list(deserializer)?.unwrap_or_default())
}

/// Number, or a string holding one.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// `true`/`false`, or their string spellings. Anything else is `false`.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Probe {
        #[serde(deserialize_with = "lenient_string")]
        name: Option<String>,
        #[serde(deserialize_with = "string_list")]
        tags: Vec<String>,
        #[serde(deserialize_with = "lenient_f64")]
        score: Option<f64>,
        #[serde(deserialize_with = "lenient_list")]
        counts: Option<Vec<u32>>,
    }

    #[test]
    fn test_scalars_coerced() {
        let p: Probe = serde_json::from_str(
            r#"{"name": 5000, "tags": ["a", 2, null, {"x": 1}], "score": "0.9", "counts": [1, "x", 3]}"#,
        )
        .unwrap();
        assert_eq!(p.name.as_deref(), Some("5000"));
        assert_eq!(p.tags, vec!["a", "2"]);
        assert_eq!(p.score, Some(0.9));
        assert_eq!(p.counts, Some(vec![1, 3]));
    }

    #[test]
    fn test_nulls_and_blanks_are_absent() {
        let p: Probe =
            serde_json::from_str(r#"{"name": "  ", "tags": null, "score": null, "counts": {}}"#)
                .unwrap();
        assert!(p.name.is_none());
        assert!(p.tags.is_empty());
        assert!(p.score.is_none());
        assert!(p.counts.is_none());
    }
}
