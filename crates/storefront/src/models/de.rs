//! Lenient field decoders for loosely typed API and persisted JSON.
//!
//! The catalog service and older persisted carts disagree on field shapes:
//! counts arrive as numbers or numeric strings, brands as names or embedded
//! documents, images as a URL or a list of URLs. These helpers are used with
//! `#[serde(default, deserialize_with = "...")]` and never fail on an
//! unexpected shape; they fall back to "absent" instead.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use pos_storefront_core::Money;

/// Optional document id from a bare id string or an embedded `{ "_id": ... }`.
pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(id_of))
}

/// Optional display text.
///
/// Accepts a string, a number, or an embedded document with a `name` field.
/// Empty strings are treated as absent.
pub fn opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(text_of))
}

/// Display text, empty when absent.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    opt_text(deserializer).map(Option::unwrap_or_default)
}

/// Optional non-negative count.
///
/// Accepts integers, floats (truncated) and numeric strings. Negative values
/// clamp to 0 and values beyond `u32::MAX` saturate.
pub fn opt_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(count_of))
}

/// Optional amount of money from a number or a numeric string.
///
/// Unparseable and negative amounts are treated as absent.
pub fn opt_money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Money>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(money_of))
}

/// Optional image URL, taking the first entry when a list is supplied.
pub fn opt_image<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(image_of))
}

/// Boolean flag, `false` when absent or not a boolean.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(
        Option::<Value>::deserialize(deserializer)?,
        Some(Value::Bool(true))
    ))
}

/// Sequence that may be `null`; entries that do not decode are dropped.
pub fn lossy_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let Some(Value::Array(values)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable entry");
                None
            }
        })
        .collect())
}

// =============================================================================
// Value conversions
// =============================================================================

pub(crate) fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("name").and_then(text_of),
        _ => None,
    }
}

pub(crate) fn id_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => map.get("_id").and_then(id_of),
        _ => None,
    }
}

pub(crate) fn count_of(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !raw.is_finite() {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = raw.clamp(0.0, f64::from(u32::MAX)).trunc() as u32;
    Some(count)
}

pub(crate) fn money_of(value: &Value) -> Option<Money> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub(crate) fn image_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(image_of),
        Value::Object(map) => map.get("url").and_then(image_of),
        _ => None,
    }
}
