//! Lenient numeric decoding for hand-entered cruise figures.
//!
//! Cruise sheets are typed in by people. A tree count of `""`, `"abc"`, `null`
//! or a missing field carries no information and decodes as zero instead of
//! rejecting the whole inventory.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Coerce an arbitrary JSON value to a finite, non-negative real.
pub fn coerce_f64(value: &JsonValue) -> f64 {
    let raw = match value {
        JsonValue::Number(n) => n.as_f64().unwrap_or(0.0),
        JsonValue::String(s) => s.trim().replace(',', "").parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    sanitize(raw)
}

/// Coerce an arbitrary JSON value to a non-negative whole count (fractions truncate).
pub fn coerce_count(value: &JsonValue) -> u64 {
    coerce_f64(value).trunc() as u64
}

/// Clamp NaN, infinities and negatives to zero.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_f64).unwrap_or(0.0))
}

pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_count).unwrap_or(0))
}
