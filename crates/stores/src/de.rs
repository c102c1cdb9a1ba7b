//! Lenient deserializers for upstream payloads.
//!
//! The comparison service and the secondary storefronts are inconsistent
//! about numeric types: the same field may arrive as `"14.99"` or `14.99`
//! depending on the endpoint. These helpers accept both.

use serde::{Deserialize, Deserializer};

/// Deserialize a number that may be encoded as a JSON string.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64_opt(deserializer)?.unwrap_or(0.0))
}

/// Optional variant of [`lenient_f64`]; missing, null, and unparsable
/// values all become `None`.
pub fn lenient_f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
        Null,
    }

    Ok(match Option::<NumOrStr>::deserialize(deserializer)? {
        Some(NumOrStr::Num(n)) => Some(n),
        Some(NumOrStr::Str(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
