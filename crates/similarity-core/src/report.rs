//! Serialization helpers for report types
//!
//! Reports keep full precision in memory; only the serialized form is rounded.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Round to three decimals for display.
pub fn round_display(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub fn round3<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_display(*value))
}

pub fn round3_option<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&round_display(*v)),
        None => serializer.serialize_none(),
    }
}

pub fn round3_map<K, S>(map: &BTreeMap<K, f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Serialize,
    S: Serializer,
{
    let mut out = serializer.serialize_map(Some(map.len()))?;
    for (key, value) in map {
        out.serialize_entry(key, &round_display(*value))?;
    }
    out.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_display() {
        assert_eq!(round_display(0.123456), 0.123);
        assert_eq!(round_display(0.9996), 1.0);
        assert_eq!(round_display(0.0), 0.0);
    }
}
