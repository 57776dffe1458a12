//! Risk classification of an ensemble score
//!
//! - High: score > 0.7
//! - Medium: 0.4 < score <= 0.7
//! - Low: score <= 0.4, or NaN
//!
//! Both bounds are exclusive: exactly 0.7 is medium, exactly 0.4 is low.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scores strictly above this are high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Scores strictly above this are at least medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl From<f64> for RiskLevel {
    fn from(score: f64) -> Self {
        if score > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if score > MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            // NaN fails both comparisons
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(label)
    }
}

/// Map an ensemble score to a risk level.
///
/// ```
/// use similarity_core::risk::{classify_risk, RiskLevel};
///
/// assert_eq!(classify_risk(0.71), RiskLevel::High);
/// assert_eq!(classify_risk(0.7), RiskLevel::Medium);
/// assert_eq!(classify_risk(0.4), RiskLevel::Low);
/// ```
pub fn classify_risk(score: f64) -> RiskLevel {
    RiskLevel::from(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_exclusive() {
        assert_eq!(classify_risk(0.7), RiskLevel::Medium);
        assert_eq!(classify_risk(0.7000001), RiskLevel::High);
        assert_eq!(classify_risk(0.4), RiskLevel::Low);
        assert_eq!(classify_risk(0.4000001), RiskLevel::Medium);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify_risk(0.0), RiskLevel::Low);
        assert_eq!(classify_risk(1.0), RiskLevel::High);
        assert_eq!(classify_risk(f64::NAN), RiskLevel::Low);
        assert_eq!(classify_risk(f64::INFINITY), RiskLevel::High);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = RiskLevel::Low;
        for step in 0..=1000 {
            let level = classify_risk(step as f64 / 1000.0);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_serialized_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"medium\"");
        assert_eq!(RiskLevel::High.to_string(), "high");
    }
}
