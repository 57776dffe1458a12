//! Weighted ensemble of algorithm outcomes
//!
//! # Combination
//!
//! ```text
//! overall = sum(w_i * s_i) / sum(w_i)      over Computed outcomes only
//! ```
//!
//! Abstaining algorithms drop out and the remaining weights are renormalized,
//! so a missing embedding provider or a too-short n-gram side never drags the
//! score toward zero. When nothing computed, `overall` is `0.0` and the report
//! carries [`ReportNote::InsufficientText`].

pub mod weights;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::algorithms::{AlgorithmKind, AlgorithmOutcome};
use crate::report::{round3, round3_map};
use crate::risk::{classify_risk, RiskLevel};

pub use weights::{WeightConfig, LEXICAL_DEFAULT_WEIGHTS};

/// Metadata attached to a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportNote {
    /// No weighted algorithm could compute a score
    InsufficientText,
    /// The semantic slot was weighted but no embedding could be obtained
    EmbeddingUnavailable { reason: String },
    /// The lexical ensemble did not complete
    ComputationFailed { detail: String },
}

impl ReportNote {
    pub fn message(&self) -> String {
        match self {
            ReportNote::InsufficientText => "insufficient text for analysis".to_string(),
            ReportNote::EmbeddingUnavailable { reason } => {
                format!("semantic similarity unavailable: {reason}")
            }
            ReportNote::ComputationFailed { detail } => {
                format!("lexical analysis failed: {detail}")
            }
        }
    }
}

/// Weighted mean over computed outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    /// Clamped to `[0, 1]`, full precision
    pub overall: f64,
    /// Renormalized weights of contributing algorithms
    pub effective_weights: BTreeMap<AlgorithmKind, f64>,
    pub contributing: Vec<AlgorithmKind>,
    /// Weighted algorithms that abstained or were not run
    pub abstained: Vec<AlgorithmKind>,
}

impl Combination {
    pub fn is_insufficient(&self) -> bool {
        self.contributing.is_empty() || self.effective_weights.is_empty()
    }
}

/// Combine outcomes with renormalization over computed algorithms.
pub fn combine(
    outcomes: &BTreeMap<AlgorithmKind, AlgorithmOutcome>,
    weights: &WeightConfig,
) -> Combination {
    let mut contributing = Vec::new();
    let mut abstained = Vec::new();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (kind, weight) in weights.iter() {
        match outcomes.get(&kind) {
            Some(AlgorithmOutcome::Computed { value }) => {
                contributing.push(kind);
                weighted_sum += weight * value;
                weight_total += weight;
            }
            _ => abstained.push(kind),
        }
    }

    if weight_total <= 0.0 {
        return Combination {
            overall: 0.0,
            effective_weights: BTreeMap::new(),
            contributing,
            abstained,
        };
    }

    let effective_weights = contributing
        .iter()
        .filter_map(|kind| weights.get(*kind).map(|w| (*kind, w / weight_total)))
        .collect();

    Combination {
        overall: (weighted_sum / weight_total).clamp(0.0, 1.0),
        effective_weights,
        contributing,
        abstained,
    }
}

/// Structured result of one pairwise comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub scores: BTreeMap<AlgorithmKind, AlgorithmOutcome>,
    #[serde(serialize_with = "round3")]
    pub overall: f64,
    pub risk: RiskLevel,
    pub weights: WeightConfig,
    #[serde(serialize_with = "round3_map")]
    pub effective_weights: BTreeMap<AlgorithmKind, f64>,
    pub contributing: Vec<AlgorithmKind>,
    pub abstained: Vec<AlgorithmKind>,
    pub notes: Vec<ReportNote>,
}

impl ScoreReport {
    /// Combine `scores` under `weights` and classify the result.
    pub fn from_outcomes(
        scores: BTreeMap<AlgorithmKind, AlgorithmOutcome>,
        weights: &WeightConfig,
        mut notes: Vec<ReportNote>,
    ) -> Self {
        let combination = combine(&scores, weights);
        if combination.is_insufficient() {
            notes.insert(0, ReportNote::InsufficientText);
        }

        Self {
            risk: classify_risk(combination.overall),
            overall: combination.overall,
            scores,
            weights: weights.clone(),
            effective_weights: combination.effective_weights,
            contributing: combination.contributing,
            abstained: combination.abstained,
            notes,
        }
    }

    pub fn outcome(&self, kind: AlgorithmKind) -> Option<&AlgorithmOutcome> {
        self.scores.get(&kind)
    }

    /// Score of one algorithm; abstentions read as `0.0`
    pub fn score(&self, kind: AlgorithmKind) -> Option<f64> {
        self.outcome(kind).map(AlgorithmOutcome::value)
    }

    pub fn is_insufficient(&self) -> bool {
        self.notes.contains(&ReportNote::InsufficientText)
    }
}
