//! Validated weight vectors for the ensemble

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::algorithms::AlgorithmKind;
use crate::error::ConfigError;

/// Allowed deviation of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Lexical weight profile used when no semantic signal is configured
pub const LEXICAL_DEFAULT_WEIGHTS: [(AlgorithmKind, f64); 9] = [
    (AlgorithmKind::TfidfCosine, 0.15),
    (AlgorithmKind::SequenceRatio, 0.15),
    (AlgorithmKind::Jaccard, 0.12),
    (AlgorithmKind::Bigram, 0.10),
    (AlgorithmKind::Trigram, 0.08),
    (AlgorithmKind::Lcs, 0.12),
    (AlgorithmKind::SentenceMax, 0.10),
    (AlgorithmKind::CountCosine, 0.10),
    (AlgorithmKind::StopwordOverlap, 0.08),
];

/// Three-signal profile: TF-IDF cosine, Jaccard and character Levenshtein
pub const CLASSIC_WEIGHTS: [(AlgorithmKind, f64); 3] = [
    (AlgorithmKind::TfidfCosine, 0.5),
    (AlgorithmKind::Jaccard, 0.3),
    (AlgorithmKind::Levenshtein, 0.2),
];

/// Weight per algorithm, summing to 1.0.
///
/// Algorithms without an entry are not run by the ensemble. Construction
/// always validates, so a `WeightConfig` in hand is known good.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, f64>",
    into = "BTreeMap<AlgorithmKind, f64>"
)]
pub struct WeightConfig {
    weights: BTreeMap<AlgorithmKind, f64>,
}

impl WeightConfig {
    pub fn new(weights: BTreeMap<AlgorithmKind, f64>) -> Result<Self, ConfigError> {
        validate(&weights)?;
        Ok(Self { weights })
    }

    /// The default lexical-only profile
    pub fn lexical_default() -> Self {
        Self {
            weights: LEXICAL_DEFAULT_WEIGHTS.into_iter().collect(),
        }
    }

    /// Cosine 0.5, Jaccard 0.3, Levenshtein 0.2
    pub fn classic() -> Self {
        Self {
            weights: CLASSIC_WEIGHTS.into_iter().collect(),
        }
    }

    /// Give `semantic` the share `semantic_weight` and scale every lexical
    /// weight by `1 - semantic_weight`.
    ///
    /// # Examples
    ///
    /// ```
    /// use similarity_core::algorithms::AlgorithmKind;
    /// use similarity_core::ensemble::WeightConfig;
    ///
    /// let weights = WeightConfig::semantic_aware(0.25).unwrap();
    /// assert_eq!(weights.get(AlgorithmKind::Semantic), Some(0.25));
    /// assert!((weights.get(AlgorithmKind::TfidfCosine).unwrap() - 0.1125).abs() < 1e-12);
    /// ```
    pub fn semantic_aware(semantic_weight: f64) -> Result<Self, ConfigError> {
        if !(semantic_weight > 0.0 && semantic_weight < 1.0) {
            return Err(ConfigError::InvalidSemanticWeight(semantic_weight));
        }
        let mut weights: BTreeMap<AlgorithmKind, f64> = LEXICAL_DEFAULT_WEIGHTS
            .into_iter()
            .map(|(kind, w)| (kind, w * (1.0 - semantic_weight)))
            .collect();
        weights.insert(AlgorithmKind::Semantic, semantic_weight);
        Self::new(weights)
    }

    pub fn get(&self, kind: AlgorithmKind) -> Option<f64> {
        self.weights.get(&kind).copied()
    }

    pub fn contains(&self, kind: AlgorithmKind) -> bool {
        self.weights.contains_key(&kind)
    }

    /// Weight of the semantic slot, 0.0 when absent
    pub fn semantic_weight(&self) -> f64 {
        self.get(AlgorithmKind::Semantic).unwrap_or(0.0)
    }

    /// Lexical algorithms with an entry, in key order
    pub fn lexical_kinds(&self) -> Vec<AlgorithmKind> {
        self.weights
            .keys()
            .copied()
            .filter(AlgorithmKind::is_lexical)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AlgorithmKind, f64)> + '_ {
        self.weights.iter().map(|(kind, w)| (*kind, *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self::lexical_default()
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightConfig {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let weights = raw
            .into_iter()
            .map(|(key, w)| Ok((key.parse::<AlgorithmKind>()?, w)))
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;
        Self::new(weights)
    }
}

impl From<WeightConfig> for BTreeMap<AlgorithmKind, f64> {
    fn from(config: WeightConfig) -> Self {
        config.weights
    }
}

fn validate(weights: &BTreeMap<AlgorithmKind, f64>) -> Result<(), ConfigError> {
    if weights.is_empty() {
        return Err(ConfigError::EmptyWeights);
    }
    for (kind, &w) in weights {
        if !w.is_finite() || w < 0.0 {
            return Err(ConfigError::InvalidWeight {
                algorithm: kind.to_string(),
                value: w,
            });
        }
    }
    let sum: f64 = weights.values().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::WeightSum(sum));
    }
    Ok(())
}
