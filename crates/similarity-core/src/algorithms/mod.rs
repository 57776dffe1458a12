//! Similarity algorithm library
//!
//! Each algorithm is a pure function of a text pair that yields an
//! [`AlgorithmOutcome`]: either a computed score in `[0, 1]` or an explicit
//! abstention. Algorithms are selected through the closed [`AlgorithmKind`]
//! enumeration; there is no runtime registry.
//!
//! # Floor
//!
//! When either normalized input is shorter than [`MIN_TEXT_CHARS`] characters,
//! every algorithm abstains with [`AbstainReason::InputTooShort`] and
//! contributes `0.0`.

pub mod lcs;
pub mod levenshtein;
pub mod overlap;
pub mod sentence;
pub mod sequence;
pub mod vectorizer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::report::round3;
use crate::text::TextFragment;

pub use vectorizer::{VectorizerConfig, VectorizerOverrides};

/// Minimum normalized length, in characters, for any pairwise comparison
pub const MIN_TEXT_CHARS: usize = 5;

/// Identifier of one similarity signal in the ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// TF-IDF weighted 1-3-gram cosine
    TfidfCosine,
    /// Raw term count cosine
    CountCosine,
    /// Word-level matching-blocks ratio
    SequenceRatio,
    /// Unique-token Jaccard overlap
    Jaccard,
    /// Word bigram Jaccard overlap
    Bigram,
    /// Word trigram Jaccard overlap
    Trigram,
    /// Longest common subsequence ratio
    Lcs,
    /// Mean of best per-sentence sequence ratios
    SentenceMax,
    /// Jaccard over content words
    StopwordOverlap,
    /// Character edit distance, normalized by the longer side
    Levenshtein,
    /// Embedding cosine, only available with an embedding provider
    Semantic,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 11] = [
        AlgorithmKind::TfidfCosine,
        AlgorithmKind::CountCosine,
        AlgorithmKind::SequenceRatio,
        AlgorithmKind::Jaccard,
        AlgorithmKind::Bigram,
        AlgorithmKind::Trigram,
        AlgorithmKind::Lcs,
        AlgorithmKind::SentenceMax,
        AlgorithmKind::StopwordOverlap,
        AlgorithmKind::Levenshtein,
        AlgorithmKind::Semantic,
    ];

    /// Algorithms computed from the text alone
    pub const LEXICAL: [AlgorithmKind; 10] = [
        AlgorithmKind::TfidfCosine,
        AlgorithmKind::CountCosine,
        AlgorithmKind::SequenceRatio,
        AlgorithmKind::Jaccard,
        AlgorithmKind::Bigram,
        AlgorithmKind::Trigram,
        AlgorithmKind::Lcs,
        AlgorithmKind::SentenceMax,
        AlgorithmKind::StopwordOverlap,
        AlgorithmKind::Levenshtein,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AlgorithmKind::TfidfCosine => "tfidf_cosine",
            AlgorithmKind::CountCosine => "count_cosine",
            AlgorithmKind::SequenceRatio => "sequence_ratio",
            AlgorithmKind::Jaccard => "jaccard",
            AlgorithmKind::Bigram => "bigram",
            AlgorithmKind::Trigram => "trigram",
            AlgorithmKind::Lcs => "lcs",
            AlgorithmKind::SentenceMax => "sentence_max",
            AlgorithmKind::StopwordOverlap => "stopword_overlap",
            AlgorithmKind::Levenshtein => "levenshtein",
            AlgorithmKind::Semantic => "semantic",
        }
    }

    pub fn is_lexical(&self) -> bool {
        !matches!(self, AlgorithmKind::Semantic)
    }

    /// Score a text pair with this algorithm.
    ///
    /// `Semantic` needs an embedding provider and abstains here; use
    /// [`crate::embeddings::semantic_similarity`] instead.
    pub fn evaluate(
        &self,
        a: &TextFragment,
        b: &TextFragment,
        config: &AlgorithmConfig,
    ) -> AlgorithmOutcome {
        if let Some(short) = check_floor(a, b) {
            return short;
        }

        match self {
            AlgorithmKind::TfidfCosine => vectorizer::vector_cosine(a, b, &config.tfidf),
            AlgorithmKind::CountCosine => vectorizer::vector_cosine(a, b, &config.count),
            AlgorithmKind::SequenceRatio => sequence::sequence_ratio(a, b),
            AlgorithmKind::Jaccard => overlap::token_jaccard(a, b),
            AlgorithmKind::Bigram => overlap::ngram_overlap(a, b, 2),
            AlgorithmKind::Trigram => overlap::ngram_overlap(a, b, 3),
            AlgorithmKind::Lcs => lcs::lcs_ratio(a, b),
            AlgorithmKind::SentenceMax => sentence::sentence_max(a, b),
            AlgorithmKind::StopwordOverlap => overlap::stopword_overlap(a, b),
            AlgorithmKind::Levenshtein => levenshtein::levenshtein_similarity(a, b),
            AlgorithmKind::Semantic => {
                AlgorithmOutcome::abstained(AbstainReason::EmbeddingUnavailable)
            }
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AlgorithmKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| ConfigError::UnknownAlgorithm(s.to_string()))
    }
}

/// Why an algorithm declined to score a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstainReason {
    /// Normalized input below `MIN_TEXT_CHARS`
    InputTooShort,
    /// Normalized input above an algorithm's size limit
    InputTooLong,
    /// One side has no sentences with word content
    NoSentences,
    /// No tokens, n-grams or content words could be derived
    EmptyFeatureSet,
    /// Vectorization produced no terms at all
    EmptyVocabulary,
    /// A zero-length vector, cosine undefined
    DegenerateVector,
    /// No embedding provider, or it failed or timed out
    EmbeddingUnavailable,
    /// A non-finite score, or the blocking lexical task failed to join
    ComputationFailed,
}

impl AbstainReason {
    pub fn key(&self) -> &'static str {
        match self {
            AbstainReason::InputTooShort => "input_too_short",
            AbstainReason::InputTooLong => "input_too_long",
            AbstainReason::NoSentences => "no_sentences",
            AbstainReason::EmptyFeatureSet => "empty_feature_set",
            AbstainReason::EmptyVocabulary => "empty_vocabulary",
            AbstainReason::DegenerateVector => "degenerate_vector",
            AbstainReason::EmbeddingUnavailable => "embedding_unavailable",
            AbstainReason::ComputationFailed => "computation_failed",
        }
    }
}

impl fmt::Display for AbstainReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of one algorithm on one pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlgorithmOutcome {
    Computed {
        #[serde(serialize_with = "round3")]
        value: f64,
    },
    Abstained {
        reason: AbstainReason,
    },
}

impl AlgorithmOutcome {
    /// Wrap a raw score, clamping to `[0, 1]`.
    ///
    /// Non-finite values become `Abstained(ComputationFailed)`.
    pub fn computed(value: f64) -> Self {
        if value.is_finite() {
            AlgorithmOutcome::Computed {
                value: value.clamp(0.0, 1.0),
            }
        } else {
            AlgorithmOutcome::abstained(AbstainReason::ComputationFailed)
        }
    }

    pub fn abstained(reason: AbstainReason) -> Self {
        AlgorithmOutcome::Abstained { reason }
    }

    /// Score contribution; abstentions count as `0.0`
    pub fn value(&self) -> f64 {
        match self {
            AlgorithmOutcome::Computed { value } => *value,
            AlgorithmOutcome::Abstained { .. } => 0.0,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, AlgorithmOutcome::Computed { .. })
    }

    pub fn abstain_reason(&self) -> Option<AbstainReason> {
        match self {
            AlgorithmOutcome::Computed { .. } => None,
            AlgorithmOutcome::Abstained { reason } => Some(*reason),
        }
    }
}

/// Per-call vectorizer settings for the two cosine algorithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AlgorithmConfigFile")]
pub struct AlgorithmConfig {
    pub tfidf: VectorizerConfig,
    pub count: VectorizerConfig,
}

/// On-disk form: each section only overrides what it names
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AlgorithmConfigFile {
    #[serde(default)]
    tfidf: VectorizerOverrides,
    #[serde(default)]
    count: VectorizerOverrides,
}

impl From<AlgorithmConfigFile> for AlgorithmConfig {
    fn from(file: AlgorithmConfigFile) -> Self {
        Self {
            tfidf: file.tfidf.apply(VectorizerConfig::tfidf()),
            count: file.count.apply(VectorizerConfig::counts()),
        }
    }
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            tfidf: VectorizerConfig::tfidf(),
            count: VectorizerConfig::counts(),
        }
    }
}

impl AlgorithmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tfidf.validate()?;
        self.count.validate()
    }

    /// Apply one vocabulary cap to both vectorizers; `None` removes it
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.tfidf.max_features = max_features;
        self.count.max_features = max_features;
        self
    }
}

pub(crate) fn check_floor(a: &TextFragment, b: &TextFragment) -> Option<AlgorithmOutcome> {
    if a.normalized_len() < MIN_TEXT_CHARS || b.normalized_len() < MIN_TEXT_CHARS {
        Some(AlgorithmOutcome::abstained(AbstainReason::InputTooShort))
    } else {
        None
    }
}

/// Score two strings with one algorithm and default settings.
///
/// # Examples
///
/// ```
/// use similarity_core::algorithms::{similarity, AlgorithmKind};
///
/// let score = similarity(AlgorithmKind::Jaccard, "red green blue", "red green yellow");
/// assert!((score - 0.5).abs() < 1e-9);
/// assert_eq!(similarity(AlgorithmKind::Jaccard, "abc", "abc"), 0.0);
/// ```
pub fn similarity(kind: AlgorithmKind, a: &str, b: &str) -> f64 {
    kind.evaluate(
        &TextFragment::new(a),
        &TextFragment::new(b),
        &AlgorithmConfig::default(),
    )
    .value()
}

/// n-gram overlap for any `n >= 1`, with the length floor applied.
pub fn ngram_similarity(a: &str, b: &str, n: usize) -> AlgorithmOutcome {
    let a = TextFragment::new(a);
    let b = TextFragment::new(b);
    check_floor(&a, &b).unwrap_or_else(|| overlap::ngram_overlap(&a, &b, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_keys_round_trip() {
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.key().parse::<AlgorithmKind>().unwrap(), kind);
        }
        assert!("fuzzy".parse::<AlgorithmKind>().is_err());
    }

    #[test]
    fn test_lexical_excludes_semantic() {
        assert!(!AlgorithmKind::LEXICAL.contains(&AlgorithmKind::Semantic));
        assert!(!AlgorithmKind::Semantic.is_lexical());
    }

    #[test]
    fn test_floor_applies_to_every_lexical_algorithm() {
        let config = AlgorithmConfig::default();
        let short = TextFragment::new("abcd");
        let long = TextFragment::new("a perfectly ordinary sentence");
        for kind in AlgorithmKind::LEXICAL {
            let outcome = kind.evaluate(&short, &long, &config);
            assert_eq!(
                outcome.abstain_reason(),
                Some(AbstainReason::InputTooShort),
                "{kind}"
            );
            assert_eq!(outcome.value(), 0.0);
        }
    }

    #[test]
    fn test_floor_uses_normalized_length() {
        // URL is stripped, leaving four characters
        let a = TextFragment::new("abcd http://example.com/very/long/path");
        let b = TextFragment::new("abcd efgh");
        assert!(check_floor(&a, &b).is_some());
    }

    #[test]
    fn test_computed_clamps_and_rejects_nan() {
        assert_eq!(AlgorithmOutcome::computed(1.0000001).value(), 1.0);
        assert_eq!(AlgorithmOutcome::computed(-0.2).value(), 0.0);
        assert_eq!(
            AlgorithmOutcome::computed(f64::NAN).abstain_reason(),
            Some(AbstainReason::ComputationFailed)
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(AlgorithmOutcome::computed(0.12345)).unwrap();
        assert_eq!(json["status"], "computed");
        assert_eq!(json["value"], 0.123);

        let json =
            serde_json::to_value(AlgorithmOutcome::abstained(AbstainReason::InputTooShort))
                .unwrap();
        assert_eq!(json["status"], "abstained");
        assert_eq!(json["reason"], "input_too_short");
    }

    #[test]
    fn test_abstain_reason_key_matches_serialized_name() {
        for reason in [
            AbstainReason::InputTooShort,
            AbstainReason::InputTooLong,
            AbstainReason::NoSentences,
            AbstainReason::EmptyFeatureSet,
            AbstainReason::EmptyVocabulary,
            AbstainReason::DegenerateVector,
            AbstainReason::EmbeddingUnavailable,
            AbstainReason::ComputationFailed,
        ] {
            assert_eq!(serde_json::to_value(reason).unwrap(), reason.key());
            assert_eq!(reason.to_string(), reason.key());
        }
    }

    #[test]
    fn test_levenshtein_dispatch() {
        let config = AlgorithmConfig::default();
        let a = TextFragment::new("The quick brown fox");
        let b = TextFragment::new("The quick brown box");
        let score = AlgorithmKind::Levenshtein.evaluate(&a, &b, &config).value();
        assert!((score - (1.0 - 1.0 / 19.0)).abs() < 1e-9);
    }

    #[test]
    fn test_ngram_similarity_configurable_n() {
        let a = "one two three four five";
        let b = "one two three four six";
        assert!((ngram_similarity(a, b, 4).value() - 1.0 / 3.0).abs() < 1e-9);
        assert!((ngram_similarity(a, b, 1).value() - 4.0 / 6.0).abs() < 1e-9);
    }
}
