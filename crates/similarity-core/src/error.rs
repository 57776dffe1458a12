use std::time::Duration;

use thiserror::Error;

/// Errors raised while building or validating engine configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A weight key that does not name any known algorithm
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A weight that is negative, NaN or infinite
    #[error("Invalid weight for {algorithm}: {value}")]
    InvalidWeight { algorithm: String, value: f64 },

    /// Weights must add up to 1.0
    #[error("Weights must sum to 1.0, got {0}")]
    WeightSum(f64),

    /// No algorithm carries any weight
    #[error("Weight configuration is empty")]
    EmptyWeights,

    /// Highlight threshold outside [0, 1]
    #[error("Threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    /// Semantic share outside (0, 1)
    #[error("Semantic weight must be within (0, 1), got {0}")]
    InvalidSemanticWeight(f64),

    /// A vocabulary cap of zero would leave every vector empty
    #[error("max_features must be at least 1")]
    InvalidMaxFeatures,

    /// n-gram ranges must satisfy 1 <= min <= max
    #[error("Invalid n-gram range: ({0}, {1})")]
    InvalidNgramRange(usize, usize),
}

/// Failures reported by an embedding provider
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmbeddingError {
    #[error("Embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding timed out after {0:?}")]
    Timeout(Duration),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding provider failed: {0}")]
    Provider(String),
}

/// Hard failures that propagate out of the engine.
///
/// Everything recoverable (short input, degenerate vectors, missing
/// embeddings) is reported inside the `ScoreReport` instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{side} text is not valid UTF-8: {source}")]
    InvalidEncoding {
        side: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
