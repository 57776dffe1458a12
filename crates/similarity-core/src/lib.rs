//! Similarity Core - Text similarity ensemble and sentence alignment
//!
//! This crate provides:
//! - Text normalization, tokenization and statistics
//! - Ten lexical similarity algorithms plus an optional semantic signal
//! - A weighted ensemble with explicit abstentions and risk classification
//! - Sentence-level alignment that highlights suspicious passages
//! - Configuration loading (TOML + environment)

pub mod algorithms;
pub mod analyzer;
pub mod config;
pub mod embeddings;
pub mod ensemble;
pub mod error;
pub mod highlight;
pub mod report;
pub mod risk;
pub mod text;

// Re-export commonly used types
pub use algorithms::{AbstainReason, AlgorithmKind, AlgorithmOutcome, MIN_TEXT_CHARS};
pub use analyzer::{compute_lexical_report, compute_score_report, AnalysisReport, SimilarityEngine};
pub use config::EngineConfig;
pub use embeddings::EmbeddingProvider;
pub use ensemble::{ReportNote, ScoreReport, WeightConfig};
pub use error::{AnalysisError, ConfigError, EmbeddingError};
pub use highlight::{
    find_similar_sentences, highlight_suspicious_text, HighlightResult, MatchTier, SentenceMatch,
};
pub use risk::{classify_risk, RiskLevel};
pub use text::{TextFragment, TextProfile, TextStatistics};
