//! Similarity engine: runs the ensemble, the aligner and text statistics
//!
//! The lexical algorithms are CPU-bound and run on the rayon pool. The async
//! entry points move that work onto a tokio blocking task and run it
//! concurrently with the embedding provider call.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::algorithms::{AbstainReason, AlgorithmConfig, AlgorithmKind, AlgorithmOutcome};
use crate::config::EngineConfig;
use crate::embeddings::{semantic_similarity, EmbeddingProvider};
use crate::ensemble::{ReportNote, ScoreReport, WeightConfig};
use crate::error::AnalysisError;
use crate::highlight::{HighlightResult, SentenceAligner};
use crate::text::{TextFragment, TextStatistics};

const NO_PROVIDER: &str = "no embedding provider configured";

/// Everything known about one source/reference comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub score: ScoreReport,
    pub highlight: HighlightResult,
    pub source_statistics: TextStatistics,
    pub reference_statistics: TextStatistics,
}

/// Configured entry point for scoring and highlighting text pairs
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    config: EngineConfig,
    aligner: SentenceAligner,
}

impl SimilarityEngine {
    pub fn new(config: EngineConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let aligner = config.aligner()?;
        Ok(Self { config, aligner })
    }

    /// Default configuration with the given weights
    pub fn with_weights(weights: WeightConfig) -> Self {
        Self {
            config: EngineConfig {
                weights,
                ..EngineConfig::default()
            },
            aligner: SentenceAligner::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Lexical ensemble only; a weighted semantic slot abstains.
    pub fn score_report(&self, a: &str, b: &str) -> ScoreReport {
        self.score_fragments(&TextFragment::new(a), &TextFragment::new(b))
    }

    pub fn score_fragments(&self, a: &TextFragment, b: &TextFragment) -> ScoreReport {
        let mut scores = lexical_outcomes(a, b, &self.config.weights, &self.config.vectorizer);
        let mut notes = Vec::new();
        if let Some((outcome, note)) = self.unavailable_semantic(NO_PROVIDER) {
            scores.insert(AlgorithmKind::Semantic, outcome);
            notes.extend(note);
        }
        self.finish(scores, notes)
    }

    /// Full ensemble, embedding both texts with `provider` when the semantic
    /// slot carries weight.
    pub async fn score_report_async(
        &self,
        a: &str,
        b: &str,
        provider: Option<&dyn EmbeddingProvider>,
    ) -> ScoreReport {
        let a = Arc::new(TextFragment::new(a));
        let b = Arc::new(TextFragment::new(b));

        let lexical = {
            let (a, b) = (Arc::clone(&a), Arc::clone(&b));
            let weights = self.config.weights.clone();
            let algorithms = self.config.vectorizer.clone();
            tokio::task::spawn_blocking(move || lexical_outcomes(&a, &b, &weights, &algorithms))
        };
        let semantic = self.semantic_outcome(&a, &b, provider);

        let (lexical, semantic) = tokio::join!(lexical, semantic);

        let mut notes = Vec::new();
        let mut scores = match lexical {
            Ok(scores) => scores,
            Err(err) => {
                warn!(error = %err, "Lexical analysis task failed");
                notes.push(ReportNote::ComputationFailed {
                    detail: err.to_string(),
                });
                self.config
                    .weights
                    .lexical_kinds()
                    .into_iter()
                    .map(|kind| {
                        (
                            kind,
                            AlgorithmOutcome::abstained(AbstainReason::ComputationFailed),
                        )
                    })
                    .collect()
            }
        };

        if let Some((outcome, note)) = semantic {
            scores.insert(AlgorithmKind::Semantic, outcome);
            notes.extend(note);
        }
        self.finish(scores, notes)
    }

    pub fn highlight(&self, source: &str, reference: &str) -> HighlightResult {
        self.aligner.align(source, reference)
    }

    /// Score, highlight and describe a pair without embeddings.
    pub fn analyze_lexical(&self, source: &str, reference: &str) -> AnalysisReport {
        let (score, highlight) = rayon::join(
            || self.score_report(source, reference),
            || self.highlight(source, reference),
        );
        AnalysisReport {
            score,
            highlight,
            source_statistics: TextStatistics::from_text(source),
            reference_statistics: TextStatistics::from_text(reference),
        }
    }

    /// Score, highlight and describe a pair.
    pub async fn analyze(
        &self,
        source: &str,
        reference: &str,
        provider: Option<&dyn EmbeddingProvider>,
    ) -> AnalysisReport {
        let highlight = {
            let aligner = self.aligner;
            let (source, reference) = (source.to_string(), reference.to_string());
            tokio::task::spawn_blocking(move || aligner.align(&source, &reference))
        };
        let score = self.score_report_async(source, reference, provider);

        let (score, highlight) = tokio::join!(score, highlight);
        let highlight = highlight.unwrap_or_else(|err| {
            warn!(error = %err, "Highlight task failed, aligning inline");
            self.highlight(source, reference)
        });

        AnalysisReport {
            score,
            highlight,
            source_statistics: TextStatistics::from_text(source),
            reference_statistics: TextStatistics::from_text(reference),
        }
    }

    /// Analyze raw bytes, rejecting input that is not UTF-8.
    pub fn analyze_bytes(
        &self,
        source: &[u8],
        reference: &[u8],
    ) -> Result<AnalysisReport, AnalysisError> {
        let source = TextFragment::from_utf8(source, "source")?;
        let reference = TextFragment::from_utf8(reference, "reference")?;
        Ok(self.analyze_lexical(source.raw(), reference.raw()))
    }

    async fn semantic_outcome(
        &self,
        a: &TextFragment,
        b: &TextFragment,
        provider: Option<&dyn EmbeddingProvider>,
    ) -> Option<(AlgorithmOutcome, Option<ReportNote>)> {
        let weight = self.config.weights.get(AlgorithmKind::Semantic)?;
        let provider = match provider {
            Some(provider) if weight > 0.0 => provider,
            _ => return self.unavailable_semantic(NO_PROVIDER),
        };

        let timeout = self.config.embedding.timeout();
        match semantic_similarity(provider, a, b, timeout).await {
            Ok(outcome) => {
                debug!(provider = provider.name(), ?outcome, "Semantic similarity");
                Some((outcome, None))
            }
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "Semantic similarity unavailable");
                self.unavailable_semantic(&err.to_string())
            }
        }
    }

    /// Abstention for a configured semantic slot; the note is only added when
    /// the slot carries weight.
    fn unavailable_semantic(&self, reason: &str) -> Option<(AlgorithmOutcome, Option<ReportNote>)> {
        let weight = self.config.weights.get(AlgorithmKind::Semantic)?;
        let note = (weight > 0.0).then(|| ReportNote::EmbeddingUnavailable {
            reason: reason.to_string(),
        });
        Some((
            AlgorithmOutcome::abstained(AbstainReason::EmbeddingUnavailable),
            note,
        ))
    }

    fn finish(
        &self,
        scores: BTreeMap<AlgorithmKind, AlgorithmOutcome>,
        notes: Vec<ReportNote>,
    ) -> ScoreReport {
        let report = ScoreReport::from_outcomes(scores, &self.config.weights, notes);
        info!(
            overall = report.overall,
            risk = %report.risk,
            contributing = report.contributing.len(),
            abstained = report.abstained.len(),
            "Computed similarity report"
        );
        report
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::with_weights(WeightConfig::default())
    }
}

/// Run every weighted lexical algorithm in parallel.
fn lexical_outcomes(
    a: &TextFragment,
    b: &TextFragment,
    weights: &WeightConfig,
    algorithms: &AlgorithmConfig,
) -> BTreeMap<AlgorithmKind, AlgorithmOutcome> {
    weights
        .lexical_kinds()
        .into_par_iter()
        .map(|kind| {
            let outcome = kind.evaluate(a, b, algorithms);
            debug!(algorithm = %kind, ?outcome, "Algorithm outcome");
            (kind, outcome)
        })
        .collect()
}

/// Score a pair with the given weights, embedding through `provider` when
/// the weights include a semantic share.
pub async fn compute_score_report(
    a: &str,
    b: &str,
    weights: &WeightConfig,
    provider: Option<&dyn EmbeddingProvider>,
) -> ScoreReport {
    SimilarityEngine::with_weights(weights.clone())
        .score_report_async(a, b, provider)
        .await
}

/// Score a pair with the lexical algorithms only.
///
/// # Examples
///
/// ```
/// use similarity_core::{compute_lexical_report, RiskLevel, WeightConfig};
///
/// let text = "The quick brown fox jumps over the lazy dog. It was a sunny afternoon.";
/// let report = compute_lexical_report(text, text, &WeightConfig::default());
/// assert!(report.overall > 0.99);
/// assert_eq!(report.risk, RiskLevel::High);
/// ```
pub fn compute_lexical_report(a: &str, b: &str, weights: &WeightConfig) -> ScoreReport {
    SimilarityEngine::with_weights(weights.clone()).score_report(a, b)
}
