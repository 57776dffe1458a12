//! Embedding provider seam for the semantic signal
//!
//! The engine never loads a model itself. Callers that want the semantic
//! algorithm pass an [`EmbeddingProvider`]; without one the semantic slot
//! abstains and the lexical ensemble is used alone.

use std::time::Duration;

use async_trait::async_trait;

use crate::algorithms::vectorizer::cosine_similarity;
use crate::algorithms::{check_floor, AbstainReason, AlgorithmOutcome};
use crate::error::EmbeddingError;
use crate::text::TextFragment;

/// Default per-comparison budget for the provider
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of fixed-dimension text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Length of every vector returned by `embed`
    fn dimension(&self) -> usize;

    /// Name used in log output
    fn name(&self) -> &str {
        "embedding-provider"
    }
}

/// Cosine similarity of the two normalized texts' embeddings, clamped to `[0, 1]`.
///
/// Short input abstains without calling the provider. A zero-length
/// embedding abstains with `DegenerateVector`. Provider failures, dimension
/// mismatches and timeouts are returned as errors so the caller can record
/// them.
pub async fn semantic_similarity(
    provider: &dyn EmbeddingProvider,
    a: &TextFragment,
    b: &TextFragment,
    timeout: Duration,
) -> Result<AlgorithmOutcome, EmbeddingError> {
    if let Some(short) = check_floor(a, b) {
        return Ok(short);
    }

    let embed_both = async {
        tokio::join!(provider.embed(a.normalized()), provider.embed(b.normalized()))
    };
    let (left, right) = tokio::time::timeout(timeout, embed_both)
        .await
        .map_err(|_| EmbeddingError::Timeout(timeout))?;
    let (left, right) = (left?, right?);

    let expected = provider.dimension();
    for actual in [left.len(), right.len()] {
        if actual != expected {
            return Err(EmbeddingError::DimensionMismatch { expected, actual });
        }
    }

    let left: Vec<f64> = left.into_iter().map(f64::from).collect();
    let right: Vec<f64> = right.into_iter().map(f64::from).collect();

    Ok(match cosine_similarity(&left, &right) {
        Some(cosine) => AlgorithmOutcome::computed(cosine),
        None => AlgorithmOutcome::abstained(AbstainReason::DegenerateVector),
    })
}
