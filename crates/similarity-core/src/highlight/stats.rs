//! Aggregate statistics over deduplicated sentence matches.

use serde::Serialize;

use crate::report::round3;

/// Similarity at or above which a match falls in the top band
pub const HIGH_BAND: f64 = 0.9;

/// Lower edge of the middle band
pub const MEDIUM_BAND: f64 = 0.8;

/// Summary of one highlight run.
///
/// Similarity fields are `0.0` when nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightStatistics {
    pub total_sentences: usize,
    pub matched_sentences: usize,
    /// Matched over total, in percent
    #[serde(serialize_with = "round3")]
    pub percentage: f64,
    #[serde(serialize_with = "round3")]
    pub min_similarity: f64,
    #[serde(serialize_with = "round3")]
    pub mean_similarity: f64,
    #[serde(serialize_with = "round3")]
    pub max_similarity: f64,
    /// Matches with similarity >= 0.9
    pub high_count: usize,
    /// Matches with 0.8 <= similarity < 0.9
    pub medium_count: usize,
    /// Matches with similarity < 0.8
    pub low_count: usize,
}

impl HighlightStatistics {
    /// Compute statistics from the similarities of deduplicated matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use similarity_core::highlight::HighlightStatistics;
    ///
    /// let stats = HighlightStatistics::from_similarities(4, &[0.95, 0.85, 0.75]);
    /// assert_eq!(stats.percentage, 75.0);
    /// assert_eq!((stats.high_count, stats.medium_count, stats.low_count), (1, 1, 1));
    /// ```
    pub fn from_similarities(total_sentences: usize, similarities: &[f64]) -> Self {
        let matched = similarities.len();
        let percentage = percentage(matched, total_sentences);

        if similarities.is_empty() {
            return Self {
                total_sentences,
                matched_sentences: 0,
                percentage,
                min_similarity: 0.0,
                mean_similarity: 0.0,
                max_similarity: 0.0,
                high_count: 0,
                medium_count: 0,
                low_count: 0,
            };
        }

        let min = similarities.iter().copied().fold(f64::INFINITY, f64::min);
        let max = similarities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = similarities.iter().sum::<f64>() / matched as f64;

        let high_count = similarities.iter().filter(|&&s| s >= HIGH_BAND).count();
        let medium_count = similarities
            .iter()
            .filter(|&&s| (MEDIUM_BAND..HIGH_BAND).contains(&s))
            .count();

        Self {
            total_sentences,
            matched_sentences: matched,
            percentage,
            min_similarity: min,
            mean_similarity: mean,
            max_similarity: max,
            high_count,
            medium_count,
            low_count: matched - high_count - medium_count,
        }
    }
}

/// `matched / total * 100`, or 0 when there are no sentences
pub fn percentage(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64 * 100.0
    }
}
