//! Sentence alignment and suspicious-passage highlighting
//!
//! The aligner compares every source sentence with every reference sentence,
//! keeps pairs at or above a threshold, and reduces them to at most one match
//! per source sentence: the most similar one, the lowest reference index on
//! ties.
//!
//! Matched sentences are tiered by similarity:
//! - Critical: >= 0.95
//! - High: >= 0.85
//! - Medium: >= 0.75
//! - Low: below 0.75 (but at or above the threshold)
//!
//! Sentences are split from the raw text, so the reconstructed output keeps
//! the original casing. Comparison is on lowercased, trimmed characters.

pub mod stats;

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::algorithms::sequence::ratio;
use crate::error::ConfigError;
use crate::report::{round3, round3_option};
use crate::text::tokenize_sentences;

pub use stats::HighlightStatistics;

/// Default similarity threshold for highlighting
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Characters of the matched sentence kept in a segment preview
pub const PREVIEW_CHARS: usize = 50;

pub const CRITICAL_TIER_THRESHOLD: f64 = 0.95;
pub const HIGH_TIER_THRESHOLD: f64 = 0.85;
pub const MEDIUM_TIER_THRESHOLD: f64 = 0.75;

/// Strength of a sentence match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Low,
    Medium,
    High,
    Critical,
}

impl From<f64> for MatchTier {
    fn from(similarity: f64) -> Self {
        if similarity >= CRITICAL_TIER_THRESHOLD {
            MatchTier::Critical
        } else if similarity >= HIGH_TIER_THRESHOLD {
            MatchTier::High
        } else if similarity >= MEDIUM_TIER_THRESHOLD {
            MatchTier::Medium
        } else {
            MatchTier::Low
        }
    }
}

impl MatchTier {
    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::Low => "LOW",
            MatchTier::Medium => "MEDIUM",
            MatchTier::High => "HIGH",
            MatchTier::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One source sentence paired with a reference sentence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceMatch {
    pub source_index: usize,
    pub matched_index: usize,
    #[serde(serialize_with = "round3")]
    pub similarity: f64,
    pub source_sentence: String,
    pub matched_sentence: String,
}

impl SentenceMatch {
    pub fn tier(&self) -> MatchTier {
        MatchTier::from(self.similarity)
    }
}

/// A source sentence in reconstruction order, annotated when matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub tier: Option<MatchTier>,
    #[serde(serialize_with = "round3_option")]
    pub similarity: Option<f64>,
    pub matched_preview: Option<String>,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tier: None,
            similarity: None,
            matched_preview: None,
        }
    }

    fn matched(text: &str, found: &SentenceMatch) -> Self {
        Self {
            text: text.to_string(),
            tier: Some(found.tier()),
            similarity: Some(found.similarity),
            matched_preview: Some(preview(&found.matched_sentence)),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.tier.is_some()
    }
}

/// Output of aligning a source text against a reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightResult {
    pub threshold: f64,
    /// At most one match per source sentence, in source order
    pub matches: Vec<SentenceMatch>,
    pub total_sentences: usize,
    #[serde(serialize_with = "round3")]
    pub percentage_highlighted: f64,
    /// Every source sentence, in order
    pub segments: Vec<Segment>,
    pub statistics: HighlightStatistics,
}

impl HighlightResult {
    pub fn highlighted_count(&self) -> usize {
        self.matches.len()
    }

    /// Source sentences joined by single spaces
    pub fn reconstructed_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Reconstructed text with matched sentences wrapped as `[[TIER NN%: sentence]]`.
    pub fn render_marked(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match (segment.tier, segment.similarity) {
                (Some(tier), Some(similarity)) => format!(
                    "[[{} {}%: {}]]",
                    tier.label(),
                    (similarity * 100.0).floor() as u32,
                    segment.text
                ),
                _ => segment.text.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// First `PREVIEW_CHARS` characters, with `...` appended when cut
pub fn preview(sentence: &str) -> String {
    if sentence.chars().count() > PREVIEW_CHARS {
        let head: String = sentence.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        sentence.to_string()
    }
}

fn fold(sentence: &str) -> Vec<char> {
    sentence.to_lowercase().trim().chars().collect()
}

/// Character-level similarity of every source/reference sentence pair.
///
/// Rows are computed in parallel. Non-finite cells are stored as `0.0`.
pub fn similarity_matrix(source: &[String], reference: &[String]) -> Vec<Vec<f64>> {
    let folded_reference: Vec<Vec<char>> = reference.iter().map(|s| fold(s)).collect();

    source
        .par_iter()
        .map(|sentence| {
            let folded = fold(sentence);
            folded_reference
                .iter()
                .map(|other| {
                    let cell = ratio(&folded, other);
                    if cell.is_finite() {
                        cell
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Threshold-based sentence aligner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentenceAligner {
    threshold: f64,
}

impl SentenceAligner {
    pub fn new(threshold: f64) -> Result<Self, ConfigError> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Every pair at or above the threshold, in source then reference order
    pub fn candidates(&self, source: &[String], reference: &[String]) -> Vec<SentenceMatch> {
        let matrix = similarity_matrix(source, reference);

        let mut found = Vec::new();
        for (i, row) in matrix.iter().enumerate() {
            for (j, &similarity) in row.iter().enumerate() {
                if similarity >= self.threshold {
                    found.push(SentenceMatch {
                        source_index: i,
                        matched_index: j,
                        similarity,
                        source_sentence: source[i].clone(),
                        matched_sentence: reference[j].clone(),
                    });
                }
            }
        }
        found
    }

    /// Align `source` against `reference` and build the highlight result.
    pub fn align(&self, source: &str, reference: &str) -> HighlightResult {
        let source_sentences = tokenize_sentences(source);
        let reference_sentences = tokenize_sentences(reference);

        let candidates = self.candidates(&source_sentences, &reference_sentences);
        let candidate_count = candidates.len();
        let matches = deduplicate(candidates);

        let by_index: BTreeMap<usize, &SentenceMatch> =
            matches.iter().map(|m| (m.source_index, m)).collect();
        let segments = source_sentences
            .iter()
            .enumerate()
            .map(|(i, sentence)| match by_index.get(&i) {
                Some(found) => Segment::matched(sentence, found),
                None => Segment::plain(sentence),
            })
            .collect();

        let similarities: Vec<f64> = matches.iter().map(|m| m.similarity).collect();
        let statistics =
            HighlightStatistics::from_similarities(source_sentences.len(), &similarities);

        debug!(
            source_sentences = source_sentences.len(),
            reference_sentences = reference_sentences.len(),
            candidates = candidate_count,
            matched = matches.len(),
            threshold = self.threshold,
            "Aligned sentences"
        );

        HighlightResult {
            threshold: self.threshold,
            total_sentences: source_sentences.len(),
            percentage_highlighted: statistics.percentage,
            matches,
            segments,
            statistics,
        }
    }
}

impl Default for SentenceAligner {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold(threshold))
    }
}

/// Keep the best match per source index; the first one seen wins ties.
fn deduplicate(candidates: Vec<SentenceMatch>) -> Vec<SentenceMatch> {
    let mut best: BTreeMap<usize, SentenceMatch> = BTreeMap::new();
    for candidate in candidates {
        match best.get(&candidate.source_index) {
            Some(current) if current.similarity >= candidate.similarity => {}
            _ => {
                best.insert(candidate.source_index, candidate);
            }
        }
    }
    best.into_values().collect()
}

fn aligner_or_default(threshold: f64) -> SentenceAligner {
    SentenceAligner::new(threshold).unwrap_or_else(|err| {
        warn!(%err, fallback = DEFAULT_THRESHOLD, "Invalid highlight threshold");
        SentenceAligner::default()
    })
}

/// Highlight source sentences that closely match the reference.
///
/// A threshold outside `[0, 1]` (or NaN) falls back to 0.7.
///
/// # Examples
///
/// ```
/// use similarity_core::highlight::{highlight_suspicious_text, MatchTier};
///
/// let result = highlight_suspicious_text(
///     "The sky is blue. Cats purr loudly.",
///     "The sky is blue.",
///     0.7,
/// );
/// assert_eq!(result.highlighted_count(), 1);
/// assert_eq!(result.matches[0].tier(), MatchTier::Critical);
/// assert_eq!(result.percentage_highlighted, 50.0);
/// ```
pub fn highlight_suspicious_text(source: &str, reference: &str, threshold: f64) -> HighlightResult {
    aligner_or_default(threshold).align(source, reference)
}

/// All sentence pairs at or above `threshold`, most similar first.
///
/// Unlike [`highlight_suspicious_text`] a source sentence may appear several
/// times. Equal similarities keep source then reference order.
pub fn find_similar_sentences(source: &str, reference: &str, threshold: f64) -> Vec<SentenceMatch> {
    let aligner = aligner_or_default(threshold);
    let mut pairs = aligner.candidates(
        &tokenize_sentences(source),
        &tokenize_sentences(reference),
    );
    pairs.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs
}
