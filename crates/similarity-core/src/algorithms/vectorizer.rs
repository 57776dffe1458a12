//! Term-vector cosine similarity (TF-IDF and raw counts)
//!
//! The vectorizer is fitted on exactly the two documents being compared and
//! discarded afterwards. Terms are `\b\w\w+\b` matches on the normalized text
//! with vectorizer stopwords removed, expanded into word n-grams.
//!
//! IDF uses smoothing: `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, where `n = 2`.
//! Vectors are L2-normalized before the cosine.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::{AbstainReason, AlgorithmOutcome};
use crate::error::ConfigError;
use crate::text::stopwords::is_vectorizer_stop_word;
use crate::text::TextFragment;

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

/// Default vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 5000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorizerConfig {
    /// Smallest n-gram length, inclusive
    pub ngram_min: usize,
    /// Largest n-gram length, inclusive
    pub ngram_max: usize,
    /// Keep only the most frequent terms; `None` keeps all
    pub max_features: Option<usize>,
    pub use_idf: bool,
    pub filter_stop_words: bool,
}

impl VectorizerConfig {
    /// 1-3 grams, IDF weighted
    pub fn tfidf() -> Self {
        Self {
            ngram_min: 1,
            ngram_max: 3,
            max_features: Some(DEFAULT_MAX_FEATURES),
            use_idf: true,
            filter_stop_words: true,
        }
    }

    /// Unigram raw counts
    pub fn counts() -> Self {
        Self {
            ngram_min: 1,
            ngram_max: 1,
            max_features: Some(DEFAULT_MAX_FEATURES),
            use_idf: false,
            filter_stop_words: true,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            return Err(ConfigError::InvalidNgramRange(self.ngram_min, self.ngram_max));
        }
        if self.max_features == Some(0) {
            return Err(ConfigError::InvalidMaxFeatures);
        }
        Ok(())
    }
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self::tfidf()
    }
}

/// Partial vectorizer settings as read from a config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VectorizerOverrides {
    pub ngram_min: Option<usize>,
    pub ngram_max: Option<usize>,
    /// `Some(None)` lifts the cap; written as `max_features = "none"`
    #[serde(default, deserialize_with = "deserialize_max_features")]
    pub max_features: Option<Option<usize>>,
    pub use_idf: Option<bool>,
    pub filter_stop_words: Option<bool>,
}

impl VectorizerOverrides {
    /// Fill the unset fields from `base`
    pub fn apply(self, base: VectorizerConfig) -> VectorizerConfig {
        VectorizerConfig {
            ngram_min: self.ngram_min.unwrap_or(base.ngram_min),
            ngram_max: self.ngram_max.unwrap_or(base.ngram_max),
            max_features: self.max_features.unwrap_or(base.max_features),
            use_idf: self.use_idf.unwrap_or(base.use_idf),
            filter_stop_words: self.filter_stop_words.unwrap_or(base.filter_stop_words),
        }
    }
}

/// Parse a vocabulary cap: a count, or `"none"` for no cap
pub fn parse_max_features(raw: &str) -> Option<Option<usize>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Some(None);
    }
    raw.parse().ok().map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMaxFeatures {
    Count(usize),
    Keyword(String),
}

fn deserialize_max_features<'de, D>(deserializer: D) -> Result<Option<Option<usize>>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawMaxFeatures::deserialize(deserializer)? {
        RawMaxFeatures::Count(count) => Ok(Some(Some(count))),
        RawMaxFeatures::Keyword(keyword) => parse_max_features(&keyword)
            .filter(Option::is_none)
            .map(Some)
            .ok_or_else(|| {
                D::Error::custom(format!(
                    "max_features must be a count or \"none\", got {keyword:?}"
                ))
            }),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VectorizeError {
    #[error("no terms remain after tokenization and stopword removal")]
    EmptyVocabulary,
}

/// Vocabulary and IDF weights fitted on a small document set
#[derive(Debug, Clone)]
pub struct FittedVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl FittedVectorizer {
    /// Fit on `documents` and return the L2-normalized vector of each one.
    pub fn fit_transform(
        config: &VectorizerConfig,
        documents: &[&str],
    ) -> Result<(Self, Vec<Vec<f64>>), VectorizeError> {
        let term_counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| count_terms(&extract_terms(doc, config)))
            .collect();

        let mut totals: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for counts in &term_counts {
            for (term, count) in counts {
                *totals.entry(term.as_str()).or_insert(0) += count;
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        if totals.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        // Highest corpus frequency first, ties broken alphabetically
        let mut ranked: Vec<(&str, usize)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        if let Some(limit) = config.max_features {
            ranked.truncate(limit);
        }

        let mut selected: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        selected.sort_unstable();

        let n_docs = documents.len() as f64;
        let vocabulary: BTreeMap<String, usize> = selected
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();
        let idf: Vec<f64> = selected
            .iter()
            .map(|term| {
                if config.use_idf {
                    let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                    ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
                } else {
                    1.0
                }
            })
            .collect();

        let fitted = Self { vocabulary, idf };
        let vectors = term_counts
            .iter()
            .map(|counts| fitted.weigh(counts))
            .collect();

        Ok((fitted, vectors))
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    fn weigh(&self, counts: &HashMap<String, usize>) -> Vec<f64> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for (term, count) in counts {
            if let Some(&idx) = self.vocabulary.get(term) {
                vector[idx] = *count as f64 * self.idf[idx];
            }
        }
        l2_normalize(&mut vector);
        vector
    }
}

/// Terms of one document: filtered tokens expanded into the configured n-grams
pub fn extract_terms(text: &str, config: &VectorizerConfig) -> Vec<String> {
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| !config.filter_stop_words || !is_vectorizer_stop_word(token))
        .collect();

    let mut terms = Vec::new();
    for n in config.ngram_min.max(1)..=config.ngram_max {
        if tokens.len() < n {
            break;
        }
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}

fn count_terms(terms: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term.clone()).or_insert(0) += 1;
    }
    counts
}

fn l2_normalize(vector: &mut [f64]) {
    let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Cosine of two equal-length vectors; `None` when either has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a * norm_b))
}

pub(crate) fn vector_cosine(
    a: &TextFragment,
    b: &TextFragment,
    config: &VectorizerConfig,
) -> AlgorithmOutcome {
    match FittedVectorizer::fit_transform(config, &[a.normalized(), b.normalized()]) {
        Ok((_, vectors)) => match cosine_similarity(&vectors[0], &vectors[1]) {
            Some(cosine) => AlgorithmOutcome::computed(cosine),
            None => AlgorithmOutcome::abstained(AbstainReason::DegenerateVector),
        },
        Err(VectorizeError::EmptyVocabulary) => {
            AlgorithmOutcome::abstained(AbstainReason::EmptyVocabulary)
        }
    }
}
