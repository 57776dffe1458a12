//! Descriptive statistics for a single document.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::report::round3;
use crate::text::stopwords::is_overlap_stop_word;
use crate::text::{normalize, tokenize_sentences, tokenize_words, TextFragment};

/// Content words listed by [`TextProfile`]
pub const DEFAULT_TOP_WORDS: usize = 10;
/// Shortest phrase, in words, reported as repeated
pub const MIN_PHRASE_WORDS: usize = 3;
/// Phrases longer than this many words are not considered
pub const MAX_PHRASE_WORDS: usize = 9;
/// Occurrences within one sentence before a phrase counts as repeated
pub const MIN_PHRASE_OCCURRENCES: usize = 2;

/// Size and vocabulary summary of one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStatistics {
    pub character_count: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub unique_word_count: usize,
    #[serde(serialize_with = "round3")]
    pub average_word_length: f64,
    /// Words per sentence
    #[serde(serialize_with = "round3")]
    pub average_sentence_length: f64,
    /// Unique words over total words
    #[serde(serialize_with = "round3")]
    pub vocabulary_richness: f64,
}

impl TextStatistics {
    /// Compute statistics for raw text.
    ///
    /// # Examples
    ///
    /// ```
    /// use similarity_core::text::TextStatistics;
    ///
    /// let stats = TextStatistics::from_text("One fish. Two fish.");
    /// assert_eq!(stats.word_count, 4);
    /// assert_eq!(stats.sentence_count, 2);
    /// assert_eq!(stats.unique_word_count, 3);
    /// ```
    pub fn from_text(text: &str) -> Self {
        Self::from_fragment(&TextFragment::new(text))
    }

    pub fn from_fragment(fragment: &TextFragment) -> Self {
        let words = fragment.words();
        let word_count = words.len();
        let sentence_count = fragment.sentences().len();
        let unique_word_count = words.iter().collect::<HashSet<_>>().len();

        let total_word_chars: usize = words.iter().map(|w| w.chars().count()).sum();

        Self {
            character_count: fragment.raw().chars().count(),
            word_count,
            sentence_count,
            unique_word_count,
            average_word_length: ratio(total_word_chars, word_count),
            average_sentence_length: ratio(word_count, sentence_count),
            vocabulary_richness: ratio(unique_word_count, word_count),
        }
    }
}

/// A content word and how often it occurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

/// A word sequence repeated inside one sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatedPhrase {
    pub phrase: String,
    pub occurrences: usize,
    /// Length in words
    pub length: usize,
}

/// The `top_n` most frequent content words of `text`.
///
/// Stopwords are dropped after normalization. Ties keep first-occurrence order.
///
/// # Examples
///
/// ```
/// use similarity_core::text::stats::word_frequency;
///
/// let top = word_frequency("The cat saw the other cat.", 1);
/// assert_eq!(top[0].word, "cat");
/// assert_eq!(top[0].count, 2);
/// ```
pub fn word_frequency(text: &str, top_n: usize) -> Vec<WordFrequency> {
    let words = tokenize_words(&normalize(text));
    let mut frequencies = count_in_order(
        words
            .into_iter()
            .filter(|word| !is_overlap_stop_word(word)),
    );
    frequencies.sort_by(|a, b| b.1.cmp(&a.1));
    frequencies
        .into_iter()
        .take(top_n)
        .map(|(word, count)| WordFrequency { word, count })
        .collect()
}

/// Phrases of `min_length` to [`MAX_PHRASE_WORDS`] words that occur at least
/// `min_occurrences` times within a single sentence, most frequent first.
pub fn repeated_phrases(text: &str, min_length: usize, min_occurrences: usize) -> Vec<RepeatedPhrase> {
    let mut repeated = Vec::new();

    for sentence in tokenize_sentences(text) {
        let words = tokenize_words(&normalize(&sentence));
        for length in min_length.max(1)..=MAX_PHRASE_WORDS.min(words.len()) {
            let phrases = count_in_order(words.windows(length).map(|window| window.join(" ")));
            repeated.extend(
                phrases
                    .into_iter()
                    .filter(|(_, count)| *count >= min_occurrences)
                    .map(|(phrase, occurrences)| RepeatedPhrase {
                        phrase,
                        occurrences,
                        length,
                    }),
            );
        }
    }

    repeated.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    repeated
}

/// Statistics, top content words and repeated phrases of one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextProfile {
    pub statistics: TextStatistics,
    pub top_words: Vec<WordFrequency>,
    pub repeated_phrases: Vec<RepeatedPhrase>,
}

impl TextProfile {
    pub fn from_text(text: &str) -> Self {
        Self {
            statistics: TextStatistics::from_text(text),
            top_words: word_frequency(text, DEFAULT_TOP_WORDS),
            repeated_phrases: repeated_phrases(text, MIN_PHRASE_WORDS, MIN_PHRASE_OCCURRENCES),
        }
    }
}

/// Count items, keeping the order in which each first appeared
fn count_in_order(items: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for item in items {
        match index.get(&item) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
