//! Text normalization and tokenization
//!
//! Every similarity algorithm and the sentence aligner go through this module:
//! - `normalize`: lowercase, strip URLs and email addresses, collapse whitespace
//! - `tokenize_words`: whitespace split with edge punctuation trimmed
//! - `tokenize_sentences`: split after `.`, `!` or `?` followed by whitespace
//!
//! All three are deterministic and never fail; empty input yields empty output.

pub mod stats;
pub mod stopwords;

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::error::AnalysisError;

pub use stats::{TextProfile, TextStatistics};

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"http\S+|www\S+").unwrap();
    static ref EMAIL_PATTERN: Regex = Regex::new(r"\S+@\S+").unwrap();
}

/// Lowercase, remove URL-like and email-like substrings, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let without_urls = URL_PATTERN.replace_all(&lower, " ");
    let without_emails = EMAIL_PATTERN.replace_all(&without_urls, " ");
    without_emails.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split into word tokens.
///
/// Leading and trailing punctuation is trimmed from each token, so `"dog."`
/// and `"dog"` compare equal; inner punctuation (`don't`, `e-mail`) is kept.
pub fn tokenize_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split into sentences at `.`, `!` or `?` followed by whitespace.
pub fn tokenize_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let boundary = chars
            .peek()
            .map(|(_, next)| next.is_whitespace())
            .unwrap_or(false);
        if boundary {
            let end = idx + c.len_utf8();
            push_sentence(&mut sentences, &text[start..end]);
            start = end;
        }
    }
    push_sentence(&mut sentences, &text[start..]);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// An immutable piece of text with lazily derived, cached views.
///
/// A fragment lives for one analysis call. The normalized form, its word
/// tokens and its sentences are computed on first use and never change.
#[derive(Debug)]
pub struct TextFragment {
    raw: String,
    normalized: OnceCell<String>,
    words: OnceCell<Vec<String>>,
    sentences: OnceCell<Vec<String>>,
}

impl TextFragment {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            normalized: OnceCell::new(),
            words: OnceCell::new(),
            sentences: OnceCell::new(),
        }
    }

    /// Build a fragment from raw bytes, rejecting invalid UTF-8.
    pub fn from_utf8(bytes: &[u8], side: &'static str) -> Result<Self, AnalysisError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|source| AnalysisError::InvalidEncoding { side, source })?;
        Ok(Self::new(text))
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        self.normalized.get_or_init(|| normalize(&self.raw))
    }

    /// Word tokens of the normalized text
    pub fn words(&self) -> &[String] {
        self.words.get_or_init(|| tokenize_words(self.normalized()))
    }

    /// Sentences of the normalized text
    pub fn sentences(&self) -> &[String] {
        self.sentences
            .get_or_init(|| tokenize_sentences(self.normalized()))
    }

    /// Length of the normalized text in characters
    pub fn normalized_len(&self) -> usize {
        self.normalized().chars().count()
    }
}

impl From<&str> for TextFragment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextFragment {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
