//! Sentence-level best match
//!
//! For every sentence of the first text, take the highest word-level sequence
//! ratio against any sentence of the second text, then average.

use super::sequence::ratio;
use super::{AbstainReason, AlgorithmOutcome};
use crate::text::{tokenize_words, TextFragment};

fn sentence_tokens(fragment: &TextFragment) -> Vec<Vec<String>> {
    fragment
        .sentences()
        .iter()
        .map(|sentence| tokenize_words(sentence))
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

pub(crate) fn sentence_max(a: &TextFragment, b: &TextFragment) -> AlgorithmOutcome {
    let source = sentence_tokens(a);
    let reference = sentence_tokens(b);
    if source.is_empty() || reference.is_empty() {
        return AlgorithmOutcome::abstained(AbstainReason::NoSentences);
    }

    let total: f64 = source
        .iter()
        .map(|s| {
            reference
                .iter()
                .map(|r| ratio(s, r))
                .fold(0.0, f64::max)
        })
        .sum();

    AlgorithmOutcome::computed(total / source.len() as f64)
}
