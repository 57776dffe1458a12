//! Normalized Levenshtein similarity over characters

use super::{AbstainReason, AlgorithmOutcome};
use crate::text::TextFragment;

/// Longest normalized input, in characters, the edit distance is computed for.
/// The DP is `O(m * n)`; longer pairs abstain with `InputTooLong`.
pub const MAX_LEVENSHTEIN_CHARS: usize = 10_000;

/// Minimum number of single-element insertions, deletions and substitutions
/// turning `a` into `b`.
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, x) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let cost = usize::from(x != y);
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 - distance / max(len)`; two empty strings give `1.0`.
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance(&a, &b) as f64 / longest as f64
}

pub(crate) fn levenshtein_similarity(a: &TextFragment, b: &TextFragment) -> AlgorithmOutcome {
    if a.normalized_len() > MAX_LEVENSHTEIN_CHARS || b.normalized_len() > MAX_LEVENSHTEIN_CHARS {
        return AlgorithmOutcome::abstained(AbstainReason::InputTooLong);
    }
    AlgorithmOutcome::computed(levenshtein_ratio(a.normalized(), b.normalized()))
}
