//! Longest common subsequence over word tokens

use super::{AbstainReason, AlgorithmOutcome};
use crate::text::TextFragment;

/// Length of the longest common subsequence, in `O(|a| * |b|)` time and
/// `O(|b|)` space.
pub fn lcs_length<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

pub(crate) fn lcs_ratio(a: &TextFragment, b: &TextFragment) -> AlgorithmOutcome {
    let (a, b) = (a.words(), b.words());
    let longest = a.len().max(b.len());
    if a.is_empty() || b.is_empty() {
        return AlgorithmOutcome::abstained(AbstainReason::EmptyFeatureSet);
    }
    AlgorithmOutcome::computed(lcs_length(a, b) as f64 / longest as f64)
}
