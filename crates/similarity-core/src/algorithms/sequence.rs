//! Matching-blocks sequence ratio
//!
//! Recursively finds the longest common contiguous block, then repeats on the
//! unmatched regions to its left and right. The ratio is `2 * M / (|a| + |b|)`
//! where `M` is the total size of all matching blocks.
//!
//! # Popular elements
//!
//! When `b` has at least [`AUTOJUNK_MIN_LEN`] elements, any element occurring
//! more than `|b| / 100 + 1` times is dropped from the index and cannot anchor
//! a block. Blocks are still extended across equal popular elements on either
//! side, so a run of common words between two anchored words still counts.

use std::collections::HashMap;
use std::hash::Hash;

use super::{AbstainReason, AlgorithmOutcome};
use crate::text::TextFragment;

/// Minimum length of `b` before popular elements are dropped from the index
pub const AUTOJUNK_MIN_LEN: usize = 200;

/// A run of `size` equal elements at `a[a_start..]` and `b[b_start..]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchingBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Non-overlapping common blocks, ordered by position.
pub fn matching_blocks<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<MatchingBlock> {
    let mut matcher = Matcher::new(a, b);
    let mut blocks = Vec::new();
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let block = matcher.longest_match(alo, ahi, blo, bhi);
        if block.size == 0 {
            continue;
        }
        blocks.push(block);
        if alo < block.a_start && blo < block.b_start {
            pending.push((alo, block.a_start, blo, block.b_start));
        }
        let a_end = block.a_start + block.size;
        let b_end = block.b_start + block.size;
        if a_end < ahi && b_end < bhi {
            pending.push((a_end, ahi, b_end, bhi));
        }
    }

    blocks.sort_unstable();
    blocks
}

/// Index of `b` plus row buffers reused across every `longest_match` call
struct Matcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
    // j2len[j] = length of the match ending at a[i - 1], b[j]
    j2len: Vec<usize>,
    next: Vec<usize>,
    touched: Vec<usize>,
    next_touched: Vec<usize>,
}

impl<'a, T: Eq + Hash> Matcher<'a, T> {
    fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b2j.entry(item).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self {
            a,
            b,
            b2j,
            j2len: vec![0; b.len()],
            next: vec![0; b.len()],
            touched: Vec::new(),
            next_touched: Vec::new(),
        }
    }

    /// Longest block in `a[alo..ahi]` x `b[blo..bhi]`.
    ///
    /// Of all maximal anchored blocks, the one starting earliest in `a` wins,
    /// then the one starting earliest in `b`.
    fn longest_match(&mut self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        for i in alo..ahi {
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                let first = positions.partition_point(|&j| j < blo);
                for &j in &positions[first..] {
                    if j >= bhi {
                        break;
                    }
                    let k = if j > blo { self.j2len[j - 1] + 1 } else { 1 };
                    self.next[j] = k;
                    self.next_touched.push(j);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            for &j in &self.touched {
                self.j2len[j] = 0;
            }
            self.touched.clear();
            std::mem::swap(&mut self.j2len, &mut self.next);
            std::mem::swap(&mut self.touched, &mut self.next_touched);
        }
        for &j in &self.touched {
            self.j2len[j] = 0;
        }
        self.touched.clear();

        let (a, b) = (self.a, self.b);
        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && a[best_i + best_size] == b[best_j + best_size]
        {
            best_size += 1;
        }

        MatchingBlock {
            a_start: best_i,
            b_start: best_j,
            size: best_size,
        }
    }
}

/// Similarity ratio of two sequences in `[0, 1]`; two empty sequences give `1.0`.
///
/// # Examples
///
/// ```
/// use similarity_core::algorithms::sequence::ratio;
///
/// let a: Vec<char> = "abcd".chars().collect();
/// let b: Vec<char> = "bcde".chars().collect();
/// assert!((ratio(&a, &b) - 0.75).abs() < 1e-9);
/// ```
pub fn ratio<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = matching_blocks(a, b).iter().map(|block| block.size).sum();
    2.0 * matched as f64 / total as f64
}

/// Character-level ratio of two strings
pub fn char_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio(&a, &b)
}

pub(crate) fn sequence_ratio(a: &TextFragment, b: &TextFragment) -> AlgorithmOutcome {
    let (a, b) = (a.words(), b.words());
    if a.is_empty() || b.is_empty() {
        return AlgorithmOutcome::abstained(AbstainReason::EmptyFeatureSet);
    }
    AlgorithmOutcome::computed(ratio(a, b))
}
