//! Set-overlap algorithms: token Jaccard, word n-grams, content-word overlap

use std::collections::HashSet;
use std::hash::Hash;

use super::{AbstainReason, AlgorithmOutcome};
use crate::text::stopwords::is_overlap_stop_word;
use crate::text::TextFragment;

/// `|A ∩ B| / |A ∪ B|`, or `None` when either set is empty.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    Some(intersection as f64 / union as f64)
}

/// Contiguous word windows of length `n`, joined with a single space.
pub fn ngrams(tokens: &[String], n: usize) -> HashSet<String> {
    if n == 0 || tokens.len() < n {
        return HashSet::new();
    }
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

fn outcome(score: Option<f64>) -> AlgorithmOutcome {
    match score {
        Some(value) => AlgorithmOutcome::computed(value),
        None => AlgorithmOutcome::abstained(AbstainReason::EmptyFeatureSet),
    }
}

pub(crate) fn token_jaccard(a: &TextFragment, b: &TextFragment) -> AlgorithmOutcome {
    let a: HashSet<&str> = a.words().iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.words().iter().map(String::as_str).collect();
    outcome(jaccard(&a, &b))
}

pub(crate) fn ngram_overlap(a: &TextFragment, b: &TextFragment, n: usize) -> AlgorithmOutcome {
    outcome(jaccard(&ngrams(a.words(), n), &ngrams(b.words(), n)))
}

fn content_words(fragment: &TextFragment) -> HashSet<&str> {
    fragment
        .words()
        .iter()
        .map(String::as_str)
        .filter(|word| word.chars().count() > 2 && !is_overlap_stop_word(word))
        .collect()
}

pub(crate) fn stopword_overlap(a: &TextFragment, b: &TextFragment) -> AlgorithmOutcome {
    outcome(jaccard(&content_words(a), &content_words(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frag(text: &str) -> TextFragment {
        TextFragment::new(text)
    }

    #[test]
    fn test_jaccard_basic() {
        let a: HashSet<_> = [1, 2, 3].into_iter().collect();
        let b: HashSet<_> = [2, 3, 4].into_iter().collect();
        assert_eq!(jaccard(&a, &b), Some(0.5));
        assert_eq!(jaccard(&a, &HashSet::new()), None);
    }

    #[test]
    fn test_token_jaccard_ignores_repeats() {
        let outcome = token_jaccard(&frag("red red red blue"), &frag("blue red"));
        assert_eq!(outcome.value(), 1.0);
    }

    #[test]
    fn test_ngrams_join_words() {
        let tokens: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let bigrams = ngrams(&tokens, 2);
        assert_eq!(bigrams.len(), 2);
        assert!(bigrams.contains("a b"));
        assert!(bigrams.contains("b c"));
        assert!(ngrams(&tokens, 4).is_empty());
        assert!(ngrams(&tokens, 0).is_empty());
    }

    #[test]
    fn test_trigram_abstains_on_two_words() {
        let outcome = ngram_overlap(&frag("hello world"), &frag("hello world again"), 3);
        assert_eq!(
            outcome.abstain_reason(),
            Some(AbstainReason::EmptyFeatureSet)
        );
    }

    #[test]
    fn test_bigram_disjoint_is_zero() {
        let outcome = ngram_overlap(&frag("alpha beta gamma"), &frag("beta alpha delta"), 2);
        assert_eq!(outcome, AlgorithmOutcome::Computed { value: 0.0 });
    }

    #[test]
    fn test_stopword_overlap_uses_content_words() {
        // content words: {quick, fox} vs {quick, dog}
        let outcome = stopword_overlap(&frag("the quick fox is at it"), &frag("a quick dog"));
        assert!((outcome.value() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_stopword_overlap_abstains_without_content() {
        let outcome = stopword_overlap(&frag("it is what it is"), &frag("quick brown fox"));
        assert_eq!(
            outcome.abstain_reason(),
            Some(AbstainReason::EmptyFeatureSet)
        );
    }
}
