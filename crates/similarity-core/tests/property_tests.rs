//! Property-based tests for similarity-core
//!
//! Invariants of the algorithms, the ensemble and the sentence aligner.

use std::collections::HashSet;

use proptest::prelude::*;
use similarity_core::algorithms::{AlgorithmConfig, AlgorithmKind, AbstainReason};
use similarity_core::highlight::{similarity_matrix, MatchTier};
use similarity_core::text::tokenize_sentences;
use similarity_core::{
    classify_risk, compute_lexical_report, highlight_suspicious_text, TextFragment, WeightConfig,
};

// ============================================================
// Generators
// ============================================================

const ENDINGS: &[&str] = &[".", "!", "?"];

const VOCABULARY: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "omega", "river", "stone", "light", "paper", "cloud",
];

fn word() -> impl Strategy<Value = String> {
    prop::sample::select(VOCABULARY).prop_map(str::to_string)
}

/// A sentence of 2-7 vocabulary words, capitalized and terminated
fn sentence() -> impl Strategy<Value = String> {
    (prop::collection::vec(word(), 2..8), prop::sample::select(ENDINGS)).prop_map(
        |(words, end)| {
            let mut text = words.join(" ");
            text[..1].make_ascii_uppercase();
            text.push_str(end);
            text
        },
    )
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(sentence(), 1..6).prop_map(|sentences| sentences.join(" "))
}

/// 2-9 lowercase words, all starting with `prefix`
fn prefixed_words(prefix: char) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{3,7}", 2..10).prop_map(move |words| {
        words.into_iter().map(|w| format!("{prefix}{w}")).collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // ============================================================
    // Range and floor
    // ============================================================

    #[test]
    fn scores_stay_in_unit_range(a in ".{0,160}", b in ".{0,160}") {
        let report = compute_lexical_report(&a, &b, &WeightConfig::default());
        prop_assert!((0.0..=1.0).contains(&report.overall));
        for outcome in report.scores.values() {
            prop_assert!((0.0..=1.0).contains(&outcome.value()));
        }
        let sum: f64 = report.effective_weights.values().sum();
        prop_assert!(report.effective_weights.is_empty() || (sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn short_input_abstains_everywhere(short in "[a-z ]{0,4}", other in document()) {
        let config = AlgorithmConfig::default();
        let short = TextFragment::new(short);
        let other = TextFragment::new(other);
        for kind in AlgorithmKind::LEXICAL {
            for outcome in [
                kind.evaluate(&short, &other, &config),
                kind.evaluate(&other, &short, &config),
            ] {
                prop_assert_eq!(outcome.abstain_reason(), Some(AbstainReason::InputTooShort));
                prop_assert_eq!(outcome.value(), 0.0);
            }
        }
    }

    // ============================================================
    // Identity
    // ============================================================

    #[test]
    fn identical_documents_score_one(doc in document()) {
        let report = compute_lexical_report(&doc, &doc, &WeightConfig::default());
        prop_assert!((report.overall - 1.0).abs() < 1e-9, "overall {}", report.overall);

        let highlight = highlight_suspicious_text(&doc, &doc, 0.7);
        prop_assert_eq!(highlight.highlighted_count(), highlight.total_sentences);
        prop_assert_eq!(highlight.percentage_highlighted, 100.0);
        prop_assert!(highlight.matches.iter().all(|m| m.tier() == MatchTier::Critical));
    }

    // ============================================================
    // Jaccard bounds
    // ============================================================

    #[test]
    fn jaccard_zero_for_disjoint_vocabularies(a in prefixed_words('q'), b in prefixed_words('z')) {
        let a = a.join(" ");
        let b = b.join(" ");
        let report = compute_lexical_report(&a, &b, &WeightConfig::default());
        prop_assert_eq!(report.score(AlgorithmKind::Jaccard), Some(0.0));
    }

    #[test]
    fn jaccard_one_for_identical_vocabularies(words in prefixed_words('q')) {
        let forward = words.join(" ");
        let backward: Vec<String> = words.iter().rev().cloned().collect();
        let backward = backward.join(" ");
        let report = compute_lexical_report(&forward, &backward, &WeightConfig::default());
        prop_assert_eq!(report.score(AlgorithmKind::Jaccard), Some(1.0));
    }

    // ============================================================
    // Sentence aligner
    // ============================================================

    #[test]
    fn dedup_keeps_one_best_match_per_sentence(
        source in document(),
        reference in document(),
        threshold in 0.0f64..=1.0,
    ) {
        let result = highlight_suspicious_text(&source, &reference, threshold);
        let matrix = similarity_matrix(
            &tokenize_sentences(&source),
            &tokenize_sentences(&reference),
        );

        let mut seen = HashSet::new();
        for m in &result.matches {
            prop_assert!(seen.insert(m.source_index));
            prop_assert!(m.similarity >= threshold);
            let row = &matrix[m.source_index];
            let best = row.iter().copied().fold(0.0, f64::max);
            prop_assert_eq!(m.similarity, best);
            let first_best = row.iter().position(|&s| s == best);
            prop_assert_eq!(Some(m.matched_index), first_best);
        }
    }

    #[test]
    fn reconstruction_preserves_every_sentence(source in document(), reference in document()) {
        let result = highlight_suspicious_text(&source, &reference, 0.7);
        let texts: Vec<String> = result.segments.iter().map(|s| s.text.clone()).collect();
        prop_assert_eq!(texts, tokenize_sentences(&source));
        prop_assert_eq!(result.reconstructed_text(), source);
    }

    #[test]
    fn lower_threshold_never_highlights_less(
        source in document(),
        reference in document(),
        t1 in 0.0f64..=1.0,
        t2 in 0.0f64..=1.0,
    ) {
        let (low, high) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let loose = highlight_suspicious_text(&source, &reference, low);
        let strict = highlight_suspicious_text(&source, &reference, high);
        prop_assert!(loose.highlighted_count() >= strict.highlighted_count());
    }

    // ============================================================
    // Risk
    // ============================================================

    #[test]
    fn risk_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify_risk(low) <= classify_risk(high));
    }
}
