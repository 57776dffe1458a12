//! End-to-end scenarios for the similarity engine

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use similarity_core::algorithms::{similarity, AlgorithmKind};
use similarity_core::highlight::MatchTier;
use similarity_core::{
    classify_risk, compute_lexical_report, compute_score_report, find_similar_sentences,
    highlight_suspicious_text, EmbeddingError, EmbeddingProvider, EngineConfig, ReportNote,
    RiskLevel, SimilarityEngine, WeightConfig,
};

const FOX: &str = "The quick brown fox jumps over the lazy dog. It was a sunny afternoon.";
const QUANTUM: &str = "Quantum entanglement defies classical intuition.";
const BANANAS: &str = "Bananas are a good source of potassium.";

const ESSAY: &str = "Climate change affects global weather patterns. \
    Rising temperatures melt polar ice caps. \
    Many species face habitat loss as a result. \
    Governments debate policies to cut emissions.";
const PARAPHRASE: &str = "Climate change is affecting weather patterns globally. \
    Rising temperatures melt the polar ice caps. \
    Coral reefs are bleaching in warmer oceans. \
    Governments debate policies to cut carbon emissions.";

#[test]
fn identical_text_scores_one_and_highlights_everything() {
    let report = compute_lexical_report(FOX, FOX, &WeightConfig::default());
    assert!((report.overall - 1.0).abs() < 1e-9);
    assert_eq!(report.risk, RiskLevel::High);

    let highlight = highlight_suspicious_text(FOX, FOX, 0.7);
    assert_eq!(highlight.total_sentences, 2);
    assert_eq!(highlight.highlighted_count(), 2);
    assert_eq!(highlight.percentage_highlighted, 100.0);
    assert!(highlight
        .matches
        .iter()
        .all(|m| m.tier() == MatchTier::Critical));
}

#[test]
fn disjoint_texts_score_near_zero() {
    let report = compute_lexical_report(QUANTUM, BANANAS, &WeightConfig::default());
    assert_eq!(report.score(AlgorithmKind::Jaccard), Some(0.0));
    assert_eq!(report.score(AlgorithmKind::Bigram), Some(0.0));
    assert_eq!(report.score(AlgorithmKind::Trigram), Some(0.0));
    assert!(report.overall < 0.1);
    assert_eq!(report.risk, RiskLevel::Low);

    let highlight = highlight_suspicious_text(QUANTUM, BANANAS, 0.7);
    assert_eq!(highlight.highlighted_count(), 0);
}

#[test]
fn paraphrase_lands_between_extremes() {
    let report = compute_lexical_report(ESSAY, PARAPHRASE, &WeightConfig::default());
    assert!(report.overall > 0.2, "overall {}", report.overall);
    assert!(report.overall < 0.95, "overall {}", report.overall);
    assert!(report.notes.is_empty());
    assert_eq!(report.contributing.len(), 9);
}

#[test]
fn classic_profile_scores_three_signals() {
    let report = compute_lexical_report(ESSAY, PARAPHRASE, &WeightConfig::classic());
    assert_eq!(
        report.contributing,
        vec![
            AlgorithmKind::TfidfCosine,
            AlgorithmKind::Jaccard,
            AlgorithmKind::Levenshtein
        ]
    );
    let levenshtein = report.score(AlgorithmKind::Levenshtein).unwrap();
    assert!(levenshtein > 0.3 && levenshtein < 1.0, "levenshtein {levenshtein}");

    let identical = compute_lexical_report(ESSAY, ESSAY, &WeightConfig::classic());
    assert!((identical.overall - 1.0).abs() < 1e-9);
}

#[test]
fn threshold_sweep_is_monotonic() {
    let strict = highlight_suspicious_text(ESSAY, PARAPHRASE, 0.95);
    let loose = highlight_suspicious_text(ESSAY, PARAPHRASE, 0.5);
    assert!(loose.highlighted_count() >= strict.highlighted_count());
    assert!(loose.highlighted_count() >= 2);

    let mut previous = 0;
    for step in (0..=20).rev() {
        let threshold = step as f64 / 20.0;
        let count = highlight_suspicious_text(ESSAY, PARAPHRASE, threshold).highlighted_count();
        assert!(count >= previous, "threshold {threshold}");
        previous = count;
    }
}

#[test]
fn highlight_reconstructs_source_with_annotations() {
    let result = highlight_suspicious_text(ESSAY, PARAPHRASE, 0.7);
    let plain: Vec<&str> = result.segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(plain.len(), 4);
    assert_eq!(plain[1], "Rising temperatures melt polar ice caps.");

    let ice = &result.segments[1];
    assert!(ice.is_matched());
    assert_eq!(
        ice.matched_preview.as_deref(),
        Some("Rising temperatures melt the polar ice caps.")
    );
    assert!(!result.segments[2].is_matched());
    assert!(result.render_marked().contains("[[CRITICAL"));
}

#[test]
fn similar_sentence_listing_covers_all_pairs() {
    let reference = format!("{PARAPHRASE} Rising temperatures melt polar ice caps.");
    let pairs = find_similar_sentences(ESSAY, &reference, 0.7);
    let ice_pairs = pairs.iter().filter(|p| p.source_index == 1).count();
    assert_eq!(ice_pairs, 2);
    assert!(pairs.windows(2).all(|w| w[0].similarity >= w[1].similarity));

    // deduplicated view keeps only the exact copy
    let result = highlight_suspicious_text(ESSAY, &reference, 0.7);
    let ice = result.matches.iter().find(|m| m.source_index == 1).unwrap();
    assert_eq!(ice.matched_index, 4);
    assert_eq!(ice.similarity, 1.0);
}

#[test]
fn short_text_floor() {
    for kind in AlgorithmKind::LEXICAL {
        assert_eq!(similarity(kind, "abcd", FOX), 0.0, "{kind}");
        assert_eq!(similarity(kind, FOX, "    "), 0.0, "{kind}");
    }
    let report = compute_lexical_report("tiny", FOX, &WeightConfig::default());
    assert!(report.is_insufficient());
    assert_eq!(report.overall, 0.0);
}

#[test]
fn risk_classification_examples() {
    assert_eq!(classify_risk(0.3), RiskLevel::Low);
    assert_eq!(classify_risk(0.5), RiskLevel::Medium);
    assert_eq!(classify_risk(0.8), RiskLevel::High);
    assert_eq!(classify_risk(0.4), RiskLevel::Low);
    assert_eq!(classify_risk(0.7), RiskLevel::Medium);
}

#[test]
fn report_json_shape() {
    let report = compute_lexical_report(ESSAY, PARAPHRASE, &WeightConfig::default());
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["scores"].as_object().unwrap().len(), 9);
    assert_eq!(json["scores"]["tfidf_cosine"]["status"], "computed");
    let overall = json["overall"].as_f64().unwrap();
    assert_eq!(overall, (report.overall * 1000.0).round() / 1000.0);
    assert!(json["risk"].is_string());
}

#[test]
fn engine_from_toml_config() {
    let config = EngineConfig::from_toml_str(
        r#"
        [weights]
        jaccard = 0.5
        lcs = 0.5

        [highlight]
        threshold = 0.99
        "#,
    )
    .unwrap();
    let engine = SimilarityEngine::new(config).unwrap();

    let report = engine.analyze_lexical(ESSAY, PARAPHRASE);
    assert_eq!(report.score.scores.len(), 2);
    assert_eq!(report.highlight.threshold, 0.99);
    assert_eq!(report.source_statistics.sentence_count, 4);
}

struct BagOfLetters;

#[async_trait]
impl EmbeddingProvider for BagOfLetters {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut counts = vec![0.0f32; 26];
        for c in text.chars().filter(char::is_ascii_lowercase) {
            counts[(c as u8 - b'a') as usize] += 1.0;
        }
        Ok(counts)
    }

    fn dimension(&self) -> usize {
        26
    }

    fn name(&self) -> &str {
        "bag-of-letters"
    }
}

#[tokio::test]
async fn semantic_signal_joins_the_ensemble() {
    let weights = WeightConfig::semantic_aware(0.5).unwrap();

    let with_provider = compute_score_report(ESSAY, PARAPHRASE, &weights, Some(&BagOfLetters)).await;
    assert_eq!(with_provider.contributing.len(), 10);
    let semantic = with_provider.score(AlgorithmKind::Semantic).unwrap();
    assert!(semantic > 0.9, "letter histograms of related prose are close");

    let without = compute_score_report(ESSAY, PARAPHRASE, &weights, None).await;
    assert_eq!(without.contributing.len(), 9);
    assert!(matches!(
        without.notes.as_slice(),
        [ReportNote::EmbeddingUnavailable { .. }]
    ));
    assert!(with_provider.overall > without.overall);

    let sum: f64 = without.effective_weights.values().sum();
    assert!((sum - 1.0).abs() < 1e-9);
}
