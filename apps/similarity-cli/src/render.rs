//! Plain-text rendering of engine results

use std::fmt::Write;

use similarity_core::report::round_display;
use similarity_core::{
    AlgorithmOutcome, AnalysisReport, HighlightResult, ScoreReport, TextProfile, TextStatistics,
};

pub fn score_text(report: &ScoreReport) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "Overall similarity: {:.3} ({} risk)",
        round_display(report.overall),
        report.risk
    )
    .unwrap();
    writeln!(out, "Algorithms:").unwrap();
    for (kind, outcome) in &report.scores {
        let value = match outcome {
            AlgorithmOutcome::Computed { value } => format!("{:.3}", round_display(*value)),
            AlgorithmOutcome::Abstained { reason } => format!("abstained ({reason})"),
        };
        writeln!(out, "  {:<18} {}", kind.key(), value).unwrap();
    }
    if !report.notes.is_empty() {
        writeln!(out, "Notes:").unwrap();
        for note in &report.notes {
            writeln!(out, "  - {}", note.message()).unwrap();
        }
    }
    out
}

pub fn highlight_text(result: &HighlightResult) -> String {
    let stats = &result.statistics;
    let mut out = String::new();
    writeln!(
        out,
        "Highlighted: {}/{} sentences ({:.1}%)",
        result.highlighted_count(),
        result.total_sentences,
        result.percentage_highlighted
    )
    .unwrap();
    if stats.matched_sentences > 0 {
        writeln!(
            out,
            "Similarity: min {:.3}, mean {:.3}, max {:.3}",
            stats.min_similarity, stats.mean_similarity, stats.max_similarity
        )
        .unwrap();
        writeln!(
            out,
            "Bands: >=0.9: {}, 0.8-0.9: {}, <0.8: {}",
            stats.high_count, stats.medium_count, stats.low_count
        )
        .unwrap();
    }
    out.push('\n');
    writeln!(out, "{}", result.render_marked()).unwrap();
    out
}

pub fn statistics_text(stats: &TextStatistics) -> String {
    let mut out = String::new();
    writeln!(out, "Characters:         {}", stats.character_count).unwrap();
    writeln!(out, "Words:              {}", stats.word_count).unwrap();
    writeln!(out, "Sentences:          {}", stats.sentence_count).unwrap();
    writeln!(out, "Unique words:       {}", stats.unique_word_count).unwrap();
    writeln!(out, "Avg word length:    {:.2}", stats.average_word_length).unwrap();
    writeln!(out, "Avg sentence words: {:.2}", stats.average_sentence_length).unwrap();
    writeln!(out, "Vocabulary ratio:   {:.3}", stats.vocabulary_richness).unwrap();
    out
}

pub fn profile_text(profile: &TextProfile) -> String {
    let mut out = statistics_text(&profile.statistics);
    if !profile.top_words.is_empty() {
        writeln!(out, "Top words:").unwrap();
        for entry in &profile.top_words {
            writeln!(out, "  {:<18} {}", entry.word, entry.count).unwrap();
        }
    }
    if !profile.repeated_phrases.is_empty() {
        writeln!(out, "Repeated phrases:").unwrap();
        for phrase in &profile.repeated_phrases {
            writeln!(out, "  {}x \"{}\"", phrase.occurrences, phrase.phrase).unwrap();
        }
    }
    out
}

pub fn analysis_text(report: &AnalysisReport) -> String {
    let mut out = score_text(&report.score);
    out.push('\n');
    out.push_str(&highlight_text(&report.highlight));
    out.push_str("\nSource statistics\n");
    out.push_str(&statistics_text(&report.source_statistics));
    out
}
