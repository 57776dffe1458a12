//! Similarity CLI
//!
//! Compares a source document with a reference and reports the ensemble
//! score, highlighted sentences and text statistics. Logs go to stderr so
//! JSON output on stdout stays clean.

mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use similarity_core::{EngineConfig, SimilarityEngine, TextFragment, TextProfile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "similarity-cli")]
#[command(version, about = "Text similarity scoring and suspicious passage highlighting")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Sentence highlight threshold, overrides the configuration
    #[arg(short, long, global = true)]
    threshold: Option<f64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score, highlight and describe SOURCE against REFERENCE
    Analyze { source: PathBuf, reference: PathBuf },
    /// Highlight SOURCE sentences that match REFERENCE
    Highlight { source: PathBuf, reference: PathBuf },
    /// Print statistics, top words and repeated phrases for one file
    Stats { file: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting similarity-cli v{}", env!("CARGO_PKG_VERSION"));

    let engine = build_engine(&cli)?;

    match &cli.command {
        Command::Analyze { source, reference } => {
            let source = read_text(source, "source")?;
            let reference = read_text(reference, "reference")?;
            let report = engine.analyze(&source, &reference, None).await;
            emit(cli.format, &report, || render::analysis_text(&report))?;
        }
        Command::Highlight { source, reference } => {
            let source = read_text(source, "source")?;
            let reference = read_text(reference, "reference")?;
            let result = engine.highlight(&source, &reference);
            emit(cli.format, &result, || render::highlight_text(&result))?;
        }
        Command::Stats { file } => {
            let text = read_text(file, "input")?;
            let profile = TextProfile::from_text(&text);
            emit(cli.format, &profile, || render::profile_text(&profile))?;
        }
    }

    Ok(())
}

fn build_engine(cli: &Cli) -> Result<SimilarityEngine> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    config.apply_env()?;
    if let Some(threshold) = cli.threshold {
        config.highlight.threshold = threshold;
    }
    SimilarityEngine::new(config).context("Invalid engine configuration")
}

/// Read a file as UTF-8 text; other encodings are rejected.
fn read_text(path: &Path, side: &'static str) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {side} file: {}", path.display()))?;
    let fragment = TextFragment::from_utf8(&bytes, side)
        .with_context(|| format!("Cannot analyze {}", path.display()))?;
    Ok(fragment.raw().to_string())
}

fn emit<T, F>(format: Format, value: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Text => print!("{}", text()),
    }
    Ok(())
}
