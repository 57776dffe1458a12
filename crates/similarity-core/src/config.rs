//! Engine configuration
//!
//! Loaded from TOML, optionally overridden by environment variables. Every
//! section has defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! [weights]
//! tfidf_cosine = 0.5
//! jaccard = 0.5
//!
//! [highlight]
//! threshold = 0.8
//!
//! [vectorizer.tfidf]
//! ngram_max = 2
//! max_features = "none"
//!
//! [embedding]
//! timeout_ms = 2500
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::algorithms::vectorizer::parse_max_features;
use crate::algorithms::AlgorithmConfig;
use crate::ensemble::WeightConfig;
use crate::error::ConfigError;
use crate::highlight::{validate_threshold, SentenceAligner, DEFAULT_THRESHOLD};

/// Top-level configuration for a [`crate::SimilarityEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub vectorizer: AlgorithmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Minimum sentence similarity to highlight (default: 0.7)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Budget for embedding both texts (default: 10000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    ///
    /// Recognized variables:
    /// - SIMILARITY_THRESHOLD: highlight threshold in [0, 1]
    /// - SIMILARITY_MAX_FEATURES: vocabulary cap for both vectorizers, or `none`
    /// - SIMILARITY_EMBEDDING_TIMEOUT_MS: embedding budget in milliseconds
    /// - SIMILARITY_SEMANTIC_WEIGHT: switch to the semantic-aware weight profile
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply environment overrides on top of this configuration
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SIMILARITY_THRESHOLD") {
            self.highlight.threshold = parse_var("SIMILARITY_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("SIMILARITY_MAX_FEATURES") {
            let max_features = parse_max_features(&raw).with_context(|| {
                format!("Invalid value for SIMILARITY_MAX_FEATURES: {raw:?}")
            })?;
            self.vectorizer = self.vectorizer.clone().with_max_features(max_features);
        }
        if let Some(raw) = lookup("SIMILARITY_EMBEDDING_TIMEOUT_MS") {
            self.embedding.timeout_ms = parse_var("SIMILARITY_EMBEDDING_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("SIMILARITY_SEMANTIC_WEIGHT") {
            let share: f64 = parse_var("SIMILARITY_SEMANTIC_WEIGHT", &raw)?;
            self.weights = WeightConfig::semantic_aware(share)?;
        }
        self.validate()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold(self.highlight.threshold)?;
        self.vectorizer.validate()
    }

    pub fn aligner(&self) -> Result<SentenceAligner, ConfigError> {
        SentenceAligner::new(self.highlight.threshold)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid value for {key}: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::AlgorithmKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.highlight.threshold, 0.7);
        assert_eq!(config.embedding.timeout(), Duration::from_secs(10));
        assert_eq!(config.vectorizer.tfidf.max_features, Some(5000));
    }

    #[test]
    fn test_parse_sections() {
        let config = EngineConfig::from_toml_str(
            r#"
            [weights]
            tfidf_cosine = 0.5
            jaccard = 0.5

            [highlight]
            threshold = 0.85

            [vectorizer.tfidf]
            ngram_max = 2

            [embedding]
            timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.weights.get(AlgorithmKind::Jaccard), Some(0.5));
        assert_eq!(config.weights.len(), 2);
        assert_eq!(config.highlight.threshold, 0.85);
        assert_eq!(config.vectorizer.tfidf.ngram_max, 2);
        assert_eq!(config.vectorizer.tfidf.ngram_min, 1);
        assert_eq!(config.embedding.timeout_ms, 250);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(EngineConfig::from_toml_str("[highlight]\nthreshold = 1.5").is_err());
        assert!(EngineConfig::from_toml_str("[weights]\nfuzzy = 1.0").is_err());
        assert!(EngineConfig::from_toml_str("[weights]\njaccard = 0.4").is_err());
        assert!(EngineConfig::from_toml_str("[vectorizer.count]\nngram_min = 0").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[highlight]\nthreshold = 0.9").unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.highlight.threshold, 0.9);
    }

    #[test]
    fn test_from_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/similarity.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_overrides() {
        let mut config = EngineConfig::default();
        config
            .apply_overrides(lookup(&[
                ("SIMILARITY_THRESHOLD", "0.8"),
                ("SIMILARITY_MAX_FEATURES", "100"),
                ("SIMILARITY_EMBEDDING_TIMEOUT_MS", "500"),
                ("SIMILARITY_SEMANTIC_WEIGHT", "0.3"),
            ]))
            .unwrap();

        assert_eq!(config.highlight.threshold, 0.8);
        assert_eq!(config.vectorizer.tfidf.max_features, Some(100));
        assert_eq!(config.vectorizer.count.max_features, Some(100));
        assert_eq!(config.embedding.timeout_ms, 500);
        assert_eq!(config.weights.semantic_weight(), 0.3);
    }

    #[test]
    fn test_max_features_override_bounds() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_overrides(lookup(&[("SIMILARITY_MAX_FEATURES", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("max_features must be at least 1"));

        let mut config = EngineConfig::default();
        config
            .apply_overrides(lookup(&[("SIMILARITY_MAX_FEATURES", "none")]))
            .unwrap();
        assert_eq!(config.vectorizer.tfidf.max_features, None);
        assert_eq!(config.vectorizer.count.max_features, None);

        assert!(EngineConfig::from_toml_str("[vectorizer.tfidf]\nmax_features = 0").is_err());
    }

    #[test]
    fn test_overrides_reject_garbage() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_overrides(lookup(&[("SIMILARITY_THRESHOLD", "high")]))
            .unwrap_err();
        assert!(err.to_string().contains("SIMILARITY_THRESHOLD"));

        let mut config = EngineConfig::default();
        assert!(config
            .apply_overrides(lookup(&[("SIMILARITY_THRESHOLD", "2.0")]))
            .is_err());
    }
}
