//! Customer churn prediction
//!
//! Normalizes raw telco customer records into the feature row a pre-trained
//! classifier expects, scores them, and reports a churn verdict.

pub mod features;
pub mod model;
pub mod predict;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub use features::{normalize, FeatureMatrix, Normalizer, RawRecord, RawValue};
pub use model::{ChurnArtifact, ModelSource, ScoreError, ScoringArtifact};
pub use predict::Predictor;

/// Outcome of a churn prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    LikelyToChurn,
    NotLikelyToChurn,
}

impl Verdict {
    /// Map a raw model label to a verdict. Only an exact `1` means churn.
    pub fn from_label(label: f32) -> Self {
        if label == 1.0 {
            Verdict::LikelyToChurn
        } else {
            Verdict::NotLikelyToChurn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::LikelyToChurn => "Likely to churn",
            Verdict::NotLikelyToChurn => "Not likely to churn",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum ChurnError {
    #[error("Failed to load model from {path}: {message}")]
    ModelLoad { path: String, message: String },

    #[error("Model prediction failed: {0}")]
    Prediction(#[source] ScoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChurnError {
    pub(crate) fn model_load(path: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        ChurnError::ModelLoad {
            path: path.into().display().to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChurnError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    #[serde(default)]
    pub features: FeatureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Artifact directory tried first
    pub path: String,
    /// Used only when `path` does not exist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_path: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            path: "model/churn".to_string(),
            fallback_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureConfig {
    #[serde(default)]
    pub encoding: EncodingMode,
}

/// How text values become category codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingMode {
    /// Codes derived from the values present in the call itself
    #[default]
    PerCall,
    /// Codes looked up in the vocabulary shipped with the model artifact
    Vocabulary,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChurnError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ChurnError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ChurnError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Model locations to try, in order
    pub fn model_source(&self) -> ModelSource {
        let source = ModelSource::new(&self.model.path);
        match &self.model.fallback_path {
            Some(fallback) => source.with_fallback(fallback),
            None => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_label() {
        assert_eq!(Verdict::from_label(1.0), Verdict::LikelyToChurn);
        assert_eq!(Verdict::from_label(0.0), Verdict::NotLikelyToChurn);
        assert_eq!(Verdict::from_label(2.0), Verdict::NotLikelyToChurn);
        assert_eq!(Verdict::from_label(f32::NAN), Verdict::NotLikelyToChurn);
    }

    #[test]
    fn test_verdict_strings() {
        assert_eq!(Verdict::LikelyToChurn.to_string(), "Likely to churn");
        assert_eq!(Verdict::NotLikelyToChurn.to_string(), "Not likely to churn");
    }

    #[test]
    fn test_config_parse() {
        let config: Config = toml::from_str(
            r#"
            [model]
            path = "/app/model"
            fallback_path = "model/churn"

            [features]
            encoding = "vocabulary"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.path, "/app/model");
        assert_eq!(config.model.fallback_path.as_deref(), Some("model/churn"));
        assert_eq!(config.features.encoding, EncodingMode::Vocabulary);

        let source = config.model_source();
        assert_eq!(source.candidates().len(), 2);
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str("[model]\npath = \"m\"\n").unwrap();
        assert_eq!(config.features.encoding, EncodingMode::PerCall);
        assert!(config.model.fallback_path.is_none());
        assert_eq!(config.model_source().candidates().len(), 1);
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.model.path, config.model.path);
    }

    #[test]
    fn test_model_load_error_message() {
        let err = ChurnError::model_load("/nope", "missing");
        assert!(err.to_string().contains("Failed to load model"));
        assert!(err.to_string().contains("/nope"));
    }
}
