//! Scoring contract between the predictor and a trained model

use thiserror::Error;

use crate::features::{CategoryVocabulary, FeatureMatrix};

/// Failure raised while scoring a feature matrix
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("expected {expected} feature columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("model produced non-finite output")]
    NonFinite,

    #[error("model returned no predictions")]
    EmptyOutput,

    #[error("{0}")]
    Backend(String),
}

/// A trained classifier that maps feature rows to labels
pub trait ScoringArtifact {
    /// One label per input row (`1.0` for the positive class)
    fn score(&self, matrix: &FeatureMatrix) -> Result<Vec<f32>, ScoreError>;

    /// Category vocabulary persisted with the artifact, if any
    fn vocabulary(&self) -> Option<&CategoryVocabulary> {
        None
    }
}
