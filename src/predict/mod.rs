//! Prediction and inference
//!
//! Normalize raw records and turn model output into churn verdicts.

pub mod inference;

pub use inference::Predictor;
