//! Trained churn classifier
//!
//! - `artifact`: the scoring contract the predictor depends on
//! - `churn_net`: the burn network and its on-disk artifact format
//! - `loader`: resolving the artifact location and loading it once

pub mod artifact;
pub mod churn_net;
pub mod loader;

pub use artifact::{ScoreError, ScoringArtifact};
pub use churn_net::{ArtifactMetadata, ChurnArtifact, ChurnNet, ChurnNetConfig};
pub use loader::{acquire, ModelSource};
