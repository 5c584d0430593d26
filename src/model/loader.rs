//! Locating and loading the model artifact once at startup

use std::path::{Path, PathBuf};

use burn::tensor::backend::Backend;

use super::churn_net::ChurnArtifact;
use crate::{ChurnError, Result};

/// Where to look for the artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    primary: PathBuf,
    fallback: Option<PathBuf>,
}

impl ModelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ModelSource {
            primary: path.into(),
            fallback: None,
        }
    }

    /// Location used only when the primary path does not exist
    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback = Some(path.into());
        self
    }

    pub fn candidates(&self) -> Vec<&Path> {
        std::iter::once(self.primary.as_path())
            .chain(self.fallback.as_deref())
            .collect()
    }

    /// First candidate that exists on disk
    pub fn resolve(&self) -> Option<&Path> {
        self.candidates().into_iter().find(|p| p.exists())
    }
}

/// Load the artifact from the first existing candidate.
///
/// A candidate that exists but fails to load is an error; later candidates are
/// not tried.
pub fn acquire<B: Backend>(source: &ModelSource, device: &B::Device) -> Result<ChurnArtifact<B>>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    let path = source.resolve().ok_or_else(|| {
        let tried: Vec<String> = source
            .candidates()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        ChurnError::ModelLoad {
            path: tried.join(", "),
            message: "no model artifact found".to_string(),
        }
    })?;

    if path != source.primary {
        log::warn!(
            "Model path {} not found, falling back to {}",
            source.primary.display(),
            path.display()
        );
    }
    log::info!("Using model path: {}", path.display());

    let artifact = ChurnArtifact::load(path, device)?;
    log::info!("Model loaded successfully from: {}", path.display());
    Ok(artifact)
}
