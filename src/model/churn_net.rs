//! Feed-forward churn classifier and its on-disk artifact
//!
//! Architecture: Input(19) → Hidden(..) → ReLU → ... → Linear(1) → logit
//!
//! An artifact directory holds `metadata.json` (feature layout, hidden widths,
//! decision threshold, optional category vocabulary) and `model.mpk` (weights).

use std::path::Path;

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::activation::{relu, sigmoid};
use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use serde::{Deserialize, Serialize};

use super::artifact::{ScoreError, ScoringArtifact};
use crate::features::schema::{matches_schema, EXPECTED_SCHEMA, SCHEMA_LEN};
use crate::features::{CategoryVocabulary, FeatureMatrix};
use crate::{ChurnError, Result};

pub const METADATA_FILE: &str = "metadata.json";
/// Burn appends the `.mpk` extension
pub const WEIGHTS_FILE: &str = "model";

/// Configuration for the classifier network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnNetConfig {
    /// Input dimension (schema columns)
    pub input_dim: usize,
    /// Hidden layer widths, e.g. [32, 16]
    pub hidden_dims: Vec<usize>,
}

impl Default for ChurnNetConfig {
    fn default() -> Self {
        ChurnNetConfig {
            input_dim: SCHEMA_LEN,
            hidden_dims: vec![32, 16],
        }
    }
}

/// Binary classifier over normalized customer features
#[derive(Module, Debug)]
pub struct ChurnNet<B: Backend> {
    hidden: Vec<Linear<B>>,
    head: Linear<B>,
}

impl<B: Backend> ChurnNet<B> {
    /// Create a freshly initialized network
    pub fn new(device: &B::Device, config: &ChurnNetConfig) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_dims.len());
        let mut in_dim = config.input_dim;
        for &out_dim in &config.hidden_dims {
            hidden.push(LinearConfig::new(in_dim, out_dim).init(device));
            in_dim = out_dim;
        }

        ChurnNet {
            hidden,
            head: LinearConfig::new(in_dim, 1).init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `x` - Features [batch, input_dim]
    ///
    /// # Returns
    /// Churn logits [batch, 1]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(x, |x, layer| relu(layer.forward(x)));
        self.head.forward(x)
    }
}

/// Description of an artifact, stored next to its weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Training column order
    pub feature_names: Vec<String>,
    pub network: ChurnNetConfig,
    /// Probability at or above which a row is labelled churn
    pub threshold: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<CategoryVocabulary>,
}

impl Default for ArtifactMetadata {
    fn default() -> Self {
        ArtifactMetadata {
            feature_names: EXPECTED_SCHEMA.iter().map(|s| s.to_string()).collect(),
            network: ChurnNetConfig::default(),
            threshold: 0.5,
            vocabulary: None,
        }
    }
}

impl ArtifactMetadata {
    fn validate(&self) -> std::result::Result<(), String> {
        if !matches_schema(&self.feature_names) {
            return Err(format!(
                "feature names do not match the expected {}-column schema",
                SCHEMA_LEN
            ));
        }
        if self.network.input_dim != SCHEMA_LEN {
            return Err(format!(
                "network input_dim is {}, expected {}",
                self.network.input_dim, SCHEMA_LEN
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!("threshold {} outside [0, 1]", self.threshold));
        }
        Ok(())
    }
}

/// A loaded classifier ready for scoring
#[derive(Debug)]
pub struct ChurnArtifact<B: Backend> {
    net: ChurnNet<B>,
    metadata: ArtifactMetadata,
    device: B::Device,
}

impl<B: Backend> ChurnArtifact<B> {
    pub fn new(net: ChurnNet<B>, metadata: ArtifactMetadata, device: B::Device) -> Self {
        ChurnArtifact {
            net,
            metadata,
            device,
        }
    }

    /// Randomly initialized artifact, useful only for wiring checks
    pub fn init(device: &B::Device, metadata: ArtifactMetadata) -> Self {
        let net = ChurnNet::new(device, &metadata.network);
        Self::new(net, metadata, device.clone())
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    /// Churn probability for each row
    pub fn probabilities(&self, matrix: &FeatureMatrix) -> std::result::Result<Vec<f32>, ScoreError> {
        let [rows, cols] = matrix.shape();
        if cols != self.metadata.network.input_dim {
            return Err(ScoreError::ShapeMismatch {
                expected: self.metadata.network.input_dim,
                actual: cols,
            });
        }
        if rows == 0 {
            return Ok(Vec::new());
        }

        let data = TensorData::new(matrix.as_slice().to_vec(), [rows, cols]);
        let input = Tensor::<B, 2>::from_data(data, &self.device);

        let probs = sigmoid(self.net.forward(input))
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| ScoreError::Backend(format!("{:?}", e)))?;

        if probs.iter().any(|p| !p.is_finite()) {
            return Err(ScoreError::NonFinite);
        }
        Ok(probs)
    }
}

impl<B: Backend> ChurnArtifact<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Load an artifact directory
    pub fn load(dir: &Path, device: &B::Device) -> Result<Self> {
        let metadata_path = dir.join(METADATA_FILE);
        let content = std::fs::read_to_string(&metadata_path).map_err(|e| {
            ChurnError::model_load(dir, format!("cannot read {}: {}", METADATA_FILE, e))
        })?;
        let metadata: ArtifactMetadata = serde_json::from_str(&content).map_err(|e| {
            ChurnError::model_load(dir, format!("invalid {}: {}", METADATA_FILE, e))
        })?;
        metadata
            .validate()
            .map_err(|e| ChurnError::model_load(dir, e))?;

        let weights_path = dir.join(WEIGHTS_FILE);
        if !weights_path.with_extension("mpk").exists() {
            return Err(ChurnError::model_load(
                dir,
                format!("missing weights file {}.mpk", WEIGHTS_FILE),
            ));
        }

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(weights_path, device)
            .map_err(|e| ChurnError::model_load(dir, e))?;
        check_record(&record, &metadata.network).map_err(|e| ChurnError::model_load(dir, e))?;

        let net = ChurnNet::new(device, &metadata.network).load_record(record);
        Ok(Self::new(net, metadata, device.clone()))
    }

    /// Write metadata and weights into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let metadata =
            serde_json::to_string_pretty(&self.metadata).map_err(std::io::Error::from)?;
        std::fs::write(dir.join(METADATA_FILE), metadata)?;

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.net.clone().into_record(), dir.join(WEIGHTS_FILE))
            .map_err(|e| ChurnError::Io(std::io::Error::other(e.to_string())))
    }
}

/// Compare recorded weight shapes with the declared architecture
fn check_record<B: Backend>(
    record: &ChurnNetRecord<B>,
    config: &ChurnNetConfig,
) -> std::result::Result<(), String> {
    if record.hidden.len() != config.hidden_dims.len() {
        return Err(format!(
            "weights have {} hidden layers, metadata declares {}",
            record.hidden.len(),
            config.hidden_dims.len()
        ));
    }

    // Linear weights are stored as [d_input, d_output]
    let mut in_dim = config.input_dim;
    for (i, (layer, &out_dim)) in record.hidden.iter().zip(&config.hidden_dims).enumerate() {
        let dims = layer.weight.val().dims();
        if dims != [in_dim, out_dim] {
            return Err(format!(
                "hidden layer {} weights are {:?}, metadata declares {:?}",
                i,
                dims,
                [in_dim, out_dim]
            ));
        }
        in_dim = out_dim;
    }

    let dims = record.head.weight.val().dims();
    if dims != [in_dim, 1] {
        return Err(format!(
            "output layer weights are {:?}, metadata declares {:?}",
            dims,
            [in_dim, 1]
        ));
    }
    Ok(())
}

impl<B: Backend> ScoringArtifact for ChurnArtifact<B> {
    fn score(&self, matrix: &FeatureMatrix) -> std::result::Result<Vec<f32>, ScoreError> {
        let threshold = self.metadata.threshold;
        Ok(self
            .probabilities(matrix)?
            .into_iter()
            .map(|p| if p >= threshold { 1.0 } else { 0.0 })
            .collect())
    }

    fn vocabulary(&self) -> Option<&CategoryVocabulary> {
        self.metadata.vocabulary.as_ref()
    }
}
