//! Record-to-verdict inference

use crate::features::{CategoryEncoding, FeatureMatrix, Normalizer, RawRecord};
use crate::model::{ScoreError, ScoringArtifact};
use crate::{ChurnError, EncodingMode, Result, Verdict};

/// Predictor for churn verdicts
///
/// Owns the scoring artifact it was built with; calls never mutate it.
pub struct Predictor<A: ScoringArtifact> {
    artifact: A,
    normalizer: Normalizer,
}

impl<A: ScoringArtifact> Predictor<A> {
    /// Create a predictor with per-call category encoding
    pub fn new(artifact: A) -> Self {
        Self::with_normalizer(artifact, Normalizer::per_call())
    }

    pub fn with_normalizer(artifact: A, normalizer: Normalizer) -> Self {
        Predictor {
            artifact,
            normalizer,
        }
    }

    /// Create a predictor using the configured encoding mode.
    ///
    /// Vocabulary mode requires the artifact to carry a vocabulary.
    pub fn from_config(artifact: A, mode: EncodingMode) -> Result<Self> {
        let encoding = match mode {
            EncodingMode::PerCall => CategoryEncoding::PerCall,
            EncodingMode::Vocabulary => {
                let vocab = artifact.vocabulary().cloned().ok_or_else(|| {
                    ChurnError::Config(
                        "vocabulary encoding requested but the model artifact has no vocabulary"
                            .to_string(),
                    )
                })?;
                CategoryEncoding::Vocabulary(vocab)
            }
        };
        Ok(Self::with_normalizer(artifact, Normalizer::new(encoding)))
    }

    /// Normalize a record without scoring it
    pub fn normalize(&self, record: &RawRecord) -> FeatureMatrix {
        self.normalizer.normalize(record)
    }

    /// Predict the churn verdict for one customer record
    pub fn predict(&self, record: &RawRecord) -> Result<Verdict> {
        let matrix = self.normalizer.normalize(record);
        let label = self.first_label(&matrix).map_err(ChurnError::Prediction)?;

        let verdict = Verdict::from_label(label);
        log::debug!("Model label {} -> {}", label, verdict);
        Ok(verdict)
    }

    fn first_label(&self, matrix: &FeatureMatrix) -> std::result::Result<f32, ScoreError> {
        self.artifact
            .score(matrix)?
            .first()
            .copied()
            .ok_or(ScoreError::EmptyOutput)
    }

    pub fn artifact(&self) -> &A {
        &self.artifact
    }
}

/// Format a verdict for display
pub fn format_verdict(verdict: Verdict, json: bool) -> String {
    if json {
        serde_json::json!({ "prediction": verdict.as_str() }).to_string()
    } else {
        verdict.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CategoryVocabulary, SCHEMA_LEN};
    use std::cell::RefCell;
    use std::error::Error;

    /// Returns fixed labels and remembers the matrices it saw
    struct StubArtifact {
        labels: Vec<f32>,
        seen: RefCell<Vec<FeatureMatrix>>,
        vocabulary: Option<CategoryVocabulary>,
    }

    impl StubArtifact {
        fn returning(labels: Vec<f32>) -> Self {
            StubArtifact {
                labels,
                seen: RefCell::new(Vec::new()),
                vocabulary: None,
            }
        }
    }

    impl ScoringArtifact for StubArtifact {
        fn score(&self, matrix: &FeatureMatrix) -> std::result::Result<Vec<f32>, ScoreError> {
            self.seen.borrow_mut().push(matrix.clone());
            Ok(self.labels.clone())
        }

        fn vocabulary(&self) -> Option<&CategoryVocabulary> {
            self.vocabulary.as_ref()
        }
    }

    struct FailingArtifact;

    impl ScoringArtifact for FailingArtifact {
        fn score(&self, _matrix: &FeatureMatrix) -> std::result::Result<Vec<f32>, ScoreError> {
            Err(ScoreError::Backend("tensor shape rejected".to_string()))
        }
    }

    fn scenario_record() -> RawRecord {
        RawRecord::new()
            .with("gender", "Female")
            .with("SeniorCitizen", 0i64)
            .with("tenure", 5i64)
            .with("MonthlyCharges", 70.35)
            .with("TotalCharges", "350.5")
    }

    #[test]
    fn test_label_one_is_churn() {
        let predictor = Predictor::new(StubArtifact::returning(vec![1.0]));
        assert_eq!(
            predictor.predict(&scenario_record()).unwrap(),
            Verdict::LikelyToChurn
        );
    }

    #[test]
    fn test_other_labels_not_churn() {
        for label in [0.0, 0.99, 2.0, -1.0] {
            let predictor = Predictor::new(StubArtifact::returning(vec![label]));
            assert_eq!(
                predictor.predict(&scenario_record()).unwrap(),
                Verdict::NotLikelyToChurn
            );
        }
    }

    #[test]
    fn test_only_first_label_used() {
        let predictor = Predictor::new(StubArtifact::returning(vec![0.0, 1.0]));
        assert_eq!(
            predictor.predict(&scenario_record()).unwrap(),
            Verdict::NotLikelyToChurn
        );
    }

    #[test]
    fn test_artifact_receives_normalized_row() {
        let predictor = Predictor::new(StubArtifact::returning(vec![0.0]));
        predictor.predict(&scenario_record()).unwrap();

        let seen = predictor.artifact().seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].shape(), [1, SCHEMA_LEN]);
        assert_eq!(seen[0].get(0, "tenure"), Some(5.0));
        assert_eq!(seen[0].get(0, "TotalCharges"), Some(0.0));
        assert_eq!(seen[0], predictor.normalize(&scenario_record()));
    }

    #[test]
    fn test_deterministic() {
        let predictor = Predictor::new(StubArtifact::returning(vec![1.0]));
        let first = predictor.predict(&scenario_record()).unwrap();
        let second = predictor.predict(&scenario_record()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scoring_failure_wrapped() {
        let predictor = Predictor::new(FailingArtifact);
        let err = predictor.predict(&scenario_record()).unwrap_err();

        assert!(matches!(err, ChurnError::Prediction(_)));
        assert!(err.to_string().contains("Model prediction failed"));
        assert!(err.to_string().contains("tensor shape rejected"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_empty_output_is_failure() {
        let predictor = Predictor::new(StubArtifact::returning(vec![]));
        let err = predictor.predict(&scenario_record()).unwrap_err();
        assert!(matches!(err, ChurnError::Prediction(ScoreError::EmptyOutput)));
    }

    #[test]
    fn test_from_config_vocabulary() {
        let mut stub = StubArtifact::returning(vec![0.0]);
        stub.vocabulary = Some(
            CategoryVocabulary::new()
                .with_field("Contract", ["Month-to-month", "One year", "Two year"]),
        );
        let predictor = Predictor::from_config(stub, EncodingMode::Vocabulary).unwrap();

        let matrix = predictor.normalize(&RawRecord::new().with("Contract", "One year"));
        assert_eq!(matrix.get(0, "Contract"), Some(1.0));
    }

    #[test]
    fn test_from_config_vocabulary_missing() {
        let stub = StubArtifact::returning(vec![0.0]);
        assert!(matches!(
            Predictor::from_config(stub, EncodingMode::Vocabulary),
            Err(ChurnError::Config(_))
        ));
    }

    #[test]
    fn test_with_burn_artifact() {
        use crate::model::churn_net::tests::TestBackend;
        use crate::model::{ArtifactMetadata, ChurnArtifact};

        let device = Default::default();
        let artifact = ChurnArtifact::<TestBackend>::init(&device, ArtifactMetadata::default());
        let predictor = Predictor::new(artifact);

        let first = predictor.predict(&scenario_record()).unwrap();
        let second = predictor.predict(&scenario_record()).unwrap();
        assert_eq!(first, second);
        assert!(matches!(
            first.as_str(),
            "Likely to churn" | "Not likely to churn"
        ));
    }

    #[test]
    fn test_format_verdict() {
        assert_eq!(format_verdict(Verdict::LikelyToChurn, false), "Likely to churn");
        assert_eq!(
            format_verdict(Verdict::NotLikelyToChurn, true),
            r#"{"prediction":"Not likely to churn"}"#
        );
    }
}
