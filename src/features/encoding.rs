//! Category codes for text-valued fields
//!
//! Two strategies are supported:
//! - per-call: codes are derived from the distinct values present in the call.
//!   A single record has one category per column, so every text value encodes to
//!   `0` and codes are not comparable across calls. Numeric-looking text is still
//!   text in this mode.
//! - vocabulary: codes come from a per-field table persisted with the model
//!   artifact, so the same value always gets the same code. Numeric-looking text
//!   is parsed as a number first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trained text-to-code table, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryVocabulary {
    fields: BTreeMap<String, BTreeMap<String, i64>>,
}

impl CategoryVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the categories of a field; codes follow the given order
    pub fn with_field<I, S>(mut self, field: &str, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes = categories
            .into_iter()
            .enumerate()
            .map(|(i, c)| (c.into(), i as i64))
            .collect();
        self.fields.insert(field.to_string(), codes);
        self
    }

    pub fn code(&self, field: &str, value: &str) -> Option<i64> {
        self.fields.get(field)?.get(value).copied()
    }
}

/// Strategy used to turn text into codes
#[derive(Debug, Clone, Default)]
pub enum CategoryEncoding {
    #[default]
    PerCall,
    Vocabulary(CategoryVocabulary),
}

impl CategoryEncoding {
    /// Code for one text value of a single-row column. `None` marks a value with
    /// no code.
    pub fn encode(&self, field: &str, value: &str) -> Option<i64> {
        match self {
            // The value is the column's only category
            CategoryEncoding::PerCall => Some(0),
            CategoryEncoding::Vocabulary(vocab) => vocab.code(field, value),
        }
    }

    /// Whether numeric-looking text is parsed before encoding
    pub fn parses_numeric_text(&self) -> bool {
        matches!(self, CategoryEncoding::Vocabulary(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_call_single_value_is_zero() {
        let encoding = CategoryEncoding::PerCall;
        assert_eq!(encoding.encode("InternetService", "Fiber optic"), Some(0));
        assert_eq!(encoding.encode("Contract", "Two year"), Some(0));
        assert_eq!(encoding.encode("TotalCharges", "350.5"), Some(0));
        assert!(!encoding.parses_numeric_text());
    }

    #[test]
    fn test_vocabulary_lookup() {
        let vocab = CategoryVocabulary::new()
            .with_field("Contract", ["Month-to-month", "One year", "Two year"]);

        assert_eq!(vocab.code("Contract", "Two year"), Some(2));
        assert_eq!(vocab.code("Contract", "Ten year"), None);
        assert_eq!(vocab.code("gender", "Female"), None);
    }

    #[test]
    fn test_vocabulary_encoding_marks_unseen() {
        let vocab = CategoryVocabulary::new().with_field("gender", ["Female", "Male"]);
        let encoding = CategoryEncoding::Vocabulary(vocab);

        assert_eq!(encoding.encode("gender", "Male"), Some(1));
        assert_eq!(encoding.encode("gender", "Other"), None);
        assert!(encoding.parses_numeric_text());
    }

    #[test]
    fn test_vocabulary_json_shape() {
        let vocab: CategoryVocabulary =
            serde_json::from_str(r#"{"gender": {"Female": 0, "Male": 1}}"#).unwrap();
        assert_eq!(vocab.code("gender", "Male"), Some(1));
    }
}
