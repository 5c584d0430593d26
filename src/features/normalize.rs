//! Raw record to model-ready feature row
//!
//! Steps, in order:
//! 1. trim whitespace around field names
//! 2. replace the exact tokens `"Yes"` / `"No"` with 1 / 0 in every field
//! 3. encode remaining text as category codes (numeric-looking text is parsed
//!    only in vocabulary mode)
//! 4. fill anything missing with 0
//! 5. reindex to [`EXPECTED_SCHEMA`], dropping unknown fields

use std::collections::BTreeMap;

use super::encoding::{CategoryEncoding, CategoryVocabulary};
use super::matrix::FeatureMatrix;
use super::record::{RawRecord, RawValue};
use super::schema::{column_index, SCHEMA_LEN};

/// Intermediate value while a record moves through the steps
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Num(f64),
    Text(String),
    Missing,
}

/// Converts raw records into the feature row the model was trained on
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    encoding: CategoryEncoding,
}

impl Normalizer {
    pub fn new(encoding: CategoryEncoding) -> Self {
        Normalizer { encoding }
    }

    /// Per-call encoding: every text value in a single record encodes to 0
    pub fn per_call() -> Self {
        Self::new(CategoryEncoding::PerCall)
    }

    pub fn with_vocabulary(vocabulary: CategoryVocabulary) -> Self {
        Self::new(CategoryEncoding::Vocabulary(vocabulary))
    }

    pub fn encoding(&self) -> &CategoryEncoding {
        &self.encoding
    }

    /// Normalize one record into a single-row matrix
    pub fn normalize(&self, record: &RawRecord) -> FeatureMatrix {
        let fields = strip_field_names(record);

        let mut row = [0.0f32; SCHEMA_LEN];
        let mut dropped = 0usize;

        for (name, value) in fields {
            let cell = match pre_encode(value, self.encoding.parses_numeric_text()) {
                Cell::Text(text) => self.encode_text(&name, &text),
                other => other,
            };

            match column_index(&name) {
                Some(idx) => row[idx] = fill_missing(cell),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            log::debug!("Dropped {} field(s) outside the expected schema", dropped);
        }

        FeatureMatrix::from_rows(vec![row])
    }

    fn encode_text(&self, field: &str, text: &str) -> Cell {
        match self.encoding.encode(field, text) {
            Some(code) => Cell::Num(code as f64),
            None => Cell::Missing,
        }
    }
}

/// Normalize with per-call category encoding
pub fn normalize(record: &RawRecord) -> FeatureMatrix {
    Normalizer::per_call().normalize(record)
}

/// Trim field names. On a collision the already-clean name wins.
fn strip_field_names(record: &RawRecord) -> BTreeMap<String, &RawValue> {
    let mut fields = BTreeMap::new();
    for (name, value) in record.iter() {
        let trimmed = name.trim();
        if trimmed == name {
            fields.insert(trimmed.to_string(), value);
        } else {
            fields.entry(trimmed.to_string()).or_insert(value);
        }
    }
    fields
}

/// Yes/No replacement, plus optional numeric coercion, ahead of categorical
/// encoding
fn pre_encode(value: &RawValue, parse_numeric: bool) -> Cell {
    match value {
        RawValue::Text(s) if s == "Yes" => Cell::Num(1.0),
        RawValue::Text(s) if s == "No" => Cell::Num(0.0),
        RawValue::Text(s) if parse_numeric => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Num(n),
            _ => Cell::Text(s.clone()),
        },
        RawValue::Text(s) => Cell::Text(s.clone()),
        RawValue::Number(n) => Cell::Num(*n),
        RawValue::Bool(b) => Cell::Num(if *b { 1.0 } else { 0.0 }),
        RawValue::Null => Cell::Missing,
    }
}

fn fill_missing(cell: Cell) -> f32 {
    match cell {
        Cell::Num(n) if n.is_finite() => n as f32,
        _ => 0.0,
    }
}
