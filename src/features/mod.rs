//! Feature extraction and encoding
//!
//! Converts raw customer records into model-ready feature rows.

pub mod encoding;
pub mod matrix;
pub mod normalize;
pub mod record;
pub mod schema;

pub use encoding::{CategoryEncoding, CategoryVocabulary};
pub use matrix::FeatureMatrix;
pub use normalize::{normalize, Normalizer};
pub use record::{RawRecord, RawValue};
pub use schema::{EXPECTED_SCHEMA, SCHEMA_LEN};
