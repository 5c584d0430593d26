//! Raw customer records as supplied by callers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ChurnError, Result};

/// A single raw field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Number(v as f64)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// Field name to value mapping for one customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a record from a JSON object
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ChurnError::Parse(format!("Invalid record JSON: {}", e)))?;
        if !value.is_object() {
            return Err(ChurnError::Parse(
                "Record must be a JSON object of field names to values".to_string(),
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| ChurnError::Parse(format!("Unsupported record value: {}", e)))
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
