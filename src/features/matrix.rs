//! Numeric feature table handed to the model

use super::schema::{column_index, EXPECTED_SCHEMA, SCHEMA_LEN};

/// Row-major feature table. Data length is always a whole number of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Build a schema-shaped matrix from full rows
    pub fn from_rows(rows: Vec<[f32; SCHEMA_LEN]>) -> Self {
        FeatureMatrix {
            data: rows.into_iter().flatten().collect(),
            n_cols: SCHEMA_LEN,
        }
    }

    /// Build from flat row-major data with an arbitrary column count.
    ///
    /// Returns `None` when `n_cols` is zero or `data` is not a whole number of rows.
    pub fn from_flat(data: Vec<f32>, n_cols: usize) -> Option<Self> {
        if n_cols == 0 || data.len() % n_cols != 0 {
            return None;
        }
        Some(FeatureMatrix { data, n_cols })
    }

    pub fn n_rows(&self) -> usize {
        self.data.len() / self.n_cols
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// [rows, cols]
    pub fn shape(&self) -> [usize; 2] {
        [self.n_rows(), self.n_cols]
    }

    /// Column names, when the matrix has the schema's width
    pub fn columns(&self) -> Option<&'static [&'static str]> {
        (self.n_cols == SCHEMA_LEN).then_some(&EXPECTED_SCHEMA[..])
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.n_cols)?;
        self.data.get(start..start + self.n_cols)
    }

    /// Value of a named column in a row
    pub fn get(&self, row: usize, column: &str) -> Option<f32> {
        self.columns()?;
        self.row(row)?.get(column_index(column)?).copied()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_and_lookup() {
        let mut row = [0.0f32; SCHEMA_LEN];
        row[4] = 12.0;
        let matrix = FeatureMatrix::from_rows(vec![row, [1.0; SCHEMA_LEN]]);

        assert_eq!(matrix.shape(), [2, SCHEMA_LEN]);
        assert_eq!(matrix.columns(), Some(&EXPECTED_SCHEMA[..]));
        assert_eq!(matrix.get(0, "tenure"), Some(12.0));
        assert_eq!(matrix.get(1, "gender"), Some(1.0));
        assert_eq!(matrix.get(2, "gender"), None);
        assert_eq!(matrix.get(0, "customerID"), None);
    }

    #[test]
    fn test_from_flat_width() {
        let matrix = FeatureMatrix::from_flat(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(matrix.shape(), [2, 2]);
        assert_eq!(matrix.row(1), Some(&[3.0, 4.0][..]));
        // Not schema-shaped, so no names and no named lookups
        assert_eq!(matrix.columns(), None);
        assert_eq!(matrix.get(0, "gender"), None);
    }

    #[test]
    fn test_from_flat_rejects_partial_rows() {
        assert!(FeatureMatrix::from_flat(vec![0.0; 20], SCHEMA_LEN).is_none());
        assert!(FeatureMatrix::from_flat(vec![0.0; 3], 0).is_none());
        assert!(FeatureMatrix::from_flat(vec![0.0; 2 * SCHEMA_LEN], SCHEMA_LEN).is_some());
    }

    #[test]
    fn test_from_flat_empty() {
        let matrix = FeatureMatrix::from_flat(Vec::new(), SCHEMA_LEN).unwrap();
        assert_eq!(matrix.shape(), [0, SCHEMA_LEN]);
        assert_eq!(matrix.row(0), None);
    }
}
