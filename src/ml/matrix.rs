use crate::error::{PredictorError, Result};

/// Dense column-major matrix of encoded features
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_rows: usize,
    columns: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn from_columns(n_rows: usize, columns: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((idx, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_rows) {
            return Err(PredictorError::Validation(format!(
                "column {idx} has {} rows, expected {n_rows}",
                col.len()
            )));
        }
        Ok(Self { n_rows, columns })
    }

    /// Row-major input, e.g. from a handful of already-encoded vectors
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut columns = vec![Vec::with_capacity(rows.len()); width];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PredictorError::Validation(format!(
                    "row {r} has width {}, expected {width}",
                    row.len()
                )));
            }
            for (col, &v) in columns.iter_mut().zip(row) {
                col.push(v);
            }
        }
        Ok(Self {
            n_rows: rows.len(),
            columns,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    pub fn row(&self, idx: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[idx]).collect()
    }

    pub fn into_columns(self) -> Vec<Vec<f64>> {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_agree() {
        let m = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_features(), 2);
        assert_eq!(m.column(1), &[2.0, 4.0, 6.0]);
        assert_eq!(m.row(2), vec![5.0, 6.0]);
    }

    #[test]
    fn ragged_input_is_rejected() {
        assert!(FeatureMatrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
        assert!(FeatureMatrix::from_columns(1, vec![vec![1.0], vec![]]).is_err());
    }
}
