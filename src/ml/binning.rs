//! Histogram binning of encoded features.
//!
//! Each feature is discretised into at most `max_bin` bins described by
//! ascending upper bounds; a value `v` falls in the first bin whose bound is
//! `>= v`, and the last bin is unbounded. Splitting "bin <= b" on training
//! data is therefore the same as splitting "v <= upper_bounds[b]" on raw
//! inference values.
//!
//! Features where one bin holds most rows (one-hot indicators) are stored
//! sparsely: only rows outside the dominant bin are recorded.

use crate::error::{PredictorError, Result};
use crate::ml::matrix::FeatureMatrix;

/// Share of rows in the dominant bin above which a feature is stored sparsely
const SPARSE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub enum BinStorage {
    Dense(Vec<u16>),
    Sparse {
        default_bin: u16,
        /// Ascending row indices whose bin differs from `default_bin`
        rows: Vec<u32>,
        bins: Vec<u16>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinnedFeature {
    upper_bounds: Vec<f64>,
    storage: BinStorage,
}

impl BinnedFeature {
    fn from_values(values: &[f64], max_bin: usize) -> Self {
        let upper_bounds = bin_bounds(values, max_bin);
        let n_bins = upper_bounds.len() + 1;
        let assigned: Vec<u16> = values
            .iter()
            .map(|&v| bin_index(&upper_bounds, v))
            .collect();

        let mut counts = vec![0usize; n_bins];
        for &b in &assigned {
            counts[b as usize] += 1;
        }
        let (default_bin, dominant) = counts
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(b, &c)| (b as u16, c))
            .unwrap_or((0, 0));

        let storage = if !values.is_empty()
            && (dominant as f64) / (values.len() as f64) > SPARSE_THRESHOLD
        {
            let mut rows = Vec::with_capacity(values.len() - dominant);
            let mut bins = Vec::with_capacity(values.len() - dominant);
            for (r, &b) in assigned.iter().enumerate() {
                if b != default_bin {
                    rows.push(r as u32);
                    bins.push(b);
                }
            }
            BinStorage::Sparse {
                default_bin,
                rows,
                bins,
            }
        } else {
            BinStorage::Dense(assigned)
        };

        Self {
            upper_bounds,
            storage,
        }
    }

    pub fn n_bins(&self) -> usize {
        self.upper_bounds.len() + 1
    }

    pub fn storage(&self) -> &BinStorage {
        &self.storage
    }

    /// Raw-value threshold equivalent to "bin <= b"
    pub fn threshold(&self, bin: usize) -> f64 {
        self.upper_bounds.get(bin).copied().unwrap_or(f64::INFINITY)
    }

    pub fn bin_of(&self, row: usize) -> u16 {
        match &self.storage {
            BinStorage::Dense(bins) => bins[row],
            BinStorage::Sparse {
                default_bin,
                rows,
                bins,
            } => match rows.binary_search(&(row as u32)) {
                Ok(pos) => bins[pos],
                Err(_) => *default_bin,
            },
        }
    }
}

/// Upper bounds for at most `max_bin` bins over the distinct values
fn bin_bounds(values: &[f64], max_bin: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut distinct: Vec<(f64, usize)> = Vec::new();
    for v in sorted {
        match distinct.last_mut() {
            Some((last, count)) if *last == v => *count += 1,
            _ => distinct.push((v, 1)),
        }
    }
    if distinct.len() <= 1 {
        return Vec::new();
    }

    let midpoint = |i: usize| (distinct[i].0 + distinct[i + 1].0) / 2.0;

    if distinct.len() <= max_bin {
        return (0..distinct.len() - 1).map(midpoint).collect();
    }

    // Equal-frequency bins, cut only between distinct values.
    let total: usize = distinct.iter().map(|(_, c)| c).sum();
    let per_bin = total as f64 / max_bin as f64;
    let mut bounds = Vec::with_capacity(max_bin - 1);
    let mut acc = 0usize;
    for i in 0..distinct.len() - 1 {
        acc += distinct[i].1;
        if acc as f64 >= per_bin * (bounds.len() + 1) as f64 {
            bounds.push(midpoint(i));
            if bounds.len() == max_bin - 1 {
                break;
            }
        }
    }
    bounds
}

fn bin_index(upper_bounds: &[f64], value: f64) -> u16 {
    upper_bounds.partition_point(|&u| u < value) as u16
}

/// All features of a training matrix, binned
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    n_rows: usize,
    features: Vec<BinnedFeature>,
}

impl BinnedMatrix {
    pub fn from_matrix(matrix: FeatureMatrix, max_bin: usize) -> Result<Self> {
        if !(2..=u16::MAX as usize).contains(&max_bin) {
            return Err(PredictorError::Validation(format!(
                "max_bin must be in 2..={}, got {max_bin}",
                u16::MAX
            )));
        }
        if matrix.n_rows() > u32::MAX as usize {
            return Err(PredictorError::Training(
                "training matrix exceeds u32 row indices".to_string(),
            ));
        }
        let n_rows = matrix.n_rows();
        let features = matrix
            .into_columns()
            .into_iter()
            .map(|col| BinnedFeature::from_values(&col, max_bin))
            .collect();
        Ok(Self { n_rows, features })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn feature(&self, idx: usize) -> &BinnedFeature {
        &self.features[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_distinct_values_get_midpoint_bounds() {
        let f = BinnedFeature::from_values(&[1.0, 3.0, 3.0, 5.0], 255);
        assert_eq!(f.n_bins(), 3);
        assert_eq!(f.threshold(0), 2.0);
        assert_eq!(f.threshold(1), 4.0);
        assert_eq!(f.threshold(2), f64::INFINITY);
        assert_eq!(f.bin_of(0), 0);
        assert_eq!(f.bin_of(2), 1);
        assert_eq!(f.bin_of(3), 2);
    }

    #[test]
    fn many_distinct_values_are_capped() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let f = BinnedFeature::from_values(&values, 16);
        assert!(f.n_bins() <= 16);
        assert!(f.n_bins() > 8);
        // bins are monotone in the value
        let mut prev = 0;
        for r in 0..values.len() {
            let b = f.bin_of(r);
            assert!(b >= prev);
            prev = b;
        }
    }

    #[test]
    fn indicator_columns_are_sparse_and_consistent() {
        let mut values = vec![0.0; 100];
        values[7] = 1.0;
        values[42] = 1.0;
        let f = BinnedFeature::from_values(&values, 255);
        match f.storage() {
            BinStorage::Sparse { default_bin, rows, .. } => {
                assert_eq!(*default_bin, 0);
                assert_eq!(rows, &vec![7, 42]);
            }
            other => panic!("expected sparse storage, got {other:?}"),
        }
        assert_eq!(f.bin_of(7), 1);
        assert_eq!(f.bin_of(8), 0);
        for (r, &v) in values.iter().enumerate() {
            assert_eq!(f.bin_of(r) == 0, v <= f.threshold(0));
        }
    }

    #[test]
    fn constant_column_has_one_bin() {
        let f = BinnedFeature::from_values(&[2.5; 10], 255);
        assert_eq!(f.n_bins(), 1);
        assert_eq!(f.bin_of(3), 0);
    }

    #[test]
    fn rejects_bad_max_bin() {
        let m = FeatureMatrix::from_rows(&[vec![1.0]]).unwrap();
        assert!(BinnedMatrix::from_matrix(m, 1).is_err());
    }
}
