//! Gradient-boosted regression trees (squared error).
//!
//! Boosting starts from the mean target and adds one leaf-wise tree per
//! round, each fit to the residuals of the ensemble so far. Row and feature
//! subsampling are off by default; when enabled they draw from a `StdRng`
//! seeded with `seed`, so a fit is a pure function of data and parameters.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PredictorError, Result};
use crate::ml::binning::BinnedMatrix;
use crate::ml::matrix::FeatureMatrix;
use crate::ml::tree::{RegressionTree, TreeGrower, TreeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub num_leaves: usize,
    /// None grows trees without a depth limit
    pub max_depth: Option<usize>,
    pub min_child_samples: usize,
    pub max_bin: usize,
    pub lambda_l2: f64,
    pub min_split_gain: f64,
    /// Fraction of rows drawn every `bagging_freq` rounds; 1.0 disables bagging
    pub bagging_fraction: f64,
    pub bagging_freq: usize,
    /// Fraction of features drawn per tree; 1.0 uses all of them
    pub feature_fraction: f64,
    pub seed: u64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            learning_rate: 0.05,
            num_leaves: 31,
            max_depth: None,
            min_child_samples: 20,
            max_bin: 255,
            lambda_l2: 0.0,
            min_split_gain: 0.0,
            bagging_fraction: 1.0,
            bagging_freq: 0,
            feature_fraction: 1.0,
            seed: 42,
        }
    }
}

impl BoosterParams {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.n_estimators == 0 {
            return Err("n_estimators must be > 0".to_string());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err("learning_rate must be finite and > 0".to_string());
        }
        if self.num_leaves < 2 {
            return Err("num_leaves must be >= 2".to_string());
        }
        if self.max_depth == Some(0) {
            return Err("max_depth must be > 0 when set".to_string());
        }
        if self.min_child_samples == 0 {
            return Err("min_child_samples must be > 0".to_string());
        }
        if self.max_bin < 2 || self.max_bin > u16::MAX as usize {
            return Err(format!("max_bin must be in 2..={}", u16::MAX));
        }
        if !(self.lambda_l2.is_finite() && self.lambda_l2 >= 0.0) {
            return Err("lambda_l2 must be finite and >= 0".to_string());
        }
        if !(self.min_split_gain.is_finite() && self.min_split_gain >= 0.0) {
            return Err("min_split_gain must be finite and >= 0".to_string());
        }
        if !(self.bagging_fraction > 0.0 && self.bagging_fraction <= 1.0) {
            return Err("bagging_fraction must be in (0, 1]".to_string());
        }
        if !(self.feature_fraction > 0.0 && self.feature_fraction <= 1.0) {
            return Err("feature_fraction must be in (0, 1]".to_string());
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            num_leaves: self.num_leaves,
            max_depth: self.max_depth,
            min_child_samples: self.min_child_samples,
            lambda_l2: self.lambda_l2,
            min_split_gain: self.min_split_gain,
            learning_rate: self.learning_rate,
        }
    }

    fn bagging_enabled(&self) -> bool {
        self.bagging_fraction < 1.0 && self.bagging_freq > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedRegressor {
    init_score: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedRegressor {
    pub fn fit(matrix: FeatureMatrix, target: &[f64], params: &BoosterParams) -> Result<Self> {
        params.validate().map_err(PredictorError::Validation)?;

        let n = matrix.n_rows();
        if n == 0 {
            return Err(PredictorError::Training("no training rows".to_string()));
        }
        if target.len() != n {
            return Err(PredictorError::Training(format!(
                "target length {} != row count {n}",
                target.len()
            )));
        }
        if target.iter().any(|v| !v.is_finite()) {
            return Err(PredictorError::Training(
                "target contains non-finite values".to_string(),
            ));
        }

        let started = Instant::now();
        let n_features = matrix.n_features();
        let data = BinnedMatrix::from_matrix(matrix, params.max_bin)?;
        let tree_params = params.tree_params();

        let init_score = target.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![init_score; n];
        let mut grad = vec![0.0; n];
        let mut rng = StdRng::seed_from_u64(params.seed);

        let all_rows: Vec<u32> = (0..n as u32).collect();
        let all_features: Vec<usize> = (0..n_features).collect();
        let mut bag = all_rows.clone();
        let mut trees = Vec::with_capacity(params.n_estimators);

        for round in 0..params.n_estimators {
            for ((g, p), y) in grad.iter_mut().zip(&predictions).zip(target) {
                *g = p - y;
            }

            if params.bagging_enabled() && round % params.bagging_freq == 0 {
                let k = ((n as f64) * params.bagging_fraction).ceil().max(1.0) as usize;
                let mut drawn: Vec<u32> = sample(&mut rng, n, k.min(n))
                    .into_iter()
                    .map(|i| i as u32)
                    .collect();
                drawn.sort_unstable();
                bag = drawn;
            }

            let features = if params.feature_fraction < 1.0 && n_features > 1 {
                let k = ((n_features as f64) * params.feature_fraction)
                    .ceil()
                    .max(1.0) as usize;
                let mut drawn = sample(&mut rng, n_features, k.min(n_features)).into_vec();
                drawn.sort_unstable();
                drawn
            } else {
                all_features.clone()
            };

            let tree = TreeGrower::new(&data, &grad, &tree_params, &features).grow(bag.clone());
            for (row, p) in predictions.iter_mut().enumerate() {
                *p += tree.predict_binned(&data, row);
            }
            trees.push(tree);

            if (round + 1) % 50 == 0 || round + 1 == params.n_estimators {
                debug!(
                    round = round + 1,
                    train_rmse = rmse(&predictions, target),
                    "boosting progress"
                );
            }
        }

        debug!(
            trees = trees.len(),
            features = n_features,
            rows = n,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "gradient boosting finished"
        );

        Ok(Self {
            init_score,
            n_features,
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw ensemble output for one encoded vector
    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.n_features {
            return Err(PredictorError::Validation(format!(
                "feature vector dim mismatch: got {}, expected {}",
                x.len(),
                self.n_features
            )));
        }
        Ok(self.init_score + self.trees.iter().map(|t| t.predict(x)).sum::<f64>())
    }
}

fn rmse(predictions: &[f64], target: &[f64]) -> f64 {
    let n = target.len().max(1) as f64;
    let sse: f64 = predictions
        .iter()
        .zip(target)
        .map(|(p, y)| (p - y).powi(2))
        .sum();
    (sse / n).sqrt()
}
