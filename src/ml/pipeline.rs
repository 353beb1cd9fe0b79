//! Preprocessing and regression composed into one fit/predict unit.

use std::time::Instant;

use tracing::info;

use crate::data::{Dataset, Table};
use crate::domain::{FeatureRow, Schema};
use crate::error::{PredictorError, Result};
use crate::ml::gbdt::{BoosterParams, GradientBoostedRegressor};
use crate::ml::preprocess::Preprocessor;

/// Immutable fitted pipeline. Build once with [`PricePipeline::fit`], then
/// share it read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePipeline {
    preprocessor: Preprocessor,
    model: GradientBoostedRegressor,
    training_rows: usize,
}

impl PricePipeline {
    pub fn fit(dataset: &Dataset, params: &BoosterParams) -> Result<Self> {
        if dataset.is_empty() {
            return Err(PredictorError::Training(
                "cannot fit on an empty dataset".to_string(),
            ));
        }

        let started = Instant::now();
        let preprocessor = Preprocessor::fit(&dataset.table)?;
        let matrix = preprocessor.transform_table(&dataset.table)?;
        let model = GradientBoostedRegressor::fit(matrix, &dataset.target, params)?;

        info!(
            rows = dataset.len(),
            encoded_features = preprocessor.output_width(),
            trees = model.n_trees(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "price pipeline fitted"
        );

        Ok(Self {
            preprocessor,
            model,
            training_rows: dataset.len(),
        })
    }

    /// Price estimate for one row; never negative
    pub fn predict(&self, row: &FeatureRow) -> Result<f64> {
        let encoded = self.preprocessor.transform_row(row)?;
        let raw = self.model.predict(&encoded)?;
        if !raw.is_finite() {
            return Err(PredictorError::Internal(format!(
                "model produced a non-finite output: {raw}"
            )));
        }
        Ok(raw.max(0.0))
    }

    pub fn predict_table(&self, table: &Table) -> Result<Vec<f64>> {
        table.rows().map(|row| self.predict(&row)).collect()
    }

    pub fn schema(&self) -> &Schema {
        self.preprocessor.schema()
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn model(&self) -> &GradientBoostedRegressor {
        &self.model
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.preprocessor.feature_names()
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }
}
