//! Price model: preprocessing, histogram gradient boosting and the composed
//! pipeline.
//!
//! Pure CPU, deterministic, no external model runtime.

pub mod binning;
pub mod gbdt;
pub mod matrix;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod tree;

pub use gbdt::{BoosterParams, GradientBoostedRegressor};
pub use matrix::FeatureMatrix;
pub use metrics::RegressionMetrics;
pub use pipeline::PricePipeline;
pub use preprocess::{CategoricalTransform, NumericTransform, Preprocessor};
pub use tree::RegressionTree;
