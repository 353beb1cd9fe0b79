pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod ml;
pub mod services;

pub use config::AppConfig;
pub use data::{load_dataset, Dataset, Table};
pub use domain::{FeatureRow, FeatureValue, RawListing, Schema};
pub use error::{PredictorError, Result};
pub use ml::{BoosterParams, PricePipeline};
pub use services::{Estimate, PriceService};
