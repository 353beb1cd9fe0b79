//! Process-lifetime price service: the fitted pipeline plus the drop-down
//! options derived from the training table.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::data::{load_dataset, Dataset};
use crate::domain::{RawListing, Schema};
use crate::error::Result;
use crate::ml::{BoosterParams, PricePipeline};

/// Sorted distinct values per categorical column
pub type CategoryOptions = BTreeMap<String, Vec<String>>;

/// One priced listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub price: f64,
    pub formatted: String,
    pub currency: String,
    /// Columns routed to imputation because they were blank or unparseable
    pub imputed: Vec<String>,
}

pub struct PriceService {
    pipeline: PricePipeline,
    options: CategoryOptions,
    currency: String,
    started_at: DateTime<Utc>,
}

impl PriceService {
    /// Load the configured dataset and fit the pipeline once
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let dataset = load_dataset(&config.dataset.path, &Schema::housing())?;
        Self::from_dataset(&dataset, &config.model, &config.ui.currency)
    }

    pub fn from_dataset(dataset: &Dataset, params: &BoosterParams, currency: &str) -> Result<Self> {
        let pipeline = PricePipeline::fit(dataset, params)?;
        let options = dataset.table.category_options();
        for (column, values) in &options {
            debug!(column = %column, distinct = values.len(), "category options");
        }
        info!(
            rows = pipeline.training_rows(),
            features = pipeline.preprocessor().output_width(),
            "price service ready"
        );
        Ok(Self {
            pipeline,
            options,
            currency: currency.to_string(),
            started_at: Utc::now(),
        })
    }

    pub fn estimate(&self, listing: &RawListing) -> Result<Estimate> {
        let row = listing.to_feature_row(self.pipeline.schema());
        let imputed = row.missing_columns();
        let price = self.pipeline.predict(&row)?;
        debug!(price, imputed = imputed.len(), "estimated listing");
        Ok(Estimate {
            price,
            formatted: format_price(price, &self.currency),
            currency: self.currency.clone(),
            imputed,
        })
    }

    pub fn pipeline(&self) -> &PricePipeline {
        &self.pipeline
    }

    pub fn options(&self) -> &CategoryOptions {
        &self.options
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// `$1,234,568 AUD`: rounded to whole units with thousands separators
pub fn format_price(value: f64, currency: &str) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && rounded != "0" { "-" } else { "" };
    format!("{sign}${grouped} {currency}")
}
