//! One-shot commands that share the serving pipeline but print to stdout.

use tracing::info;

use crate::config::AppConfig;
use crate::data::{load_dataset, train_test_split};
use crate::domain::{RawListing, Schema};
use crate::error::{PredictorError, Result};
use crate::ml::{PricePipeline, RegressionMetrics};
use crate::services::{format_price, Estimate, PriceService};

/// Fit on the configured dataset and price one listing
pub fn run_predict(config: &AppConfig, listing: &RawListing, json: bool) -> Result<Estimate> {
    let service = PriceService::from_config(config)?;
    let estimate = service.estimate(listing)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        println!("\n  💰 Estimated Price: {}", estimate.formatted);
        if !estimate.imputed.is_empty() {
            println!("  Imputed: {}", estimate.imputed.join(", "));
        }
        println!();
    }
    Ok(estimate)
}

/// Print the drop-down values derived from the dataset
pub fn run_options(config: &AppConfig, column: Option<&str>) -> Result<()> {
    let dataset = load_dataset(&config.dataset.path, &Schema::housing())?;
    let options = dataset.table.category_options();

    if let Some(name) = column {
        if !options.contains_key(name) {
            return Err(PredictorError::Validation(format!(
                "{name} is not a categorical column (expected one of: {})",
                options.keys().cloned().collect::<Vec<_>>().join(", ")
            )));
        }
    }

    for (name, values) in &options {
        if column.is_some_and(|c| c != name) {
            continue;
        }
        println!("\n  {name} ({} values)", values.len());
        for value in values {
            println!("    {value}");
        }
    }
    println!();
    Ok(())
}

/// Hold out a seeded test fraction, fit on the rest and report metrics
pub fn run_evaluate(config: &AppConfig, test_fraction: f64, seed: u64) -> Result<RegressionMetrics> {
    let dataset = load_dataset(&config.dataset.path, &Schema::housing())?;
    let (train, test) = train_test_split(&dataset, test_fraction, seed)?;
    info!(train = train.len(), test = test.len(), seed, "evaluating on hold-out split");

    let pipeline = PricePipeline::fit(&train, &config.model)?;
    let predictions = pipeline.predict_table(&test.table)?;
    let metrics = RegressionMetrics::compute(&predictions, &test.target)?;

    let currency = &config.ui.currency;
    println!("\n  Hold-out evaluation ({} rows, seed {seed})", metrics.count);
    println!("    RMSE: {}", format_price(metrics.rmse, currency));
    println!("    MAE:  {}", format_price(metrics.mae, currency));
    println!("    R²:   {:.4}\n", metrics.r2);
    Ok(metrics)
}
