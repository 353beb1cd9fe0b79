//! House price CLI
//!
//! Commands:
//! - `house-price serve` - Fit the pipeline and serve the form (default)
//! - `house-price predict` - Price one listing from flags
//! - `house-price options` - Show drop-down values from the dataset
//! - `house-price evaluate` - Hold-out RMSE/MAE/R² report

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::RawListing;

pub use commands::{run_evaluate, run_options, run_predict};

/// Melbourne housing price predictor
#[derive(Parser, Debug)]
#[command(name = "house-price")]
#[command(author, version, about = "Melbourne housing price predictor")]
pub struct Cli {
    /// Directory holding default.toml and environment overrides
    #[arg(long, global = true, default_value = "config", env = "HOUSE_PRICE_CONFIG_DIR")]
    pub config_dir: PathBuf,

    /// Debug-level logging regardless of configuration
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit on the dataset and serve the form and JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// Training CSV (overrides dataset.path)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Fit on the dataset and price a single listing
    Predict {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[command(flatten)]
        listing: ListingArgs,
        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the categorical values offered by the form
    Options {
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Only this column
        #[arg(short, long)]
        column: Option<String>,
    },

    /// Seeded train/test split and regression metrics
    Evaluate {
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long, default_value = "0.2")]
        test_fraction: f64,
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

/// Listing fields as free text; anything omitted is imputed
#[derive(Args, Debug, Clone, Default)]
pub struct ListingArgs {
    #[arg(long)]
    pub rooms: Option<String>,
    #[arg(long)]
    pub bathroom: Option<String>,
    #[arg(long)]
    pub car: Option<String>,
    #[arg(long)]
    pub landsize: Option<String>,
    #[arg(long)]
    pub buildingarea: Option<String>,
    #[arg(long)]
    pub yearbuilt: Option<String>,
    #[arg(long)]
    pub building_age: Option<String>,
    #[arg(long)]
    pub suburb: Option<String>,
    /// Property type code (h, u, t)
    #[arg(long = "type")]
    pub property_type: Option<String>,
    #[arg(long)]
    pub councilarea: Option<String>,
    #[arg(long)]
    pub regionname: Option<String>,
}

impl From<ListingArgs> for RawListing {
    fn from(args: ListingArgs) -> Self {
        RawListing {
            rooms: args.rooms,
            bathroom: args.bathroom,
            car: args.car,
            landsize: args.landsize,
            buildingarea: args.buildingarea,
            yearbuilt: args.yearbuilt,
            building_age: args.building_age,
            suburb: args.suburb,
            property_type: args.property_type,
            councilarea: args.councilarea,
            regionname: args.regionname,
        }
    }
}
