pub mod health;
pub mod predictor;

pub use health::{health_report, ComponentHealth, HealthResponse, HealthStatus};
pub use predictor::{format_price, CategoryOptions, Estimate, PriceService};
