//! Health reporting for the price service.
//!
//! Backs the liveness/readiness probes and the JSON `/health` endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::predictor::PriceService;

/// Health status for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Component health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall service health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: i64,
    pub training_rows: usize,
    pub trees: usize,
    pub encoded_features: usize,
    pub components: Vec<ComponentHealth>,
}

pub fn health_report(service: &PriceService) -> HealthResponse {
    let pipeline = service.pipeline();
    let mut components = Vec::new();
    let mut overall = HealthStatus::Healthy;

    // Model health
    let trees = pipeline.model().n_trees();
    let model_status = if trees > 0 {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };
    if model_status != HealthStatus::Healthy {
        overall = model_status;
    }
    components.push(ComponentHealth {
        name: "model".to_string(),
        status: model_status,
        message: if trees == 0 {
            Some("No trees fitted".to_string())
        } else {
            None
        },
    });

    // Drop-down options: an empty list still lets users submit, so only degrade.
    let empty: Vec<&str> = service
        .options()
        .iter()
        .filter(|(_, values)| values.is_empty())
        .map(|(column, _)| column.as_str())
        .collect();
    let options_status = if empty.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };
    if options_status == HealthStatus::Degraded && overall == HealthStatus::Healthy {
        overall = HealthStatus::Degraded;
    }
    components.push(ComponentHealth {
        name: "form_options".to_string(),
        status: options_status,
        message: if empty.is_empty() {
            None
        } else {
            Some(format!("No values for: {}", empty.join(", ")))
        },
    });

    HealthResponse {
        status: overall,
        timestamp: Utc::now(),
        uptime_seconds: service.uptime_seconds(),
        training_rows: pipeline.training_rows(),
        trees,
        encoded_features: pipeline.preprocessor().output_width(),
        components,
    }
}
