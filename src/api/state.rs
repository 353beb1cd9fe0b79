use std::sync::Arc;

use crate::config::UiConfig;
use crate::services::PriceService;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Fitted pipeline and form options, read-only after startup
    pub service: Arc<PriceService>,

    /// Page title and currency label
    pub ui: Arc<UiConfig>,
}

impl AppState {
    pub fn new(service: PriceService, ui: UiConfig) -> Self {
        Self {
            service: Arc::new(service),
            ui: Arc::new(ui),
        }
    }
}
