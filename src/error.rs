use thiserror::Error;

/// Main error type for the price predictor
#[derive(Error, Debug)]
pub enum PredictorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Dataset errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Missing column in dataset: {0}")]
    MissingColumn(String),

    // Inference errors
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    // Model fitting errors
    #[error("Training failed: {0}")]
    Training(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PredictorError {
    /// True for errors caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictorError::SchemaMismatch(_) | PredictorError::Validation(_)
        )
    }
}

/// Result type alias for PredictorError
pub type Result<T> = std::result::Result<T, PredictorError>;
