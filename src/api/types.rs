use serde::{Deserialize, Serialize};

use crate::domain::ColumnSpec;

// ============================================================================
// Schema Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub columns: Vec<ColumnSpec>,
    pub target: String,
    /// Encoded feature names in model input order
    pub encoded_features: Vec<String>,
}
