use serde::{Deserialize, Serialize};

use crate::error::{PredictorError, Result};

/// Target column present only in the training table
pub const TARGET_COLUMN: &str = "price";

pub const NUMERIC_COLUMNS: [&str; 7] = [
    "rooms",
    "bathroom",
    "car",
    "landsize",
    "buildingarea",
    "yearbuilt",
    "building_age",
];

pub const CATEGORICAL_COLUMNS: [&str; 4] = ["suburb", "type", "councilarea", "regionname"];

/// How a column is preprocessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Median imputation, then standard scaling
    Numeric,
    /// Most-frequent imputation, then one-hot encoding
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn numeric(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Numeric,
        }
    }

    pub fn categorical(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Categorical,
        }
    }
}

/// Ordered feature schema shared by training tables and inference rows.
///
/// Numeric columns come first, categorical columns after, mirroring the
/// order in which the preprocessor lays out its output blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self> {
        if columns.is_empty() {
            return Err(PredictorError::Validation(
                "schema must contain at least one column".to_string(),
            ));
        }
        for (idx, col) in columns.iter().enumerate() {
            if col.name.trim().is_empty() {
                return Err(PredictorError::Validation(format!(
                    "schema column {idx} has an empty name"
                )));
            }
            if col.name == TARGET_COLUMN {
                return Err(PredictorError::Validation(format!(
                    "target column '{TARGET_COLUMN}' cannot be a feature"
                )));
            }
            if columns[..idx].iter().any(|c| c.name == col.name) {
                return Err(PredictorError::Validation(format!(
                    "duplicate schema column '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns })
    }

    /// The fixed 11-column housing schema
    pub fn housing() -> Self {
        let columns = NUMERIC_COLUMNS
            .iter()
            .map(|name| ColumnSpec::numeric(name))
            .chain(
                CATEGORICAL_COLUMNS
                    .iter()
                    .map(|name| ColumnSpec::categorical(name)),
            )
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Categorical)
    }
}
