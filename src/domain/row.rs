use serde::{Deserialize, Serialize};

use crate::domain::schema::{ColumnKind, Schema};
use crate::error::{PredictorError, Result};

/// A single cell of a feature row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
    Missing,
}

impl FeatureValue {
    /// Numeric cell from free text. Blank, unparseable and non-finite input is missing.
    pub fn parse_number(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => FeatureValue::Number(v),
            _ => FeatureValue::Missing,
        }
    }

    /// Categorical cell from free text. Blank input is missing.
    pub fn parse_category(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            FeatureValue::Missing
        } else {
            FeatureValue::Category(trimmed.to_string())
        }
    }

    /// Numeric cell from an already-typed value; NaN and infinities are missing.
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            FeatureValue::Number(value)
        } else {
            FeatureValue::Missing
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_category(&self) -> Option<&str> {
        match self {
            FeatureValue::Category(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether this value may appear in a column of the given kind
    pub fn fits(&self, kind: ColumnKind) -> bool {
        matches!(
            (self, kind),
            (FeatureValue::Missing, _)
                | (FeatureValue::Number(_), ColumnKind::Numeric)
                | (FeatureValue::Category(_), ColumnKind::Categorical)
        )
    }
}

/// Ordered column name → value mapping for one property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    cells: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// A row with every schema column set to missing
    pub fn all_missing(schema: &Schema) -> Self {
        Self {
            cells: schema
                .names()
                .map(|name| (name.to_string(), FeatureValue::Missing))
                .collect(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.cells.push((name.into(), value));
    }

    pub fn with(mut self, name: impl Into<String>, value: FeatureValue) -> Self {
        self.push(name, value);
        self
    }

    /// Replace the value of an existing column, keeping its position
    pub fn set(&mut self, name: &str, value: FeatureValue) -> bool {
        match self.cells.iter_mut().find(|(n, _)| n == name) {
            Some(cell) => {
                cell.1 = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.cells.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn value_at(&self, idx: usize) -> Option<&FeatureValue> {
        self.cells.get(idx).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.cells.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Names of columns whose value is missing
    pub fn missing_columns(&self) -> Vec<String> {
        self.cells
            .iter()
            .filter(|(_, v)| v.is_missing())
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Check names, order and kinds against a schema
    pub fn check_schema(&self, schema: &Schema) -> Result<()> {
        if self.cells.len() != schema.len() {
            return Err(PredictorError::SchemaMismatch(format!(
                "row has {} columns, schema expects {}",
                self.cells.len(),
                schema.len()
            )));
        }
        for (idx, ((name, value), spec)) in self.cells.iter().zip(schema.columns()).enumerate() {
            if *name != spec.name {
                return Err(PredictorError::SchemaMismatch(format!(
                    "column {idx}: expected '{}', got '{name}'",
                    spec.name
                )));
            }
            if !value.fits(spec.kind) {
                return Err(PredictorError::SchemaMismatch(format!(
                    "column '{name}' is {} but got {value:?}",
                    spec.kind
                )));
            }
        }
        Ok(())
    }
}
