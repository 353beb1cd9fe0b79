//! Column-wise preprocessing: imputation, scaling and one-hot encoding.
//!
//! Every statistic is learned once in [`Preprocessor::fit`] and reused
//! verbatim for each inference row. Output layout is the numeric block (one
//! slot per numeric column, schema order) followed by one indicator block per
//! categorical column (sorted training categories).

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::data::{Column, Table};
use crate::domain::{FeatureRow, FeatureValue, Schema};
use crate::error::{PredictorError, Result};
use crate::ml::matrix::FeatureMatrix;

/// Median imputation followed by zero-mean / unit-variance scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericTransform {
    pub column: String,
    /// Position of the column in the fitted schema
    pub source: usize,
    pub median: f64,
    pub mean: f64,
    /// Population standard deviation, or 1.0 for constant columns
    pub scale: f64,
}

impl NumericTransform {
    fn fit(column: &str, source: usize, values: &[Option<f64>]) -> Self {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        present.sort_by(f64::total_cmp);
        let median = median_of_sorted(&present).unwrap_or(0.0);

        let n = values.len().max(1) as f64;
        let imputed = values.iter().map(|v| v.unwrap_or(median));
        let mean = imputed.clone().sum::<f64>() / n;
        let var = imputed.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        let scale = if std.is_finite() && std > f64::EPSILON * mean.abs().max(1.0) {
            std
        } else {
            1.0
        };

        Self {
            column: column.to_string(),
            source,
            median,
            mean,
            scale,
        }
    }

    pub fn apply(&self, value: Option<f64>) -> f64 {
        let v = value.filter(|x| x.is_finite()).unwrap_or(self.median);
        (v - self.mean) / self.scale
    }
}

fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Most-frequent imputation followed by one-hot encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalTransform {
    pub column: String,
    pub source: usize,
    /// None only when the training column had no values at all
    pub most_frequent: Option<String>,
    /// Sorted distinct training categories, one output slot each
    pub categories: Vec<String>,
    /// First output slot of this block in the encoded vector
    pub offset: usize,
}

impl CategoricalTransform {
    fn fit(column: &str, source: usize, offset: usize, values: &[Option<String>]) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values.iter().flatten() {
            *counts.entry(v.as_str()).or_default() += 1;
        }

        // BTreeMap iterates in ascending order, so ties keep the smallest value.
        let mut most_frequent: Option<(&str, usize)> = None;
        for (&value, &count) in &counts {
            if most_frequent.map_or(true, |(_, best)| count > best) {
                most_frequent = Some((value, count));
            }
        }

        Self {
            column: column.to_string(),
            source,
            most_frequent: most_frequent.map(|(v, _)| v.to_string()),
            categories: counts.keys().map(|k| k.to_string()).collect(),
            offset,
        }
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    pub fn block(&self) -> Range<usize> {
        self.offset..self.offset + self.width()
    }

    /// Slot index within the block, after imputation; None for unknown categories
    pub fn slot(&self, value: Option<&str>) -> Option<usize> {
        let value = value.or(self.most_frequent.as_deref())?;
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }
}

/// Fitted column transformer for one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    schema: Schema,
    numeric: Vec<NumericTransform>,
    categorical: Vec<CategoricalTransform>,
    width: usize,
}

impl Preprocessor {
    pub fn fit(table: &Table) -> Result<Self> {
        if table.is_empty() {
            return Err(PredictorError::Training(
                "cannot fit preprocessing on an empty table".to_string(),
            ));
        }

        let schema = table.schema().clone();
        let mut numeric = Vec::new();
        let mut categorical_sources = Vec::new();

        for (source, (spec, column)) in schema.columns().iter().zip(table.columns()).enumerate() {
            match column {
                Column::Numeric(values) => {
                    numeric.push(NumericTransform::fit(&spec.name, source, values))
                }
                Column::Categorical(values) => categorical_sources.push((source, values)),
            }
        }

        let mut offset = numeric.len();
        let mut categorical = Vec::with_capacity(categorical_sources.len());
        for (source, values) in categorical_sources {
            let name = &schema.columns()[source].name;
            let transform = CategoricalTransform::fit(name, source, offset, values);
            offset += transform.width();
            categorical.push(transform);
        }

        Ok(Self {
            schema,
            numeric,
            categorical,
            width: offset,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Width of every encoded vector
    pub fn output_width(&self) -> usize {
        self.width
    }

    pub fn numeric_transforms(&self) -> &[NumericTransform] {
        &self.numeric
    }

    pub fn categorical_transforms(&self) -> &[CategoricalTransform] {
        &self.categorical
    }

    /// Output slots occupied by a categorical column's one-hot block
    pub fn categorical_block(&self, column: &str) -> Option<Range<usize>> {
        self.categorical
            .iter()
            .find(|t| t.column == column)
            .map(|t| t.block())
    }

    /// Encoded feature names, `num__<col>` and `cat__<col>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .numeric
            .iter()
            .map(|t| format!("num__{}", t.column))
            .collect();
        for t in &self.categorical {
            names.extend(t.categories.iter().map(|c| format!("cat__{}_{}", t.column, c)));
        }
        names
    }

    /// Encode one inference row. The row must match the fitted schema.
    pub fn transform_row(&self, row: &FeatureRow) -> Result<Vec<f64>> {
        row.check_schema(&self.schema)?;

        let mut out = vec![0.0; self.width];
        for (slot, t) in self.numeric.iter().enumerate() {
            let value = row.value_at(t.source).and_then(FeatureValue::as_number);
            out[slot] = t.apply(value);
        }
        for t in &self.categorical {
            let value = row.value_at(t.source).and_then(FeatureValue::as_category);
            if let Some(k) = t.slot(value) {
                out[t.offset + k] = 1.0;
            }
        }
        Ok(out)
    }

    /// Encode a whole table column by column
    pub fn transform_table(&self, table: &Table) -> Result<FeatureMatrix> {
        if table.schema() != &self.schema {
            return Err(PredictorError::SchemaMismatch(
                "table schema differs from the fitted schema".to_string(),
            ));
        }

        let n = table.n_rows();
        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(self.width);

        for t in &self.numeric {
            let Column::Numeric(values) = &table.columns()[t.source] else {
                return Err(PredictorError::Internal(format!(
                    "column '{}' is not numeric",
                    t.column
                )));
            };
            columns.push(values.iter().map(|v| t.apply(*v)).collect());
        }

        for t in &self.categorical {
            let Column::Categorical(values) = &table.columns()[t.source] else {
                return Err(PredictorError::Internal(format!(
                    "column '{}' is not categorical",
                    t.column
                )));
            };
            let mut block = vec![vec![0.0; n]; t.width()];
            for (row, value) in values.iter().enumerate() {
                if let Some(k) = t.slot(value.as_deref()) {
                    block[k][row] = 1.0;
                }
            }
            columns.extend(block);
        }

        FeatureMatrix::from_columns(n, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnSpec;

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnSpec::numeric("landsize"),
            ColumnSpec::categorical("type"),
        ])
        .unwrap()
    }

    fn row(landsize: FeatureValue, kind: FeatureValue) -> FeatureRow {
        FeatureRow::new().with("landsize", landsize).with("type", kind)
    }

    fn table() -> Table {
        let rows = vec![
            row(FeatureValue::Number(100.0), FeatureValue::parse_category("h")),
            row(FeatureValue::Number(300.0), FeatureValue::parse_category("u")),
            row(FeatureValue::Missing, FeatureValue::parse_category("u")),
            row(FeatureValue::Number(200.0), FeatureValue::Missing),
            row(FeatureValue::Number(900.0), FeatureValue::parse_category("t")),
        ];
        Table::from_rows(schema(), &rows).unwrap()
    }

    #[test]
    fn learns_median_mode_and_categories() {
        let pre = Preprocessor::fit(&table()).unwrap();
        let num = &pre.numeric_transforms()[0];
        // present values 100, 200, 300, 900 -> median 250
        assert_eq!(num.median, 250.0);
        // imputed column 100, 300, 250, 200, 900 -> mean 350
        assert!((num.mean - 350.0).abs() < 1e-9);

        let cat = &pre.categorical_transforms()[0];
        assert_eq!(cat.most_frequent.as_deref(), Some("u"));
        assert_eq!(cat.categories, vec!["h", "t", "u"]);
        assert_eq!(pre.output_width(), 4);
        assert_eq!(
            pre.feature_names(),
            vec!["num__landsize", "cat__type_h", "cat__type_t", "cat__type_u"]
        );
        assert_eq!(pre.categorical_block("type"), Some(1..4));
    }

    #[test]
    fn missing_values_are_imputed_and_unknowns_zeroed() {
        let pre = Preprocessor::fit(&table()).unwrap();

        let imputed = pre
            .transform_row(&row(FeatureValue::Missing, FeatureValue::Missing))
            .unwrap();
        let num = &pre.numeric_transforms()[0];
        assert!((imputed[0] - (250.0 - num.mean) / num.scale).abs() < 1e-12);
        assert_eq!(&imputed[1..], &[0.0, 0.0, 1.0]);

        let unknown = pre
            .transform_row(&row(
                FeatureValue::Number(250.0),
                FeatureValue::parse_category("villa"),
            ))
            .unwrap();
        assert_eq!(&unknown[1..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn table_and_row_transforms_agree() {
        let t = table();
        let pre = Preprocessor::fit(&t).unwrap();
        let matrix = pre.transform_table(&t).unwrap();
        for (i, r) in t.rows().enumerate() {
            assert_eq!(matrix.row(i), pre.transform_row(&r).unwrap());
        }
    }

    #[test]
    fn constant_column_scales_by_one() {
        let rows = vec![
            row(FeatureValue::Number(5.0), FeatureValue::parse_category("h")),
            row(FeatureValue::Number(5.0), FeatureValue::parse_category("h")),
        ];
        let pre = Preprocessor::fit(&Table::from_rows(schema(), &rows).unwrap()).unwrap();
        assert_eq!(pre.numeric_transforms()[0].scale, 1.0);
        let out = pre
            .transform_row(&row(FeatureValue::Number(5.0), FeatureValue::Missing))
            .unwrap();
        assert_eq!(out, vec![0.0, 1.0]);
    }

    #[test]
    fn all_missing_columns_degrade_to_zero_and_empty_block() {
        let schema = Schema::new(vec![
            ColumnSpec::numeric("rooms"),
            ColumnSpec::numeric("yearbuilt"),
            ColumnSpec::categorical("councilarea"),
            ColumnSpec::categorical("type"),
        ])
        .unwrap();
        let rows: Vec<FeatureRow> = [(2.0, "h"), (4.0, "u"), (3.0, "h")]
            .iter()
            .map(|(rooms, kind)| {
                FeatureRow::new()
                    .with("rooms", FeatureValue::Number(*rooms))
                    .with("yearbuilt", FeatureValue::Missing)
                    .with("councilarea", FeatureValue::Missing)
                    .with("type", FeatureValue::parse_category(kind))
            })
            .collect();
        let pre = Preprocessor::fit(&Table::from_rows(schema, &rows).unwrap()).unwrap();

        let year = &pre.numeric_transforms()[1];
        assert_eq!(year.median, 0.0);
        assert_eq!(year.mean, 0.0);
        assert_eq!(year.scale, 1.0);

        let council = &pre.categorical_transforms()[0];
        assert_eq!(council.most_frequent, None);
        assert!(council.categories.is_empty());
        assert_eq!(pre.categorical_block("councilarea"), Some(2..2));
        assert_eq!(pre.categorical_block("type"), Some(2..4));
        assert_eq!(pre.output_width(), 4);

        let out = pre
            .transform_row(
                &FeatureRow::new()
                    .with("rooms", FeatureValue::Number(3.0))
                    .with("yearbuilt", FeatureValue::Number(1990.0))
                    .with("councilarea", FeatureValue::parse_category("Yarra"))
                    .with("type", FeatureValue::parse_category("u")),
            )
            .unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out[1], 1990.0);
        assert_eq!(&out[2..], &[0.0, 1.0]);

        let blank = pre
            .transform_row(
                &FeatureRow::new()
                    .with("rooms", FeatureValue::Missing)
                    .with("yearbuilt", FeatureValue::Missing)
                    .with("councilarea", FeatureValue::Missing)
                    .with("type", FeatureValue::Missing),
            )
            .unwrap();
        assert_eq!(blank[1], 0.0);
        assert_eq!(&blank[2..], &[1.0, 0.0]);
    }

    #[test]
    fn mode_ties_pick_smallest_value() {
        let rows = vec![
            row(FeatureValue::Number(1.0), FeatureValue::parse_category("u")),
            row(FeatureValue::Number(2.0), FeatureValue::parse_category("h")),
        ];
        let pre = Preprocessor::fit(&Table::from_rows(schema(), &rows).unwrap()).unwrap();
        assert_eq!(
            pre.categorical_transforms()[0].most_frequent.as_deref(),
            Some("h")
        );
    }

    #[test]
    fn mismatched_row_is_rejected() {
        let pre = Preprocessor::fit(&table()).unwrap();
        let swapped = FeatureRow::new()
            .with("type", FeatureValue::Missing)
            .with("landsize", FeatureValue::Missing);
        assert!(matches!(
            pre.transform_row(&swapped),
            Err(PredictorError::SchemaMismatch(_))
        ));
    }
}
