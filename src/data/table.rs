use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ColumnKind, FeatureRow, FeatureValue, Schema};
use crate::error::{PredictorError, Result};

/// One typed column; `None` marks a missing cell
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    fn empty(kind: ColumnKind, capacity: usize) -> Self {
        match kind {
            ColumnKind::Numeric => Column::Numeric(Vec::with_capacity(capacity)),
            ColumnKind::Categorical => Column::Categorical(Vec::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn missing_count(&self) -> usize {
        match self {
            Column::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            Column::Categorical(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    fn push(&mut self, value: &FeatureValue) {
        match self {
            Column::Numeric(v) => v.push(value.as_number().filter(|x| x.is_finite())),
            Column::Categorical(v) => v.push(value.as_category().map(str::to_string)),
        }
    }

    fn value(&self, row: usize) -> FeatureValue {
        match self {
            Column::Numeric(v) => v[row].map_or(FeatureValue::Missing, FeatureValue::Number),
            Column::Categorical(v) => v[row]
                .as_ref()
                .map_or(FeatureValue::Missing, |s| FeatureValue::Category(s.clone())),
        }
    }

    fn take(&self, indices: &[usize]) -> Self {
        match self {
            Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// In-memory column store laid out by a [`Schema`]
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn empty(schema: Schema) -> Self {
        let columns = schema
            .columns()
            .iter()
            .map(|c| Column::empty(c.kind, 0))
            .collect();
        Self {
            schema,
            columns,
            n_rows: 0,
        }
    }

    /// Build a table from rows that each match `schema`
    pub fn from_rows(schema: Schema, rows: &[FeatureRow]) -> Result<Self> {
        let mut columns: Vec<Column> = schema
            .columns()
            .iter()
            .map(|c| Column::empty(c.kind, rows.len()))
            .collect();

        for (idx, row) in rows.iter().enumerate() {
            row.check_schema(&schema).map_err(|e| {
                PredictorError::Dataset(format!("row {idx} does not match schema: {e}"))
            })?;
            for (col, (_, value)) in columns.iter_mut().zip(row.iter()) {
                col.push(value);
            }
        }

        Ok(Self {
            schema,
            columns,
            n_rows: rows.len(),
        })
    }

    pub(crate) fn push_row(&mut self, row: &FeatureRow) -> Result<()> {
        row.check_schema(&self.schema)?;
        for (col, (_, value)) in self.columns.iter_mut().zip(row.iter()) {
            col.push(value);
        }
        self.n_rows += 1;
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.schema.position(name).map(|idx| &self.columns[idx])
    }

    /// Materialize row `idx` in schema order
    pub fn row(&self, idx: usize) -> Option<FeatureRow> {
        if idx >= self.n_rows {
            return None;
        }
        let mut row = FeatureRow::new();
        for (spec, col) in self.schema.columns().iter().zip(&self.columns) {
            row.push(spec.name.clone(), col.value(idx));
        }
        Some(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = FeatureRow> + '_ {
        (0..self.n_rows).filter_map(move |i| self.row(i))
    }

    /// Sorted distinct non-missing values of a categorical column
    pub fn distinct_categories(&self, name: &str) -> Vec<String> {
        match self.column(name) {
            Some(Column::Categorical(values)) => values
                .iter()
                .flatten()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Distinct values for every categorical column, keyed by column name
    pub fn category_options(&self) -> BTreeMap<String, Vec<String>> {
        self.schema
            .categorical_columns()
            .map(|c| (c.name.clone(), self.distinct_categories(&c.name)))
            .collect()
    }

    /// New table holding the given rows, in the given order
    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(PredictorError::Validation(format!(
                "row index {bad} out of range for table with {} rows",
                self.n_rows
            )));
        }
        Ok(Self {
            schema: self.schema.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        })
    }
}

/// Feature table plus the aligned regression target
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub table: Table,
    pub target: Vec<f64>,
}

impl Dataset {
    pub fn new(table: Table, target: Vec<f64>) -> Result<Self> {
        if table.n_rows() != target.len() {
            return Err(PredictorError::Dataset(format!(
                "table has {} rows but target has {} values",
                table.n_rows(),
                target.len()
            )));
        }
        if target.iter().any(|v| !v.is_finite()) {
            return Err(PredictorError::Dataset(
                "target contains non-finite values".to_string(),
            ));
        }
        Ok(Self { table, target })
    }

    pub fn from_rows(schema: Schema, rows: Vec<(FeatureRow, f64)>) -> Result<Self> {
        let (features, target): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let table = Table::from_rows(schema, &features)?;
        Self::new(table, target)
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn take(&self, indices: &[usize]) -> Result<Self> {
        let table = self.table.take(indices)?;
        let target = indices.iter().map(|&i| self.target[i]).collect();
        Ok(Self { table, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnSpec;

    fn tiny_schema() -> Schema {
        Schema::new(vec![
            ColumnSpec::numeric("rooms"),
            ColumnSpec::categorical("suburb"),
        ])
        .unwrap()
    }

    fn row(rooms: FeatureValue, suburb: FeatureValue) -> FeatureRow {
        FeatureRow::new().with("rooms", rooms).with("suburb", suburb)
    }

    #[test]
    fn rows_round_through_columns() {
        let rows = vec![
            row(FeatureValue::Number(2.0), FeatureValue::parse_category("Kew")),
            row(FeatureValue::Missing, FeatureValue::parse_category("Abbotsford")),
            row(FeatureValue::Number(4.0), FeatureValue::Missing),
        ];
        let table = Table::from_rows(tiny_schema(), &rows).unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.row(1).unwrap(), rows[1]);
        assert_eq!(table.column("rooms").unwrap().missing_count(), 1);
        assert_eq!(
            table.distinct_categories("suburb"),
            vec!["Abbotsford".to_string(), "Kew".to_string()]
        );
        assert!(table.row(3).is_none());
    }

    #[test]
    fn take_reorders_and_checks_bounds() {
        let rows = vec![
            (row(FeatureValue::Number(1.0), FeatureValue::Missing), 10.0),
            (row(FeatureValue::Number(2.0), FeatureValue::Missing), 20.0),
        ];
        let ds = Dataset::from_rows(tiny_schema(), rows).unwrap();
        let flipped = ds.take(&[1, 0]).unwrap();
        assert_eq!(flipped.target, vec![20.0, 10.0]);
        assert_eq!(
            flipped.table.row(0).unwrap().get("rooms"),
            Some(&FeatureValue::Number(2.0))
        );
        assert!(ds.take(&[5]).is_err());
    }

    #[test]
    fn dataset_rejects_misaligned_target() {
        let table = Table::empty(tiny_schema());
        assert!(Dataset::new(table, vec![1.0]).is_err());
    }
}
