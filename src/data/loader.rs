//! CSV dataset loading.
//!
//! Expected format: a header row naming at least the schema columns and
//! `price`, then one property per line. Extra columns are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::data::table::{Dataset, Table};
use crate::domain::{ColumnKind, FeatureRow, FeatureValue, Schema, TARGET_COLUMN};
use crate::error::{PredictorError, Result};

/// Cell spellings treated as missing regardless of column kind
const MISSING_TOKENS: [&str; 6] = ["", "na", "n/a", "nan", "null", "none"];

/// Load the housing dataset from a CSV file on disk
pub fn load_dataset<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        PredictorError::Dataset(format!("failed to open {}: {}", path.display(), e))
    })?;
    let dataset = read_dataset(file, schema)?;
    info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = schema.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Parse a dataset from any CSV reader
pub fn read_dataset<R: Read>(reader: R, schema: &Schema) -> Result<Dataset> {
    let mut lines = BufReader::new(reader).lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(PredictorError::Dataset("CSV input is empty".to_string())),
    };
    let header: Vec<String> = split_record(header.trim_start_matches('\u{feff}'))
        .into_iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let locate = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| PredictorError::MissingColumn(name.to_string()))
    };
    let feature_idx = schema
        .names()
        .map(|name| locate(name))
        .collect::<Result<Vec<_>>>()?;
    let target_idx = locate(TARGET_COLUMN)?;

    let mut table = Table::empty(schema.clone());
    let mut target = Vec::new();
    let mut skipped = 0usize;

    for (i, line) in lines.enumerate() {
        let line_no = i + 2;
        let line = line.map_err(|e| {
            PredictorError::Dataset(format!("failed to read line {line_no}: {e}"))
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_record(&line);
        if fields.len() != header.len() {
            warn!(
                line = line_no,
                expected = header.len(),
                got = fields.len(),
                "skipping malformed line: wrong field count"
            );
            skipped += 1;
            continue;
        }

        let price = match parse_cell_number(&fields[target_idx]) {
            Some(p) => p,
            None => {
                debug!(line = line_no, "skipping row without usable price");
                skipped += 1;
                continue;
            }
        };

        let mut row = FeatureRow::new();
        for (spec, &idx) in schema.columns().iter().zip(&feature_idx) {
            let cell = &fields[idx];
            let value = match spec.kind {
                ColumnKind::Numeric => {
                    parse_cell_number(cell).map_or(FeatureValue::Missing, FeatureValue::Number)
                }
                ColumnKind::Categorical if is_missing_token(cell) => FeatureValue::Missing,
                ColumnKind::Categorical => FeatureValue::parse_category(cell),
            };
            row.push(spec.name.clone(), value);
        }

        table.push_row(&row)?;
        target.push(price);
    }

    if skipped > 0 {
        warn!(skipped, "some dataset rows were skipped");
    }
    if table.is_empty() {
        return Err(PredictorError::Dataset(
            "dataset contains no usable rows".to_string(),
        ));
    }

    Dataset::new(table, target)
}

fn is_missing_token(cell: &str) -> bool {
    let lowered = cell.trim().to_ascii_lowercase();
    MISSING_TOKENS.contains(&lowered.as_str())
}

fn parse_cell_number(cell: &str) -> Option<f64> {
    if is_missing_token(cell) {
        return None;
    }
    FeatureValue::parse_number(cell).as_number()
}

/// Split one CSV record, honouring double quotes and `""` escapes.
/// Quoted fields spanning several lines are not supported.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
suburb,rooms,type,price,bathroom,car,landsize,buildingarea,yearbuilt,councilarea,regionname,building_age,address
Abbotsford,2,h,1480000,1,1,202,,,Yarra,Northern Metropolitan,,\"85 Turner St, Abbotsford\"
Abbotsford,3,h,1035000,2,0,156,79,1900,Yarra,Northern Metropolitan,125,25 Bloomburg St
Kew,4,u,NA,2,2,0,,,Boroondara,Southern Metropolitan,,1 Nowhere Rd
Kew,4,u,2100000,2,2,NaN,150,2005,Boroondara,Southern Metropolitan,20
";

    #[test]
    fn splits_quoted_fields() {
        assert_eq!(
            split_record("a,\"b, c\",\"say \"\"hi\"\"\",,"),
            vec!["a", "b, c", "say \"hi\"", "", ""]
        );
    }

    #[test]
    fn reads_rows_and_skips_unusable_ones() {
        let ds = read_dataset(SAMPLE.as_bytes(), &Schema::housing()).unwrap();
        // line 4 has no price, line 5 has a short field count
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.target, vec![1_480_000.0, 1_035_000.0]);

        let first = ds.table.row(0).unwrap();
        assert_eq!(first.get("rooms"), Some(&FeatureValue::Number(2.0)));
        assert_eq!(first.get("buildingarea"), Some(&FeatureValue::Missing));
        assert_eq!(
            first.get("regionname"),
            Some(&FeatureValue::Category("Northern Metropolitan".into()))
        );
        assert!(first.check_schema(&Schema::housing()).is_ok());
    }

    #[test]
    fn missing_required_column_is_reported() {
        let csv = "rooms,price\n3,100\n";
        let err = read_dataset(csv.as_bytes(), &Schema::housing()).unwrap_err();
        assert!(matches!(err, PredictorError::MissingColumn(ref c) if c == "bathroom"));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(read_dataset("".as_bytes(), &Schema::housing()).is_err());
    }
}
