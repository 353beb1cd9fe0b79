pub mod listing;
pub mod row;
pub mod schema;

pub use listing::RawListing;
pub use row::{FeatureRow, FeatureValue};
pub use schema::{
    ColumnKind, ColumnSpec, Schema, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS, TARGET_COLUMN,
};
