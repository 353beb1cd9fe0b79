//! Dataset loading and in-memory tables.

pub mod loader;
pub mod split;
pub mod table;

pub use loader::{load_dataset, read_dataset};
pub use split::train_test_split;
pub use table::{Column, Dataset, Table};
