//! Data module - CSV loading, table model and cleaning

mod cleaner;
mod loader;
mod table;

pub use cleaner::{CleanOptions, Cleaner};
pub use loader::{DataLoader, LoaderError};
pub(crate) use table::dense_values;
pub use table::{CleanedTable, DatedFrame, DeltaTable, RawTable, SmoothedTable};
