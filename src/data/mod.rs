//! Data module - CSV loading and processing

mod loader;
mod processor;

pub use loader::{is_numeric, load_records, DataLoader, LoaderError};
pub use processor::{DataProcessor, FeatureMatrix, NumericColumn, ProcessorError, TargetVector};
