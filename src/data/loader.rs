//! CSV Data Loader Module
//! Handles CSV file loading and column typing using Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("CSV file '{}' not found", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Whether a column holds numbers (integers or floats).
pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Handles CSV file loading with Polars.
#[derive(Default)]
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a CSV file of match records, newest match first.
    ///
    /// The schema is inferred over every row, so a column comes back numeric
    /// only when all of its non-empty values parse as numbers.
    pub fn load_csv(&mut self, file_path: impl AsRef<Path>) -> Result<&DataFrame, LoaderError> {
        let file_path = file_path.as_ref();
        if !file_path.exists() {
            return Err(LoaderError::FileNotFound(file_path.to_path_buf()));
        }

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()?
            .collect()?;

        let numeric = df.get_columns().iter().filter(|c| is_numeric(c.dtype())).count();
        info!(
            "Loaded {} rows x {} columns ({} numeric) from {}",
            df.height(),
            df.width(),
            numeric,
            file_path.display()
        );

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Take ownership of the loaded DataFrame.
    pub fn into_dataframe(self) -> Result<DataFrame, LoaderError> {
        self.df.ok_or(LoaderError::NoData)
    }
}

/// Load the record set at `path`.
pub fn load_records(path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
    let mut loader = DataLoader::new();
    loader.load_csv(path)?;
    loader.into_dataframe()
}
