//! Extract module - HTML report table to CSV

mod html;
mod table;
mod writer;

pub use html::{extract_table, load_document};
pub use table::Table;
pub use writer::{read_csv_table, write_csv};

use crate::config::AppConfig;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("File '{}' not found", .0.display())]
    FileNotFound(PathBuf),
    #[error("<{tag}> with text '{text}' not found")]
    HeadingNotFound { tag: String, text: String },
    #[error("No table found immediately after <{tag}> with text '{text}'")]
    TableNotFound { tag: String, text: String },
    #[error("No table data to export")]
    EmptyTable,
    #[error("Invalid selector '{0}'")]
    Selector(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] polars::prelude::PolarsError),
}

/// Read the configured report and write its match table as CSV.
///
/// Nothing is written unless a non-empty table was found.
pub fn extract_to_csv(config: &AppConfig) -> Result<PathBuf, ExtractError> {
    let html_path = config.html_path();
    info!("Reading {}", html_path.display());
    let doc = load_document(&html_path)?;

    let table = extract_table(&doc, &config.heading_tag, &config.heading_text)?;
    info!("Found table with {} rows", table.len());

    let csv_path = config.csv_path();
    write_csv(&table, &csv_path)?;
    Ok(csv_path)
}
