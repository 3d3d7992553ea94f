//! CSV Export
//! Writes an extracted table to disk and reads it back as text.

use super::{ExtractError, Table};
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Write `table` as CSV: first row is the header, the rest are records.
///
/// An empty table writes nothing and returns [`ExtractError::EmptyTable`].
pub fn write_csv(table: &Table, out_path: impl AsRef<Path>) -> Result<(), ExtractError> {
    let out_path = out_path.as_ref();
    let header = match table.header() {
        Some(h) if !h.is_empty() => unique_names(h),
        _ => return Err(ExtractError::EmptyTable),
    };

    let width = header.len();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(table.records().len()); width];

    for (i, record) in table.records().iter().enumerate() {
        if record.len() > width {
            warn!(
                "Row {} has {} cells but the header has {}; extra cells dropped",
                i + 1,
                record.len(),
                width
            );
        }
        for (j, column) in cells.iter_mut().enumerate() {
            column.push(record.get(j).cloned());
        }
    }

    let columns: Vec<Column> = header
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();
    let mut df = DataFrame::new(columns)?;

    let mut file = File::create(out_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;

    info!("The table has been exported to {}", out_path.display());
    Ok(())
}

/// Read a CSV back with every value as text. Missing cells become `""`.
pub fn read_csv_table(path: impl AsRef<Path>) -> Result<Table, ExtractError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ExtractError::FileNotFound(path.to_path_buf()));
    }

    // Schema inference over zero rows reads every column as String.
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    let header: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let columns = df
        .get_columns()
        .iter()
        .map(|c| c.str().map(|ca| ca.clone()))
        .collect::<PolarsResult<Vec<StringChunked>>>()?;

    let mut rows = Vec::with_capacity(df.height() + 1);
    rows.push(header);
    for i in 0..df.height() {
        rows.push(
            columns
                .iter()
                .map(|ca| ca.get(i).unwrap_or_default().to_string())
                .collect(),
        );
    }

    Ok(Table::new(rows))
}

/// Make header names unique by suffixing repeats with `_<n>`.
fn unique_names(header: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    header
        .iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut n = 1;
            while seen.contains(&candidate) {
                candidate = format!("{name}_{n}");
                n += 1;
            }
            if candidate != *name {
                warn!("Duplicate column '{}' renamed to '{}'", name, candidate);
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}
