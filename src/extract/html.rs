//! HTML Report Parsing
//! Locates a section heading and flattens the table right after it.

use super::{ExtractError, Table};
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;
use tracing::debug;

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{css}: {e}")))
}

/// Load and parse an HTML document.
pub fn load_document(path: impl AsRef<Path>) -> Result<Html, ExtractError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ExtractError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    debug!("Parsing {} ({} bytes)", path.display(), content.len());
    Ok(Html::parse_document(&content))
}

/// Extract the table that immediately follows the `<tag>` whose text equals
/// `heading_text` exactly, surrounding whitespace included.
///
/// Only the next sibling element is considered; a table anywhere else in the
/// section does not count.
pub fn extract_table(doc: &Html, tag: &str, heading_text: &str) -> Result<Table, ExtractError> {
    let heading_sel = selector(tag)?;
    let heading = doc
        .select(&heading_sel)
        .find(|h| h.text().collect::<String>() == heading_text)
        .ok_or_else(|| ExtractError::HeadingNotFound {
            tag: tag.to_string(),
            text: heading_text.to_string(),
        })?;

    let table = heading
        .next_siblings()
        .find_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "table")
        .ok_or_else(|| ExtractError::TableNotFound {
            tag: tag.to_string(),
            text: heading_text.to_string(),
        })?;

    let row_sel = selector("tr")?;
    let cell_sel = selector("th, td")?;

    let rows: Vec<Vec<String>> = table
        .select(&row_sel)
        .map(|row| row.select(&cell_sel).map(cell_text).collect())
        .collect();

    debug!("Extracted {} rows under '{}'", rows.len(), heading_text);
    Ok(Table::new(rows))
}

/// Cell text with each text fragment trimmed, then joined.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}
