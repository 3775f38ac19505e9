//! Latin-1 CSV reading into all-string DataFrames
//!
//! Both tabular inputs are latin-1 encoded. They are decoded up front and read
//! with schema inference disabled, so every column arrives as `String` and
//! type coercion happens explicitly in the stage that owns the column.

use super::error::{MapError, Result};
use encoding_rs::WINDOWS_1252;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Read a latin-1 CSV file into a DataFrame of string columns
pub fn read_latin1_csv(path: &Path) -> Result<DataFrame> {
    let bytes = std::fs::read(path).map_err(|e| MapError::io(path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    read_latin1_csv_bytes(&bytes)
}

/// Read latin-1 CSV bytes into a DataFrame of string columns
pub fn read_latin1_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    let text = decode_latin1(bytes);
    let separator = detect_separator(&text);

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()?;

    debug!(
        "Parsed CSV: {} rows x {} columns (separator '{}')",
        df.height(),
        df.width(),
        separator as char
    );
    Ok(df)
}

/// Decode latin-1 bytes to UTF-8
///
/// Uses the WHATWG windows-1252 decoder, the superset browsers apply to
/// latin-1 labelled content.
pub fn decode_latin1(bytes: &[u8]) -> String {
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

/// Pick the field separator from the header line
///
/// Semicolon when the header has semicolons and no commas, comma otherwise.
pub fn detect_separator(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

/// Fail with a schema error unless every named column is present
pub fn require_columns(df: &DataFrame, source: &str, columns: &[&str]) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| !present.iter().any(|p| p == c))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MapError::Schema(format!(
            "{} is missing column(s) {:?}; found {:?}",
            source, missing, present
        )))
    }
}
