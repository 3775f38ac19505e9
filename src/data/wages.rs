//! Minimum wage table loading and cleaning
//!
//! The raw table has one row per (GEO, TIME) with a string `Value` that may
//! hold the ":" missing marker. Cleaning runs as a single polars lazy query;
//! the surviving rows are then rounded and turned into [`WageRecord`]s.

use super::csv_source::{read_latin1_csv, read_latin1_csv_bytes, require_columns};
use super::error::Result;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

pub const COUNTRY_COLUMN: &str = "GEO";
pub const PERIOD_COLUMN: &str = "TIME";
pub const VALUE_COLUMN: &str = "Value";
pub const FOOTNOTE_COLUMN: &str = "Flag and Footnotes";

/// Join key the country column is renamed to
pub const JOIN_KEY: &str = "name";

/// Placeholder for a missing measurement in the raw table
pub const MISSING_SENTINEL: &str = ":";

const EXCLUDED_COUNTRY: &str = "United States";
const GERMANY_LONG: &str = "Germany (until 1990 former territory of the FRG)";
const GERMANY: &str = "Germany";

/// One cleaned minimum wage observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WageRecord {
    /// Country name (join key)
    pub name: String,
    /// Time period, e.g. "2020S2"
    pub period: String,
    /// Monthly minimum wage in euro, rounded
    pub value: i64,
}

/// Cleaned wage records for a single period, sorted by country name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WageTable {
    pub records: Vec<WageRecord>,
}

impl WageTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WageRecord> {
        self.records.iter()
    }

    /// Find the record for a country
    pub fn get(&self, name: &str) -> Option<&WageRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

/// Cleans the raw minimum wage table down to one period
#[derive(Debug, Clone)]
pub struct WageCleaner {
    target_period: String,
}

impl WageCleaner {
    pub fn new(target_period: impl Into<String>) -> Self {
        Self {
            target_period: target_period.into(),
        }
    }

    /// Load and clean a wage CSV file
    pub fn load(&self, path: &Path) -> Result<WageTable> {
        info!("Loading wage table from {}", path.display());
        let raw = read_latin1_csv(path)?;
        self.clean(raw)
    }

    /// Clean wage CSV bytes
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<WageTable> {
        let raw = read_latin1_csv_bytes(bytes)?;
        self.clean(raw)
    }

    /// Clean a raw all-string wage DataFrame
    ///
    /// Non-numeric values are not rejected: the float cast turns them into
    /// nulls and the null filter removes them together with the ":" rows.
    /// "NaN" and infinities do parse as floats; they are dropped when the
    /// records are built.
    pub fn clean(&self, raw: DataFrame) -> Result<WageTable> {
        require_columns(
            &raw,
            "wage table",
            &[COUNTRY_COLUMN, PERIOD_COLUMN, VALUE_COLUMN, FOOTNOTE_COLUMN],
        )?;
        let raw_rows = raw.height();

        // The sentinel means missing in every column, and a row missing
        // anything at all is dropped
        let retained = raw.drop(FOOTNOTE_COLUMN)?;
        let columns: Vec<String> = retained
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let sentinel_to_null: Vec<Expr> = columns
            .iter()
            .map(|name| {
                when(col(name.as_str()).eq(lit(MISSING_SENTINEL)))
                    .then(lit(NULL))
                    .otherwise(col(name.as_str()))
                    .alias(name.as_str())
            })
            .collect();
        let complete_row = columns
            .iter()
            .map(|name| col(name.as_str()).is_not_null())
            .reduce(|acc, e| acc.and(e))
            .unwrap_or_else(|| lit(true));

        let cleaned = retained
            .lazy()
            .with_columns(sentinel_to_null)
            .filter(col(COUNTRY_COLUMN).neq(lit(EXCLUDED_COUNTRY)))
            .with_columns([
                when(col(COUNTRY_COLUMN).eq(lit(GERMANY_LONG)))
                    .then(lit(GERMANY))
                    .otherwise(col(COUNTRY_COLUMN))
                    .alias(COUNTRY_COLUMN),
                col(VALUE_COLUMN).cast(DataType::Float64),
            ])
            .filter(complete_row)
            .filter(col(PERIOD_COLUMN).eq(lit(self.target_period.as_str())))
            .select([
                col(COUNTRY_COLUMN).alias(JOIN_KEY),
                col(PERIOD_COLUMN),
                col(VALUE_COLUMN),
            ])
            .collect()?;

        let mut records = records_from_frame(&cleaned)?;
        // Stable sort keeps file order among equal names
        records.sort_by(|a, b| a.name.cmp(&b.name));

        info!(
            "Wage table: {} raw rows -> {} records for {}",
            raw_rows,
            records.len(),
            self.target_period
        );
        Ok(WageTable { records })
    }
}

/// Extract records from the cleaned (name, TIME, Value) frame
fn records_from_frame(df: &DataFrame) -> Result<Vec<WageRecord>> {
    let names = df.column(JOIN_KEY)?.as_materialized_series().str()?;
    let periods = df.column(PERIOD_COLUMN)?.as_materialized_series().str()?;
    let values = df.column(VALUE_COLUMN)?.as_materialized_series().f64()?;

    let records = names
        .into_iter()
        .zip(periods.into_iter())
        .zip(values.into_iter())
        .filter_map(|((name, period), value)| {
            let value = value.filter(|v| v.is_finite())?;
            let record = WageRecord {
                name: name?.to_string(),
                period: period?.to_string(),
                value: round_wage(value),
            };
            debug!("  {} {} = {}", record.name, record.period, record.value);
            Some(record)
        })
        .collect();

    Ok(records)
}

/// Round to the nearest integer, ties to even
pub fn round_wage(value: f64) -> i64 {
    value.round_ties_even() as i64
}
