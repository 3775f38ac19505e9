//! Country centre coordinates
//!
//! Reads the (name, longitude, latitude) table and aligns its country naming
//! with the wage table before any join happens.

use super::csv_source::{read_latin1_csv, read_latin1_csv_bytes, require_columns};
use super::error::Result;
use polars::prelude::*;
use std::path::Path;
use tracing::{info, warn};

pub const NAME_COLUMN: &str = "name";
pub const LONGITUDE_COLUMN: &str = "longitude";
pub const LATITUDE_COLUMN: &str = "latitude";

/// Centroid table names that differ from the wage table naming
const NAME_ALIASES: &[(&str, &str)] = &[("Czech Republic", "Czechia")];

/// Representative point of a country in geographic coordinates (EPSG:4326)
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCentroid {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Map a centroid table name to the wage table naming
pub fn normalize_country_name(name: &str) -> &str {
    NAME_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Load the centroid CSV file
pub fn load_centroids(path: &Path) -> Result<Vec<CountryCentroid>> {
    info!("Loading country centres from {}", path.display());
    let raw = read_latin1_csv(path)?;
    centroids_from_frame(raw)
}

/// Load centroids from CSV bytes
pub fn load_centroids_bytes(bytes: &[u8]) -> Result<Vec<CountryCentroid>> {
    let raw = read_latin1_csv_bytes(bytes)?;
    centroids_from_frame(raw)
}

fn centroids_from_frame(raw: DataFrame) -> Result<Vec<CountryCentroid>> {
    require_columns(
        &raw,
        "centroid table",
        &[NAME_COLUMN, LONGITUDE_COLUMN, LATITUDE_COLUMN],
    )?;

    let df = raw
        .lazy()
        .select([
            col(NAME_COLUMN),
            col(LONGITUDE_COLUMN).cast(DataType::Float64),
            col(LATITUDE_COLUMN).cast(DataType::Float64),
        ])
        .collect()?;

    let names = df.column(NAME_COLUMN)?.as_materialized_series().str()?;
    let lons = df.column(LONGITUDE_COLUMN)?.as_materialized_series().f64()?;
    let lats = df.column(LATITUDE_COLUMN)?.as_materialized_series().f64()?;

    let mut centroids = Vec::with_capacity(df.height());
    for ((name, lon), lat) in names.into_iter().zip(lons).zip(lats) {
        match (name, lon, lat) {
            (Some(name), Some(longitude), Some(latitude)) => centroids.push(CountryCentroid {
                name: normalize_country_name(name).to_string(),
                longitude,
                latitude,
            }),
            (name, _, _) => warn!(
                "Skipping centre for '{}': missing or unparseable coordinates",
                name.unwrap_or("<unnamed>")
            ),
        }
    }

    info!("Country centres: {} usable rows", centroids.len());
    Ok(centroids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_czech_republic_renamed() {
        let csv = b"name,longitude,latitude\nCzech Republic,15.47,49.82\nFrance,2.21,46.23\n";
        let centroids = load_centroids_bytes(csv).unwrap();
        assert_eq!(centroids.len(), 2);
        assert_eq!(centroids[0].name, "Czechia");
        assert_eq!(centroids[0].longitude, 15.47);
        assert_eq!(centroids[1].name, "France");
    }

    #[test]
    fn test_normalize_leaves_other_names() {
        assert_eq!(normalize_country_name("Czech Republic"), "Czechia");
        assert_eq!(normalize_country_name("Czechia"), "Czechia");
        assert_eq!(normalize_country_name("Slovakia"), "Slovakia");
    }

    #[test]
    fn test_latin1_names_decoded() {
        let csv = b"name,longitude,latitude\nT\xfcrkiye,35.2,38.9\n";
        let centroids = load_centroids_bytes(csv).unwrap();
        assert_eq!(centroids[0].name, "Türkiye");
    }

    #[test]
    fn test_rows_without_coordinates_skipped() {
        let csv = b"name,longitude,latitude\nAtlantis,,\nMalta,14.38,35.94\n";
        let centroids = load_centroids_bytes(csv).unwrap();
        assert_eq!(centroids.len(), 1);
        assert_eq!(centroids[0].name, "Malta");
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let err = load_centroids_bytes(b"name,lon,lat\nMalta,14.38,35.94\n").unwrap_err();
        assert!(matches!(err, crate::data::MapError::Schema(_)));
    }
}
