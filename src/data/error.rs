use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, joining or rendering map data
#[derive(Debug, Error)]
pub enum MapError {
    /// Input file could not be read or output could not be written
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// DataFrame parsing or query error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Boundary dataset is not valid GeoJSON
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Expected column or property missing from an input
    #[error("Schema error: {0}")]
    Schema(String),

    /// Coordinate reference system mismatch or unsupported reprojection
    #[error("Projection error: {0}")]
    Projection(String),

    /// Invalid configuration (property registry or user overrides)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Figure could not be assembled
    #[error("Render error: {0}")]
    Render(String),
}

impl MapError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Type alias for Results using MapError
pub type Result<T> = std::result::Result<T, MapError>;
