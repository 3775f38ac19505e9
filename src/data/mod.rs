//! Map input data
//!
//! Everything that turns the three input files into joined, reprojected
//! layers ready for drawing.
//!
//! Structure:
//! - `error.rs`: Error types
//! - `properties.rs`: Property registry and typed reader
//! - `csv_source.rs`: Latin-1 CSV reading
//! - `wages.rs`: Minimum wage cleaning
//! - `centroids.rs`: Country centres
//! - `boundaries.rs`: Country outlines
//! - `projection.rs`: CRS tags and LAEA Europe
//! - `join.rs`: Boundary and centre joins

pub mod boundaries;
pub mod centroids;
pub mod csv_source;
pub mod error;
pub mod join;
pub mod projection;
pub mod properties;
pub mod wages;

// Re-exports for convenience
pub use boundaries::{BoundaryGeometry, BoundaryLayer};
pub use centroids::CountryCentroid;
pub use error::{MapError, Result};
pub use join::{ChoroplethLayer, ChoroplethRegion, LabelLayer, LabelPoint};
pub use projection::Crs;
pub use properties::PropertyReader;
pub use wages::{WageCleaner, WageRecord, WageTable};
