//! Minimum wage map library
//!
//! This library provides the core modules behind the `minwage_map` binary.
//!
//! Module organization:
//! - `data`: Input loading, cleaning, reprojection and joins
//! - `render`: Palettes, styling and SVG output
//! - `config`: Typed map configuration
//! - `pipeline`: End-to-end map generation

pub mod config;
pub mod data;
pub mod pipeline;
pub mod render;
