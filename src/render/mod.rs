//! Figure rendering
//!
//! Structure:
//! - `palettes.rs`: Embedded palette registry
//! - `colors.rs`: Color stops and fixed-domain scales
//! - `style.rs`: Theme presets
//! - `viewport.rs`: View window and pixel transform
//! - `legend.rs`: Colorbar layout
//! - `renderer.rs`: SVG output

pub mod colors;
pub mod legend;
pub mod palettes;
pub mod renderer;
pub mod style;
pub mod viewport;

pub use colors::ColorScale;
pub use renderer::{
    FigureSize, LabelStyle, LegendSpec, MapRenderer, RenderSettings, RenderedMap, TitleSpec,
};
pub use style::{Theme, ThemeName};
pub use viewport::{Padding, ViewWindow};
