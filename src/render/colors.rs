//! Continuous color scales
//!
//! A [`ColorPalette`] is a sorted list of value/color stops interpolated
//! linearly. [`ColorScale`] spreads a named palette evenly over a fixed
//! domain, so the same wage always gets the same fill regardless of which
//! countries are in the data.

use super::palettes::{PaletteDefinition, FALLBACK_GRAY, PALETTE_REGISTRY};
use crate::data::error::{MapError, Result};
use tracing::debug;

/// A color palette with sorted color stops for interpolation
#[derive(Debug, Clone, Default)]
pub struct ColorPalette {
    /// Sorted list of color stops (by value, ascending)
    pub stops: Vec<ColorStop>,
}

/// A single color stop in a palette
#[derive(Debug, Clone, PartialEq)]
pub struct ColorStop {
    /// Numeric value at this stop
    pub value: f64,
    /// RGB color at this stop
    pub color: [u8; 3],
}

impl ColorPalette {
    /// Create a new empty palette
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a color stop and maintain sorted order
    pub fn add_stop(&mut self, value: f64, color: [u8; 3]) {
        let stop = ColorStop { value, color };
        match self.stops.binary_search_by(|s| s.value.total_cmp(&value)) {
            Ok(pos) => self.stops[pos] = stop, // Replace if exists
            Err(pos) => self.stops.insert(pos, stop),
        }
    }

    /// Distribute every color of a palette definition evenly over [min, max]
    pub fn spread(definition: &PaletteDefinition, min: f64, max: f64) -> Self {
        let mut palette = ColorPalette::new();
        let n_colors = definition.len();

        for i in 0..n_colors {
            let t = if n_colors > 1 {
                i as f64 / (n_colors - 1) as f64
            } else {
                0.5
            };
            palette.add_stop(min + t * (max - min), definition.get_color(i));
        }

        debug!(
            "Distributed {} {} colors across [{}, {}]",
            n_colors, definition.name, min, max
        );
        palette
    }
}

/// Interpolate a color value using the palette
///
/// Uses linear interpolation between the surrounding color stops.
/// Values outside the palette range clamp to the min/max colors.
pub fn interpolate_color(value: f64, palette: &ColorPalette) -> [u8; 3] {
    let stops = &palette.stops;
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return FALLBACK_GRAY,
    };

    if value.is_nan() {
        return FALLBACK_GRAY;
    }
    if value <= first.value {
        return first.color;
    }
    if value >= last.value {
        return last.color;
    }

    // Find surrounding stops using binary search
    let idx = stops.partition_point(|stop| stop.value < value);
    let lower = &stops[idx - 1];
    let upper = &stops[idx];

    let t = (value - lower.value) / (upper.value - lower.value);
    [
        (lower.color[0] as f64 * (1.0 - t) + upper.color[0] as f64 * t) as u8,
        (lower.color[1] as f64 * (1.0 - t) + upper.color[1] as f64 * t) as u8,
        (lower.color[2] as f64 * (1.0 - t) + upper.color[2] as f64 * t) as u8,
    ]
}

/// Named palette over a fixed value domain
#[derive(Debug, Clone)]
pub struct ColorScale {
    pub palette_name: String,
    pub min: f64,
    pub max: f64,
    palette: ColorPalette,
}

impl ColorScale {
    /// Build a scale from a registered palette
    pub fn new(palette_name: &str, min: f64, max: f64) -> Result<Self> {
        if !(min < max) {
            return Err(MapError::Config(format!(
                "color scale needs min < max, got [{}, {}]",
                min, max
            )));
        }

        let definition = PALETTE_REGISTRY.get(palette_name).ok_or_else(|| {
            MapError::Config(format!("Palette '{}' not found", palette_name))
        })?;
        if definition.is_empty() {
            return Err(MapError::Config(format!(
                "Palette '{}' has no colors",
                palette_name
            )));
        }

        Ok(Self {
            palette_name: definition.name.clone(),
            min,
            max,
            palette: ColorPalette::spread(definition, min, max),
        })
    }

    /// Fill color for a value; out-of-domain values clamp to the ends
    pub fn color_for(&self, value: f64) -> [u8; 3] {
        interpolate_color(value, &self.palette)
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_add_stop() {
        let mut palette = ColorPalette::new();
        palette.add_stop(0.0, [0, 0, 0]);
        palette.add_stop(100.0, [255, 255, 255]);
        palette.add_stop(50.0, [128, 128, 128]);
        palette.add_stop(50.0, [10, 10, 10]);

        assert_eq!(palette.stops.len(), 3);
        assert_eq!(palette.stops[0].value, 0.0);
        assert_eq!(palette.stops[1].value, 50.0);
        assert_eq!(palette.stops[1].color, [10, 10, 10]);
        assert_eq!(palette.stops[2].value, 100.0);
    }

    #[test]
    fn test_interpolate_color_edge_cases() {
        let mut palette = ColorPalette::new();
        palette.add_stop(0.0, [0, 0, 0]);
        palette.add_stop(100.0, [255, 255, 255]);

        assert_eq!(interpolate_color(-10.0, &palette), [0, 0, 0]);
        assert_eq!(interpolate_color(0.0, &palette), [0, 0, 0]);
        assert_eq!(interpolate_color(100.0, &palette), [255, 255, 255]);
        assert_eq!(interpolate_color(110.0, &palette), [255, 255, 255]);
        assert_eq!(interpolate_color(f64::NAN, &palette), FALLBACK_GRAY);
        assert_eq!(interpolate_color(5.0, &ColorPalette::new()), FALLBACK_GRAY);
    }

    #[test]
    fn test_interpolate_color_midpoint() {
        let mut palette = ColorPalette::new();
        palette.add_stop(0.0, [0, 0, 0]);
        palette.add_stop(100.0, [100, 200, 255]);

        assert_eq!(interpolate_color(50.0, &palette), [50, 100, 127]);
    }

    #[test]
    fn test_scale_clamps_above_max() {
        let scale = ColorScale::new("RdBu", 300.0, 2000.0).unwrap();
        assert_eq!(scale.color_for(2500.0), scale.color_for(2000.0));
        assert_eq!(scale.color_for(2000.0), [5, 48, 97]);
    }

    #[test]
    fn test_scale_clamps_below_min() {
        let scale = ColorScale::new("RdBu", 300.0, 2000.0).unwrap();
        assert_eq!(scale.color_for(120.0), scale.color_for(300.0));
        assert_eq!(scale.color_for(300.0), [103, 0, 31]);
    }

    #[test]
    fn test_scale_midpoint_is_neutral() {
        let scale = ColorScale::new("RdBu", 300.0, 2000.0).unwrap();
        assert_eq!(scale.color_for(1150.0), [247, 247, 247]);
        let stops = &scale.palette().stops;
        assert_eq!(stops.first().map(|s| s.value), Some(300.0));
        assert_eq!(stops.last().map(|s| s.value), Some(2000.0));
    }

    #[test]
    fn test_scale_rejects_bad_input() {
        assert!(ColorScale::new("RdBu", 2000.0, 300.0).is_err());
        assert!(ColorScale::new("Nope", 0.0, 1.0).is_err());
    }
}
