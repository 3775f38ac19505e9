//! Palette registry for loading and accessing color palettes
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! access by name. The diverging entries are the ColorBrewer 11-class ramps
//! that matplotlib uses for its colormaps of the same name.

use crate::data::error::{MapError, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        error!("Failed to load palettes.json: {}", e);
        PaletteRegistry::default()
    })
});

/// Neutral gray returned when a palette has no usable colors
pub const FALLBACK_GRAY: [u8; 3] = [128, 128, 128];

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by index (clamped to the last color)
    pub fn get_color(&self, index: usize) -> [u8; 3] {
        match self.colors.get(index.min(self.colors.len().saturating_sub(1))) {
            Some(hex) => parse_hex_color(hex).unwrap_or(FALLBACK_GRAY),
            None => FALLBACK_GRAY,
        }
    }

    /// Get the number of colors in this palette
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// All palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| MapError::Config(format!("Failed to parse palettes JSON: {}", e)))?;

        let mut registry = Self::default();
        for def in definitions {
            registry.palettes.insert(def.name.to_lowercase(), def);
        }

        debug!("PaletteRegistry: loaded {} palettes", registry.palettes.len());
        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }
}

/// Parse a hex color string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - either without the leading `#`
pub fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 && hex.len() != 8 {
        warn!("Invalid hex color length '{}': {}", hex, hex.len());
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some([r, g, b])
}

/// Format an RGB array as `#rrggbb`
pub fn to_hex_color(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("#67001F"), Some([103, 0, 31]));
        assert_eq!(parse_hex_color("053061"), Some([5, 48, 97]));
        assert_eq!(parse_hex_color("#440154FF"), Some([68, 1, 84]));

        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("GGGGGG"), None);
    }

    #[test]
    fn test_to_hex_color() {
        assert_eq!(to_hex_color([105, 105, 105]), "#696969");
        assert_eq!(to_hex_color([0, 0, 0]), "#000000");
    }

    #[test]
    fn test_palette_registry_loads() {
        let rdbu = PALETTE_REGISTRY.get("RdBu").unwrap();
        assert_eq!(rdbu.len(), 11);
        // Red end first, blue end last
        assert_eq!(rdbu.get_color(0), [103, 0, 31]);
        assert_eq!(rdbu.get_color(10), [5, 48, 97]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(PALETTE_REGISTRY.get("rdbu").is_some());
        assert!(PALETTE_REGISTRY.get("VIRIDIS").is_some());
        assert!(PALETTE_REGISTRY.get("NoSuchPalette").is_none());
    }

    #[test]
    fn test_get_color_clamps_index() {
        let rdbu = PALETTE_REGISTRY.get("RdBu").unwrap();
        assert_eq!(rdbu.get_color(99), rdbu.get_color(10));
    }
}
