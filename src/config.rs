//! Map configuration from properties
//!
//! Configuration is loaded from map properties (defined in properties.json).
//! All default values come from properties.json - no hardcoded fallbacks in this code.
//!
//! Property definitions and defaults are parsed from properties.json at compile time
//! via the `PropertyReader` which keeps a single source of truth for defaults.

use crate::data::error::Result;
use crate::data::PropertyReader;
use crate::render::{
    ColorScale, FigureSize, LabelStyle, LegendSpec, Padding, RenderSettings, Theme, ThemeName,
    TitleSpec,
};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Minimum wage CSV
    pub wages_path: PathBuf,

    /// Country centre CSV
    pub centroids_path: PathBuf,

    /// Boundary dataset identifier or GeoJSON path
    pub boundaries_source: String,

    /// Period kept from the wage table, e.g. "2020S2"
    pub period: String,

    /// Continent drawn on the base map
    pub continent: String,

    /// Countries drawn regardless of continent
    pub extra_countries: Vec<String>,

    pub theme: ThemeName,

    /// Title font
    pub font_family: String,

    /// Value label font
    pub label_font_family: String,

    pub figure: FigureSize,

    /// Palette name from palettes.json
    pub palette: String,

    /// Fixed color domain; values outside clamp to the end colors
    pub color_min: f64,
    pub color_max: f64,

    pub legend: LegendSpec,

    pub labels: LabelStyle,

    /// Halo width around labels and title, in points
    pub label_stroke_width: f64,

    /// Title text, anchor in map units and size in points
    pub title: TitleSpec,

    /// View window padding around the label centres, in metres
    pub padding: Padding,

    pub show_markers: bool,

    pub output_path: PathBuf,
}

impl MapConfig {
    /// Create config from a property reader
    ///
    /// Invalid user values were already replaced by defaults (with a warning)
    /// inside the reader.
    pub fn from_properties(props: &PropertyReader) -> Self {
        // Theme: validated enum
        let theme = ThemeName::parse(&props.get_enum("theme"));

        let figure = FigureSize {
            width_in: props.get_f64_in_range("figure.width", 1.0, 100.0),
            height_in: props.get_f64_in_range("figure.height", 1.0, 100.0),
            dpi: props.get_f64_in_range("figure.dpi", 10.0, 1200.0),
        };

        let legend = LegendSpec {
            shrink: props.get_f64_in_range("legend.shrink", 0.01, 1.0),
            aspect: props.get_f64_in_range("legend.aspect", 1.0, 1000.0),
        };

        let labels = LabelStyle {
            size_exponent: props.get_f64_in_range("label.size.exponent", 0.0, 2.0),
            rotation_divisor: props.get_f64("label.rotation.divisor"),
        };

        let title = TitleSpec {
            text: props.get_string("title.text"),
            x: props.get_f64("title.x"),
            y: props.get_f64("title.y"),
            size_pt: props.get_f64_in_range("title.size", 1.0, 200.0),
        };

        let padding = Padding {
            left: props.get_f64("view.pad.left"),
            right: props.get_f64("view.pad.right"),
            bottom: props.get_f64("view.pad.bottom"),
            top: props.get_f64("view.pad.top"),
        };

        Self {
            wages_path: PathBuf::from(props.get_string("input.wages")),
            centroids_path: PathBuf::from(props.get_string("input.centroids")),
            boundaries_source: props.get_string("input.boundaries"),
            period: props.get_string("wages.period"),
            continent: props.get_string("boundaries.continent"),
            extra_countries: props.get_list("boundaries.extra.countries"),
            theme,
            font_family: props.get_string("font.family"),
            label_font_family: props.get_string("label.font.family"),
            figure,
            palette: props.get_string("color.palette"),
            color_min: props.get_f64("color.min"),
            color_max: props.get_f64("color.max"),
            legend,
            labels,
            label_stroke_width: props.get_f64_in_range("label.stroke.width", 0.0, 20.0),
            title,
            padding,
            show_markers: props.get_bool("markers.show"),
            output_path: PathBuf::from(props.get_string("output.path")),
        }
    }

    /// Config with every property at its default
    pub fn defaults() -> Self {
        Self::from_properties(&PropertyReader::defaults())
    }

    /// Theme preset with the configured fonts and halo width
    pub fn to_theme(&self) -> Theme {
        Theme::from_name(self.theme).with_text(
            &self.font_family,
            &self.label_font_family,
            self.label_stroke_width,
        )
    }

    /// Fixed-domain color scale; fails for unknown palettes or an empty domain
    pub fn color_scale(&self) -> Result<ColorScale> {
        ColorScale::new(&self.palette, self.color_min, self.color_max)
    }

    pub fn render_settings(&self) -> Result<RenderSettings> {
        Ok(RenderSettings {
            figure: self.figure,
            theme: self.to_theme(),
            scale: self.color_scale()?,
            legend: self.legend,
            labels: self.labels,
            title: self.title.clone(),
            padding: self.padding,
            show_markers: self.show_markers,
        })
    }
}
