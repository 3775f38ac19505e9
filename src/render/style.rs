//! Figure styling
//!
//! A [`Theme`] fixes every paint decision that does not depend on data:
//! backgrounds, outline colors and widths, fonts and the text halo used for
//! labels over arbitrary fills.

/// Figure style presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    /// Solarized light figure with a light steel blue map panel
    #[default]
    SolarizeLight2,
    /// White figure and panel
    Classic,
    /// Dark figure and panel
    Dark,
}

impl ThemeName {
    /// Parse from string value
    ///
    /// Validation happens in PropertyReader::get_enum; unknown values map to
    /// the default.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "classic" => Self::Classic,
            "dark" => Self::Dark,
            _ => Self::SolarizeLight2,
        }
    }
}

/// Paint settings for one figure
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: ThemeName,
    /// Whole figure background
    pub figure_background: String,
    /// Map panel (sea) background
    pub panel_background: String,
    /// Fill of the base layer under the wage colors
    pub base_fill: String,
    pub base_edge_color: String,
    /// Outline width of the base layer, in points
    pub base_edge_width: f64,
    pub region_edge_color: String,
    /// Outline width of the wage regions, in points
    pub region_edge_width: f64,
    /// Title font
    pub font_family: String,
    /// Value label font
    pub label_font_family: String,
    pub text_color: String,
    /// Halo drawn behind labels and title
    pub stroke_color: String,
    /// Halo width, in points
    pub stroke_width: f64,
    /// Legend tick labels
    pub legend_text_color: String,
    pub marker_color: String,
}

impl Theme {
    /// Solarized light look with a light steel blue panel
    pub fn solarize_light2() -> Self {
        Self {
            name: ThemeName::SolarizeLight2,
            figure_background: "#fdf6e3".to_string(),
            panel_background: "#b0c4de".to_string(), // lightsteelblue
            base_fill: "#696969".to_string(),        // dimgray
            base_edge_color: "#000000".to_string(),
            base_edge_width: 0.2,
            region_edge_color: "#000000".to_string(),
            region_edge_width: 0.4,
            font_family: "Impact, fantasy".to_string(),
            label_font_family: "Arial, sans-serif".to_string(),
            text_color: "#ffffff".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_width: 2.0,
            legend_text_color: "#657b83".to_string(),
            marker_color: "#ff0000".to_string(),
        }
    }

    /// White background, black text on the legend
    pub fn classic() -> Self {
        Self {
            name: ThemeName::Classic,
            figure_background: "#ffffff".to_string(),
            panel_background: "#ffffff".to_string(),
            legend_text_color: "#000000".to_string(),
            ..Self::solarize_light2()
        }
    }

    /// Dark figure, light legend text
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,
            figure_background: "#1e1e1e".to_string(),
            panel_background: "#2b3a4a".to_string(),
            base_fill: "#4a4a4a".to_string(),
            legend_text_color: "#e0e0e0".to_string(),
            ..Self::solarize_light2()
        }
    }

    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::SolarizeLight2 => Self::solarize_light2(),
            ThemeName::Classic => Self::classic(),
            ThemeName::Dark => Self::dark(),
        }
    }

    /// Replace fonts and halo width, keeping the preset colors
    pub fn with_text(mut self, font_family: &str, label_font_family: &str, stroke_width: f64) -> Self {
        if !font_family.is_empty() {
            self.font_family = font_family.to_string();
        }
        if !label_font_family.is_empty() {
            self.label_font_family = label_font_family.to_string();
        }
        self.stroke_width = stroke_width;
        self
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::solarize_light2()
    }
}
