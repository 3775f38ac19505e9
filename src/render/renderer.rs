//! SVG map renderer
//!
//! Draws the finished figure in one pass, back to front:
//! 1. Figure and panel backgrounds
//! 2. Base outlines of every kept boundary (clipped to the panel)
//! 3. Wage regions colored by the scale (clipped)
//! 4. Optional centre markers (clipped)
//! 5. Value labels and title, unclipped, with a stroke halo
//! 6. Colorbar legend under the panel
//!
//! There are no axes. Sizes given in points are converted with the figure dpi.

use super::colors::ColorScale;
use super::legend::Legend;
use super::palettes::to_hex_color;
use super::style::Theme;
use super::viewport::{Padding, PanelTransform, PixelRect, ViewWindow};
use crate::data::error::{MapError, Result};
use crate::data::{BoundaryLayer, ChoroplethLayer, LabelLayer};
use geo::{LineString, MultiPolygon};
use svg::node::element::{Circle, ClipPath, Definitions, Group, Path, Rectangle, Text};
use svg::Document;
use tracing::{debug, info};

const CLIP_ID: &str = "map-panel";
const POINTS_PER_INCH: f64 = 72.0;

/// Outer margin as a fraction of the figure height
const MARGIN_FRACTION: f64 = 0.02;
/// Gap between panel and legend bar, in points
const LEGEND_GAP_PT: f64 = 6.0;
const LEGEND_TICK_SIZE_PT: f64 = 10.0;
const LEGEND_TICK_LENGTH_PT: f64 = 3.5;
const MARKER_RADIUS_PT: f64 = 1.5;

/// Figure size in inches plus resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: f64,
}

impl FigureSize {
    pub fn width_px(&self) -> f64 {
        self.width_in * self.dpi
    }

    pub fn height_px(&self) -> f64 {
        self.height_in * self.dpi
    }

    /// Typographic points to pixels
    pub fn pt_to_px(&self, pt: f64) -> f64 {
        pt * self.dpi / POINTS_PER_INCH
    }
}

/// How wage labels are sized and tilted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    /// Font size in points is `value ^ size_exponent`
    pub size_exponent: f64,
    /// Rotation in degrees (counter-clockwise) is `longitude / rotation_divisor`
    pub rotation_divisor: f64,
}

impl LabelStyle {
    pub fn font_size_pt(&self, value: i64) -> f64 {
        (value.max(0) as f64).powf(self.size_exponent)
    }

    pub fn rotation_deg(&self, longitude: f64) -> f64 {
        if self.rotation_divisor == 0.0 {
            0.0
        } else {
            longitude / self.rotation_divisor
        }
    }
}

/// Title text anchored at a map coordinate
#[derive(Debug, Clone, PartialEq)]
pub struct TitleSpec {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size_pt: f64,
}

/// Colorbar proportions relative to the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendSpec {
    /// Bar length as a fraction of the panel width
    pub shrink: f64,
    /// Length over thickness
    pub aspect: f64,
}

/// Everything the renderer needs besides the layers
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub figure: FigureSize,
    pub theme: Theme,
    pub scale: ColorScale,
    pub legend: LegendSpec,
    pub labels: LabelStyle,
    pub title: TitleSpec,
    pub padding: Padding,
    pub show_markers: bool,
}

/// A rendered figure
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub svg: String,
    pub width: f64,
    pub height: f64,
    pub window: ViewWindow,
    pub n_regions: usize,
    pub n_labels: usize,
}

pub struct MapRenderer {
    settings: RenderSettings,
}

impl MapRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    /// Render base outlines, wage regions and labels into an SVG document
    ///
    /// All three layers must share a CRS. The view window is derived from the
    /// positioned labels, so at least one label needs a position.
    pub fn render(
        &self,
        base: &BoundaryLayer,
        regions: &ChoroplethLayer,
        labels: &LabelLayer,
    ) -> Result<RenderedMap> {
        if base.crs != regions.crs || labels.crs != regions.crs {
            return Err(MapError::Render(format!(
                "layers in mixed systems: base {}, regions {}, labels {}",
                base.crs, regions.crs, labels.crs
            )));
        }

        let s = &self.settings;
        let width = s.figure.width_px();
        let height = s.figure.height_px();
        if !(width > 0.0 && height > 0.0) {
            return Err(MapError::Render(format!(
                "figure has no area: {}x{} px",
                width, height
            )));
        }

        let window = ViewWindow::from_points(labels.positioned().map(|(_, p)| p), s.padding)?;
        let transform = PanelTransform::fit(window, self.available_panel(width, height));
        let panel = transform.panel;
        debug!(
            "View window x [{:.0}, {:.0}] y [{:.0}, {:.0}] -> panel {:.1}x{:.1} px",
            window.x_min, window.x_max, window.y_min, window.y_max, panel.width, panel.height
        );

        let mut document = Document::new()
            .set("width", fmt_px(width))
            .set("height", fmt_px(height))
            .set("viewBox", format!("0 0 {} {}", fmt_px(width), fmt_px(height)))
            .add(
                Definitions::new().add(
                    ClipPath::new()
                        .set("id", CLIP_ID)
                        .add(rect(&panel)),
                ),
            )
            .add(
                rect(&PixelRect {
                    x: 0.0,
                    y: 0.0,
                    width,
                    height,
                })
                .set("fill", s.theme.figure_background.as_str()),
            )
            .add(rect(&panel).set("fill", s.theme.panel_background.as_str()));

        // Map layers
        let mut map = Group::new()
            .set("id", "map")
            .set("clip-path", format!("url(#{})", CLIP_ID));
        map = map.add(self.base_group(base, &transform));
        let (region_group, n_regions) = self.region_group(regions, &transform);
        map = map.add(region_group);
        if s.show_markers {
            map = map.add(self.marker_group(labels, &transform));
        }
        document = document.add(map);

        // Text
        let (label_group, n_labels) = self.label_group(labels, &transform);
        document = document.add(label_group);
        document = document.add(self.title_text(&s.title, &transform));

        let legend_length = s.legend.shrink * panel.width;
        let legend = Legend::layout(
            &s.scale,
            &panel,
            legend_length,
            s.legend.aspect,
            panel.bottom() + s.figure.pt_to_px(LEGEND_GAP_PT),
        );
        document = document.add(self.legend_group(&legend));

        info!(
            "Rendered {}x{} px map: {} regions, {} labels",
            width, height, n_regions, n_labels
        );
        Ok(RenderedMap {
            svg: document.to_string(),
            width,
            height,
            window,
            n_regions,
            n_labels,
        })
    }

    /// Area left for the panel after margins and the legend strip
    fn available_panel(&self, width: f64, height: f64) -> PixelRect {
        let s = &self.settings;
        let margin = height * MARGIN_FRACTION;
        let inner_width = (width - 2.0 * margin).max(1.0);
        let max_thickness = s.legend.shrink * inner_width / s.legend.aspect.max(1.0);
        let legend_strip = s.figure.pt_to_px(LEGEND_GAP_PT)
            + max_thickness
            + s.figure.pt_to_px(LEGEND_TICK_LENGTH_PT)
            + 1.5 * s.figure.pt_to_px(LEGEND_TICK_SIZE_PT);

        PixelRect {
            x: margin,
            y: margin,
            width: inner_width,
            height: (height - 2.0 * margin - legend_strip).max(1.0),
        }
    }

    fn base_group(&self, base: &BoundaryLayer, transform: &PanelTransform) -> Group {
        let theme = &self.settings.theme;
        let mut group = Group::new()
            .set("id", "base")
            .set("fill", theme.base_fill.as_str())
            .set("stroke", theme.base_edge_color.as_str())
            .set(
                "stroke-width",
                fmt_px(self.settings.figure.pt_to_px(theme.base_edge_width)),
            );

        for row in &base.rows {
            if let Some(d) = multipolygon_path(&row.geometry, transform) {
                group = group.add(
                    Path::new()
                        .set("d", d)
                        .set("fill-rule", "evenodd")
                        .set("data-name", row.country_name.as_str()),
                );
            }
        }
        group
    }

    fn region_group(&self, regions: &ChoroplethLayer, transform: &PanelTransform) -> (Group, usize) {
        let theme = &self.settings.theme;
        let mut group = Group::new()
            .set("id", "regions")
            .set("stroke", theme.region_edge_color.as_str())
            .set(
                "stroke-width",
                fmt_px(self.settings.figure.pt_to_px(theme.region_edge_width)),
            );

        let mut count = 0;
        for region in &regions.regions {
            let fill = to_hex_color(self.settings.scale.color_for(region.wage.value as f64));
            if let Some(d) = multipolygon_path(&region.geometry, transform) {
                group = group.add(
                    Path::new()
                        .set("d", d)
                        .set("fill", fill)
                        .set("fill-rule", "evenodd")
                        .set("data-name", region.country_name.as_str())
                        .set("data-value", region.wage.value.to_string()),
                );
                count += 1;
            }
        }
        (group, count)
    }

    fn marker_group(&self, labels: &LabelLayer, transform: &PanelTransform) -> Group {
        let radius = fmt_px(self.settings.figure.pt_to_px(MARKER_RADIUS_PT));
        let mut group = Group::new()
            .set("id", "markers")
            .set("fill", self.settings.theme.marker_color.as_str());

        for (_, position) in labels.positioned() {
            let (x, y) = transform.to_pixel(position.x(), position.y());
            group = group.add(
                Circle::new()
                    .set("cx", fmt_px(x))
                    .set("cy", fmt_px(y))
                    .set("r", radius.as_str()),
            );
        }
        group
    }

    /// Shared attributes of halo text
    fn halo_group(&self, id: &str, font_family: &str) -> Group {
        let theme = &self.settings.theme;
        Group::new()
            .set("id", id)
            .set("font-family", font_family)
            .set("fill", theme.text_color.as_str())
            .set("stroke", theme.stroke_color.as_str())
            .set(
                "stroke-width",
                fmt_px(self.settings.figure.pt_to_px(theme.stroke_width)),
            )
            .set("stroke-linejoin", "round")
            .set("paint-order", "stroke")
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
    }

    fn label_group(&self, labels: &LabelLayer, transform: &PanelTransform) -> (Group, usize) {
        let s = &self.settings;
        let mut group = self
            .halo_group("labels", &s.theme.label_font_family)
            .set("font-weight", "900")
            .set("font-variant", "small-caps");

        let mut count = 0;
        for (point, position) in labels.positioned() {
            let (x, y) = transform.to_pixel(position.x(), position.y());
            let size = s.figure.pt_to_px(s.labels.font_size_pt(point.wage.value));
            let angle = point
                .longitude
                .map(|lon| s.labels.rotation_deg(lon))
                .unwrap_or(0.0);

            group = group.add(
                Text::new(point.wage.value.to_string())
                    .set("x", fmt_px(x))
                    .set("y", fmt_px(y))
                    .set("font-size", fmt_px(size))
                    // SVG angles are clockwise
                    .set(
                        "transform",
                        format!("rotate({} {} {})", fmt_deg(-angle), fmt_px(x), fmt_px(y)),
                    ),
            );
            count += 1;
        }
        (group, count)
    }

    fn title_text(&self, title: &TitleSpec, transform: &PanelTransform) -> Group {
        let s = &self.settings;
        let (x, y) = transform.to_pixel(title.x, title.y);
        self.halo_group("title", &s.theme.font_family).add(
            Text::new(title.text.as_str())
                .set("x", fmt_px(x))
                .set("y", fmt_px(y))
                .set("font-size", fmt_px(s.figure.pt_to_px(title.size_pt))),
        )
    }

    fn legend_group(&self, legend: &Legend) -> Group {
        let s = &self.settings;
        let tick_length = s.figure.pt_to_px(LEGEND_TICK_LENGTH_PT);
        let tick_size = s.figure.pt_to_px(LEGEND_TICK_SIZE_PT);
        let bar = &legend.bar;

        let mut group = Group::new().set("id", "legend");
        for (x, w, rgb) in &legend.segments {
            // Overlap by a hair so antialiasing leaves no seams
            group = group.add(
                rect(&PixelRect {
                    x: *x,
                    y: bar.y,
                    width: w + 0.5,
                    height: bar.height,
                })
                .set("fill", to_hex_color(*rgb)),
            );
        }
        group = group.add(
            rect(bar)
                .set("fill", "none")
                .set("stroke", s.theme.legend_text_color.as_str())
                .set("stroke-width", fmt_px(s.figure.pt_to_px(0.8))),
        );

        let mut ticks = Group::new()
            .set("stroke", s.theme.legend_text_color.as_str())
            .set("stroke-width", fmt_px(s.figure.pt_to_px(0.8)));
        let mut tick_labels = Group::new()
            .set("fill", s.theme.legend_text_color.as_str())
            .set("font-family", s.theme.font_family.as_str())
            .set("font-size", fmt_px(tick_size))
            .set("text-anchor", "middle")
            .set("dominant-baseline", "hanging");

        for (x, label) in &legend.ticks {
            ticks = ticks.add(Path::new().set(
                "d",
                format!(
                    "M{},{} L{},{}",
                    fmt_px(*x),
                    fmt_px(bar.bottom()),
                    fmt_px(*x),
                    fmt_px(bar.bottom() + tick_length)
                ),
            ));
            tick_labels = tick_labels.add(
                Text::new(label.as_str())
                    .set("x", fmt_px(*x))
                    .set("y", fmt_px(bar.bottom() + tick_length * 1.5)),
            );
        }
        group.add(ticks).add(tick_labels)
    }
}

fn rect(r: &PixelRect) -> Rectangle {
    Rectangle::new()
        .set("x", fmt_px(r.x))
        .set("y", fmt_px(r.y))
        .set("width", fmt_px(r.width))
        .set("height", fmt_px(r.height))
}

/// SVG path data for every ring of a multipolygon, None when nothing is drawable
fn multipolygon_path(geometry: &MultiPolygon<f64>, transform: &PanelTransform) -> Option<String> {
    let mut d = String::new();
    for polygon in &geometry.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            append_ring(&mut d, ring, transform);
        }
    }
    if d.is_empty() {
        None
    } else {
        Some(d)
    }
}

fn append_ring(d: &mut String, ring: &LineString<f64>, transform: &PanelTransform) {
    if ring.0.len() < 3 {
        return;
    }
    for (i, c) in ring.0.iter().enumerate() {
        let (x, y) = transform.to_pixel(c.x, c.y);
        let cmd = if i == 0 { 'M' } else { 'L' };
        if !d.is_empty() && i == 0 {
            d.push(' ');
        }
        d.push_str(&format!("{}{},{}", cmd, fmt_px(x), fmt_px(y)));
    }
    d.push('Z');
}

fn fmt_px(v: f64) -> String {
    format!("{:.2}", v)
}

fn fmt_deg(v: f64) -> String {
    format!("{:.3}", v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::data::boundaries::tests::sample_world_geojson;
    use crate::data::join::{attach_centroids, merge_boundaries};
    use crate::data::{CountryCentroid, Crs, WageRecord, WageTable};

    fn wages() -> WageTable {
        let record = |name: &str, value: i64| WageRecord {
            name: name.to_string(),
            period: "2020S2".to_string(),
            value,
        };
        WageTable {
            records: vec![
                record("Czechia", 2500),
                record("France", 1539),
                record("Germany", 1584),
            ],
        }
    }

    fn centroids() -> Vec<CountryCentroid> {
        let centroid = |name: &str, longitude: f64, latitude: f64| CountryCentroid {
            name: name.to_string(),
            longitude,
            latitude,
        };
        vec![
            centroid("France", 2.0, 46.0),
            centroid("Germany", 10.0, 51.0),
            centroid("Czechia", 15.0, 50.0),
        ]
    }

    fn settings() -> RenderSettings {
        MapConfig::defaults().render_settings().unwrap()
    }

    fn layers() -> (BoundaryLayer, ChoroplethLayer, LabelLayer) {
        let base = BoundaryLayer::from_geojson_str(&sample_world_geojson())
            .unwrap()
            .to_crs(Crs::EtrsLaea)
            .unwrap()
            .filter_region("Europe", &["Turkey".to_string()]);
        let table = wages();
        let regions = merge_boundaries(&base, &table);
        let labels = attach_centroids(&table, &centroids())
            .to_crs(Crs::EtrsLaea)
            .unwrap();
        (base, regions, labels)
    }

    #[test]
    fn test_label_style() {
        let style = LabelStyle {
            size_exponent: 0.35,
            rotation_divisor: 4.0,
        };
        assert!((style.font_size_pt(1539) - 1539f64.powf(0.35)).abs() < 1e-12);
        assert_eq!(style.rotation_deg(10.0), 2.5);
        assert_eq!(style.font_size_pt(-5), 0.0);
    }

    #[test]
    fn test_figure_size() {
        let figure = FigureSize {
            width_in: 16.0,
            height_in: 9.0,
            dpi: 100.0,
        };
        assert_eq!(figure.width_px(), 1600.0);
        assert_eq!(figure.height_px(), 900.0);
        assert_eq!(figure.pt_to_px(72.0), 100.0);
    }

    #[test]
    fn test_render_document() {
        let (base, regions, labels) = layers();
        let rendered = MapRenderer::new(settings())
            .render(&base, &regions, &labels)
            .unwrap();

        assert_eq!(rendered.width, 1600.0);
        assert_eq!(rendered.n_regions, 3);
        assert_eq!(rendered.n_labels, 3);
        assert!(rendered.svg.contains("<svg"));
        assert!(rendered.svg.contains("clipPath"));
        assert!(rendered.svg.contains("Minimum wages (Euro / month)"));
        assert_eq!(rendered.svg.matches("<text").count(), 3 + 1 + 7);
        assert!(rendered.svg.contains("1539"));
        // France at 2E tilts half a degree counter-clockwise
        assert!(rendered.svg.contains("rotate(-0.500 "));
        // Czechia at 2500 clamps to the dark blue end
        assert!(rendered.svg.contains("#053061"));
        // No markers unless asked for
        assert!(!rendered.svg.contains("<circle"));
    }

    #[test]
    fn test_centres_inside_window() {
        let (base, regions, labels) = layers();
        let rendered = MapRenderer::new(settings())
            .render(&base, &regions, &labels)
            .unwrap();
        for (_, position) in labels.positioned() {
            assert!(rendered.window.contains(position));
        }
    }

    #[test]
    fn test_markers_drawn_when_enabled() {
        let (base, regions, labels) = layers();
        let mut settings = settings();
        settings.show_markers = true;
        let rendered = MapRenderer::new(settings)
            .render(&base, &regions, &labels)
            .unwrap();
        assert_eq!(rendered.svg.matches("<circle").count(), 3);
    }

    #[test]
    fn test_mixed_crs_rejected() {
        let (base, regions, _) = layers();
        let geographic = attach_centroids(&wages(), &centroids());
        let result = MapRenderer::new(settings()).render(&base, &regions, &geographic);
        assert!(matches!(result, Err(MapError::Render(_))));
    }

    #[test]
    fn test_no_positioned_labels_is_error() {
        let (base, regions, _) = layers();
        let labels = attach_centroids(&wages(), &[])
            .to_crs(Crs::EtrsLaea)
            .unwrap();
        let result = MapRenderer::new(settings()).render(&base, &regions, &labels);
        assert!(matches!(result, Err(MapError::Render(_))));
    }

    #[test]
    fn test_path_data_closes_rings() {
        let (base, _, _) = layers();
        let window = ViewWindow {
            x_min: 0.0,
            x_max: 8.0e6,
            y_min: 0.0,
            y_max: 6.0e6,
        };
        let transform = PanelTransform::fit(
            window,
            PixelRect {
                x: 0.0,
                y: 0.0,
                width: 800.0,
                height: 600.0,
            },
        );
        let d = multipolygon_path(&base.rows[0].geometry, &transform).unwrap();
        assert!(d.starts_with('M'));
        assert!(d.ends_with('Z'));
        assert!(multipolygon_path(&MultiPolygon(vec![]), &transform).is_none());
    }
}
