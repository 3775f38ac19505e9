//! Visible map window and map-to-pixel transform

use crate::data::error::{MapError, Result};
use geo::Point;

/// Metres added on each side of the label bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

/// Visible extent in map units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ViewWindow {
    /// Bounding box of `points` grown by `padding`
    pub fn from_points<I>(points: I, padding: Padding) -> Result<Self>
    where
        I: IntoIterator<Item = Point<f64>>,
    {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for p in points {
            let (x, y) = (p.x(), p.y());
            bounds = Some(match bounds {
                None => (x, x, y, y),
                Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
            });
        }

        let (x_min, x_max, y_min, y_max) = bounds.ok_or_else(|| {
            MapError::Render("no positioned labels to derive the view window from".to_string())
        })?;

        let window = Self {
            x_min: x_min - padding.left,
            x_max: x_max + padding.right,
            y_min: y_min - padding.bottom,
            y_max: y_max + padding.top,
        };

        if window.width() <= 0.0 || window.height() <= 0.0 {
            return Err(MapError::Render(format!(
                "degenerate view window {:?}",
                window
            )));
        }
        Ok(window)
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn contains(&self, point: Point<f64>) -> bool {
        (self.x_min..=self.x_max).contains(&point.x())
            && (self.y_min..=self.y_max).contains(&point.y())
    }
}

/// Axis-aligned rectangle in figure pixels (y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Equal-aspect mapping from a view window into a pixel panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelTransform {
    window: ViewWindow,
    /// Panel actually covered by the window (centered in the available area)
    pub panel: PixelRect,
    scale: f64,
}

impl PanelTransform {
    /// Fit `window` into `available`, keeping one map unit square
    pub fn fit(window: ViewWindow, available: PixelRect) -> Self {
        let scale = (available.width / window.width()).min(available.height / window.height());
        let width = window.width() * scale;
        let height = window.height() * scale;

        let panel = PixelRect {
            x: available.x + (available.width - width) / 2.0,
            y: available.y + (available.height - height) / 2.0,
            width,
            height,
        };

        Self {
            window,
            panel,
            scale,
        }
    }

    /// Map coordinates to figure pixels
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.panel.x + (x - self.window.x_min) * self.scale,
            self.panel.y + (self.window.y_max - y) * self.scale,
        )
    }

    /// Pixels per map unit
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn europe_padding() -> Padding {
        Padding {
            left: 0.5e6,
            right: 0.3e6,
            bottom: 0.5e6,
            top: 0.7e6,
        }
    }

    fn sample_points() -> Vec<Point<f64>> {
        vec![
            Point::new(3_700_000.0, 2_600_000.0),
            Point::new(4_400_000.0, 3_300_000.0),
            Point::new(5_100_000.0, 2_900_000.0),
        ]
    }

    #[test]
    fn test_window_padding_per_edge() {
        let window = ViewWindow::from_points(sample_points(), europe_padding()).unwrap();
        assert_eq!(window.x_min, 3_200_000.0);
        assert_eq!(window.x_max, 5_400_000.0);
        assert_eq!(window.y_min, 2_100_000.0);
        assert_eq!(window.y_max, 4_000_000.0);
    }

    #[test]
    fn test_every_point_inside_window() {
        let points = sample_points();
        let window = ViewWindow::from_points(points.clone(), europe_padding()).unwrap();
        for p in points {
            assert!(window.contains(p));
        }
        assert!(!window.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_no_points_is_error() {
        let result = ViewWindow::from_points(Vec::<Point<f64>>::new(), europe_padding());
        assert!(matches!(result, Err(MapError::Render(_))));
    }

    #[test]
    fn test_single_point_with_padding_is_valid() {
        let window =
            ViewWindow::from_points(vec![Point::new(1.0, 1.0)], europe_padding()).unwrap();
        assert_eq!(window.width(), 800_000.0);
        assert_eq!(window.height(), 1_200_000.0);
    }

    #[test]
    fn test_fit_keeps_aspect_and_centers() {
        let window = ViewWindow {
            x_min: 0.0,
            x_max: 200.0,
            y_min: 0.0,
            y_max: 100.0,
        };
        let available = PixelRect {
            x: 0.0,
            y: 0.0,
            width: 400.0,
            height: 400.0,
        };
        let t = PanelTransform::fit(window, available);
        assert_eq!(t.scale(), 2.0);
        assert_eq!(t.panel.height, 200.0);
        assert_eq!(t.panel.y, 100.0);

        // Top-left of the map is the top-left of the panel
        assert_eq!(t.to_pixel(0.0, 100.0), (0.0, 100.0));
        // Bottom-right
        assert_eq!(t.to_pixel(200.0, 0.0), (400.0, 300.0));
    }
}
