//! Horizontal colorbar legend

use super::colors::ColorScale;
use super::viewport::PixelRect;

/// Number of color segments drawn along the bar
pub const LEGEND_SEGMENTS: usize = 128;

/// Preferred tick count along the bar
const TARGET_TICKS: usize = 7;

/// Laid out colorbar: bar rectangle, segment fills and tick positions
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub bar: PixelRect,
    /// (x, width, fill) per segment
    pub segments: Vec<(f64, f64, [u8; 3])>,
    /// (x, label) per tick
    pub ticks: Vec<(f64, String)>,
}

impl Legend {
    /// Lay out a horizontal bar `length` px long centered under `panel`
    ///
    /// Thickness is `length / aspect`. Segment x positions are proportional
    /// to value.
    pub fn layout(scale: &ColorScale, panel: &PixelRect, length: f64, aspect: f64, top: f64) -> Self {
        let thickness = length / aspect.max(1.0);
        let bar = PixelRect {
            x: panel.center_x() - length / 2.0,
            y: top,
            width: length,
            height: thickness,
        };

        let span = scale.max - scale.min;
        let seg_width = length / LEGEND_SEGMENTS as f64;
        let segments = (0..LEGEND_SEGMENTS)
            .map(|i| {
                // Sample the middle of each segment
                let value = scale.min + span * (i as f64 + 0.5) / LEGEND_SEGMENTS as f64;
                (bar.x + i as f64 * seg_width, seg_width, scale.color_for(value))
            })
            .collect();

        let ticks = nice_ticks(scale.min, scale.max, TARGET_TICKS)
            .into_iter()
            .map(|v| {
                let x = bar.x + (v - scale.min) / span * length;
                (x, format_tick(v))
            })
            .collect();

        Self {
            bar,
            segments,
            ticks,
        }
    }
}

/// Round tick values covering [min, max]
///
/// Step is the smallest of 1, 2, 2.5, 5 or 10 times a power of ten that
/// yields at most about `target` intervals.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(min < max) || target == 0 {
        return Vec::new();
    }

    let raw_step = (max - min) / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
