//! # Gradient
//!
//! Piecewise-linear color interpolation over ordered stops, plus the strip
//! painter every gradient surface in the brief goes through (page bands,
//! gradient rules).

use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::style::Color;

/// A control point: `position` in [0, 1] and the color at that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f64,
    pub color: Color,
}

impl GradientStop {
    pub fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}

/// Check that `stops` run from 0 to 1 in non-decreasing order.
pub fn check_stops(stops: &[GradientStop]) -> Result<(), String> {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Err("gradient has no stops".to_string());
    };
    if let Some(bad) = stops.iter().find(|s| !(0.0..=1.0).contains(&s.position)) {
        return Err(format!("gradient stop position {} is outside [0, 1]", bad.position));
    }
    if let Some(pair) = stops.windows(2).find(|p| p[1].position < p[0].position) {
        return Err(format!(
            "gradient stops are out of order ({} after {})",
            pair[1].position, pair[0].position
        ));
    }
    if first.position != 0.0 || last.position != 1.0 {
        return Err(format!(
            "gradient stops span {}..{} instead of 0..1",
            first.position, last.position
        ));
    }
    Ok(())
}

/// Color at `t` along `stops` (sorted ascending by position).
///
/// The first stop pair bracketing `t` is blended channel by channel. A pair
/// with equal positions is a zero-width segment and yields its left color.
/// Past the last stop, or with no bracketing pair at all, the last stop's
/// color is returned unchanged. An empty stop list yields black.
pub fn interpolate(t: f64, stops: &[GradientStop]) -> Color {
    for pair in stops.windows(2) {
        let (s0, s1) = (pair[0], pair[1]);
        if s0.position <= t && t <= s1.position {
            let span = s1.position - s0.position;
            let frac = if span > 0.0 {
                (t - s0.position) / span
            } else {
                0.0
            };
            let (c0, c1) = (s0.color, s1.color);
            return Color::rgba(
                c0.r + (c1.r - c0.r) * frac,
                c0.g + (c1.g - c0.g) * frac,
                c0.b + (c1.b - c0.b) * frac,
                c0.a + (c1.a - c0.a) * frac,
            );
        }
    }
    stops.last().map(|s| s.color).unwrap_or(Color::BLACK)
}

/// Paint a horizontal gradient as `steps` adjoining filled rectangles.
///
/// Step `i` is colored at `t = i / steps`. Each rectangle is widened by
/// `overlap` so neighbours cover each other's edges.
#[allow(clippy::too_many_arguments)]
pub fn paint_strip(
    canvas: &mut Canvas,
    stops: &[GradientStop],
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    steps: usize,
    overlap: f64,
) {
    if steps == 0 || width <= 0.0 || height <= 0.0 {
        return;
    }
    let step_width = width / steps as f64;
    for i in 0..steps {
        let t = i as f64 / steps as f64;
        let color = interpolate(t, stops);
        canvas.fill_rect(x + i as f64 * step_width, y, step_width + overlap, height, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;

    fn brand_stops() -> Vec<GradientStop> {
        vec![
            GradientStop::new(0.0, Color::hex("#7B2D8E")),
            GradientStop::new(0.33, Color::hex("#2D6A4F")),
            GradientStop::new(0.66, Color::hex("#E07A5F")),
            GradientStop::new(1.0, Color::hex("#7B2D8E")),
        ]
    }

    fn channel_delta(a: Color, b: Color) -> f64 {
        (a.r - b.r).abs().max((a.g - b.g).abs()).max((a.b - b.b).abs())
    }

    #[test]
    fn brand_stops_are_valid() {
        assert_eq!(check_stops(&brand_stops()), Ok(()));
    }

    #[test]
    fn malformed_stops_are_rejected() {
        let c = Color::BLACK;
        let unsorted = [
            GradientStop::new(0.0, c),
            GradientStop::new(0.9, c),
            GradientStop::new(0.1, c),
            GradientStop::new(1.0, c),
        ];
        assert!(check_stops(&unsorted).unwrap_err().contains("out of order"));
        let outside = [GradientStop::new(0.0, c), GradientStop::new(3.0, c)];
        assert!(check_stops(&outside).unwrap_err().contains("outside"));
        let nan = [GradientStop::new(0.0, c), GradientStop::new(f64::NAN, c)];
        assert!(check_stops(&nan).is_err());
        let short = [GradientStop::new(0.0, c), GradientStop::new(0.5, c)];
        assert!(check_stops(&short).unwrap_err().contains("instead of 0..1"));
        assert!(check_stops(&[]).is_err());
    }

    #[test]
    fn endpoints_are_first_and_last_colors() {
        let stops = brand_stops();
        assert_eq!(interpolate(0.0, &stops), stops[0].color);
        assert_eq!(interpolate(1.0, &stops), stops[3].color);
    }

    #[test]
    fn midpoint_is_channel_average() {
        let stops = vec![
            GradientStop::new(0.0, Color::rgb(0.0, 0.0, 0.0)),
            GradientStop::new(1.0, Color::rgb(1.0, 0.5, 0.25)),
        ];
        let c = interpolate(0.5, &stops);
        assert!((c.r - 0.5).abs() < 1e-12);
        assert!((c.g - 0.25).abs() < 1e-12);
        assert!((c.b - 0.125).abs() < 1e-12);
    }

    #[test]
    fn past_the_end_returns_last_color() {
        let stops = brand_stops();
        assert_eq!(interpolate(1.5, &stops), stops[3].color);
        assert_eq!(interpolate(f64::INFINITY, &stops), stops[3].color);
    }

    #[test]
    fn duplicate_positions_use_zero_fraction() {
        let red = Color::rgb(1.0, 0.0, 0.0);
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let stops = vec![
            GradientStop::new(0.0, red),
            GradientStop::new(0.5, red),
            GradientStop::new(0.5, blue),
            GradientStop::new(1.0, blue),
        ];
        // 0.5 falls in the first segment, which ends at red.
        assert_eq!(interpolate(0.5, &stops), red);
        assert_eq!(interpolate(0.75, &stops), Color::rgb(0.0, 0.0, 1.0));
    }

    #[test]
    fn continuous_within_a_segment() {
        let stops = brand_stops();
        let t1 = 0.4;
        let base = interpolate(t1, &stops);
        let mut last = f64::MAX;
        for eps in [1e-1, 1e-2, 1e-3, 1e-4, 1e-6] {
            let d = channel_delta(base, interpolate(t1 + eps, &stops));
            assert!(d <= last);
            last = d;
        }
        assert!(last < 1e-5);
    }

    #[test]
    fn continuous_across_segment_boundaries() {
        let stops = brand_stops();
        for boundary in [0.33, 0.66] {
            let left = interpolate(boundary - 1e-9, &stops);
            let right = interpolate(boundary + 1e-9, &stops);
            assert!(channel_delta(left, right) < 1e-6);
        }
    }

    #[test]
    fn single_stop_is_constant() {
        let stops = vec![GradientStop::new(0.0, Color::WHITE)];
        assert_eq!(interpolate(0.3, &stops), Color::WHITE);
    }

    #[test]
    fn strip_paints_overlapping_steps() {
        let mut canvas = Canvas::new();
        paint_strip(&mut canvas, &brand_stops(), 10.0, 0.0, 100.0, 6.0, 4, 0.5);
        assert_eq!(canvas.ops().len(), 4);
        match (&canvas.ops()[0], &canvas.ops()[1]) {
            (
                DrawOp::Rect { x: x0, width: w0, .. },
                DrawOp::Rect { x: x1, .. },
            ) => {
                assert!((x0 - 10.0).abs() < 1e-9);
                assert!((w0 - 25.5).abs() < 1e-9);
                assert!(x0 + w0 > *x1);
            }
            _ => panic!("expected rects"),
        }
    }
}
