//! # Canvas
//!
//! The drawing primitive blocks and page painters paint onto. A canvas is an
//! ordered list of paint operations in page coordinates (origin top-left,
//! y growing downward). Order is significant: later operations paint over
//! earlier ones, and the PDF writer replays them exactly in sequence.

use crate::font::{FontContext, FontKey};
use crate::style::Color;

/// A single paint operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Filled axis-aligned rectangle.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
    },
    /// Rectangle with uniformly rounded corners, filled and/or stroked.
    RoundRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
    },
    /// Straight stroked line.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },
    /// Filled circle.
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Color,
    },
    /// A run of text in a single font, starting at `x` on `baseline`.
    Text {
        x: f64,
        baseline: f64,
        text: String,
        font: FontKey,
        font_size: f64,
        color: Color,
    },
}

/// An exclusively-owned, append-only list of paint operations.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    ops: Vec<DrawOp>,
}

impl Canvas {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Color) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn round_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
    ) {
        self.ops.push(DrawOp::RoundRect {
            x,
            y,
            width,
            height,
            radius,
            fill,
            stroke,
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color, width: f64) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Color) {
        self.ops.push(DrawOp::Circle { cx, cy, r, fill });
    }

    /// Draw a run of text. Empty strings paint nothing.
    pub fn text(
        &mut self,
        x: f64,
        baseline: f64,
        text: &str,
        font: &FontKey,
        font_size: f64,
        color: Color,
    ) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            x,
            baseline,
            text: text.to_string(),
            font: font.clone(),
            font_size,
            color,
        });
    }

    /// Draw text so that it ends at `right`.
    #[allow(clippy::too_many_arguments)]
    pub fn text_right(
        &mut self,
        fonts: &FontContext,
        right: f64,
        baseline: f64,
        text: &str,
        font: &FontKey,
        font_size: f64,
        color: Color,
    ) {
        let width = fonts.measure_string(text, font, font_size);
        self.text(right - width, baseline, text, font, font_size, color);
    }

    /// Draw text centered on `center_x`.
    #[allow(clippy::too_many_arguments)]
    pub fn text_centered(
        &mut self,
        fonts: &FontContext,
        center_x: f64,
        baseline: f64,
        text: &str,
        font: &FontKey,
        font_size: f64,
        color: Color,
    ) {
        let width = fonts.measure_string(text, font, font_size);
        self.text(center_x - width / 2.0, baseline, text, font, font_size, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_keep_paint_order() {
        let mut canvas = Canvas::new();
        canvas.fill_rect(0.0, 0.0, 10.0, 10.0, Color::BLACK);
        canvas.circle(5.0, 5.0, 2.0, Color::WHITE);
        assert!(matches!(canvas.ops()[0], DrawOp::Rect { .. }));
        assert!(matches!(canvas.ops()[1], DrawOp::Circle { .. }));
    }

    #[test]
    fn empty_text_paints_nothing() {
        let mut canvas = Canvas::new();
        canvas.text(0.0, 0.0, "", &FontKey::helvetica(), 10.0, Color::BLACK);
        assert!(canvas.is_empty());
    }

    #[test]
    fn right_aligned_text_ends_at_edge() {
        let fonts = FontContext::new();
        let font = FontKey::helvetica();
        let mut canvas = Canvas::new();
        canvas.text_right(&fonts, 100.0, 20.0, "12", &font, 10.0, Color::BLACK);
        match &canvas.ops()[0] {
            DrawOp::Text { x, .. } => {
                let w = fonts.measure_string("12", &font, 10.0);
                assert!((x + w - 100.0).abs() < 1e-9);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }
}
