//! # Blocks
//!
//! The closed set of things that flow onto pages. Every block follows a
//! two-pass protocol: `measure` against an available width returns the size
//! it needs, then `draw` paints it at a committed origin with that same width.
//!
//! Measurement is pure per width. Text-bearing blocks cache their line
//! breaks for the last measured width, so the compositor can measure
//! speculatively without paying for reflow twice, and `draw` always paints
//! exactly the lines that were measured.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use super::LayoutContext;
use crate::canvas::Canvas;
use crate::gradient::paint_strip;
use crate::style::{Align, Color, FontRole, ParagraphStyle};
use crate::text::markup::parse_spans;
use crate::text::{baseline_offset, styled_chars, RunBrokenLine};

/// Smallest width text is ever reflowed at.
pub const MIN_INNER_WIDTH: f64 = 1.0;

/// Width and height a block occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// How wide a gradient bar is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarWidth {
    /// The full available width.
    Full,
    /// A fixed width, capped to the available width.
    Fixed(f64),
}

/// A unit of content placed into the flow.
#[derive(Debug, Clone)]
pub enum Block {
    /// Fixed vertical gap.
    Spacer(f64),
    /// Short colored bar introducing a subsection.
    AccentLine { color: Color },
    /// Horizontal strip of the brand gradient.
    GradientBar { width: BarWidth, height: f64 },
    Paragraph(Paragraph),
    Callout(CalloutBox),
    Card(Card),
    DualColumn(DualColumnList),
    /// Close the current page; the next block starts a fresh one.
    PageBreak,
    /// Pages opened from here on use this template.
    TemplateSwitch(String),
}

impl Block {
    pub fn paragraph(markup: impl Into<String>, style: ParagraphStyle) -> Self {
        Block::Paragraph(Paragraph::new(markup, style))
    }

    pub fn callout(markup: impl Into<String>, style: ParagraphStyle, accent: Color) -> Self {
        Block::Callout(CalloutBox::new(markup, style, accent))
    }

    pub fn switch_to(template: &str) -> Self {
        Block::TemplateSwitch(template.to_string())
    }

    /// Short name used in placement records and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Spacer(_) => "spacer",
            Block::AccentLine { .. } => "accent-line",
            Block::GradientBar { .. } => "gradient-bar",
            Block::Paragraph(_) => "paragraph",
            Block::Callout(_) => "callout",
            Block::Card(_) => "card",
            Block::DualColumn(_) => "dual-column",
            Block::PageBreak => "page-break",
            Block::TemplateSwitch(_) => "template-switch",
        }
    }

    /// Size this block needs at `available_width`.
    pub fn measure(&self, ctx: &LayoutContext, available_width: f64) -> Size {
        let m = &ctx.theme.metrics;
        match self {
            Block::Spacer(h) => Size::new(0.0, h.max(0.0)),
            Block::AccentLine { .. } => Size::new(m.accent_line_width, m.accent_line_box),
            Block::GradientBar { width, height } => {
                let w = match width {
                    BarWidth::Full => available_width,
                    BarWidth::Fixed(w) => w.min(available_width),
                };
                Size::new(w.max(0.0), *height)
            }
            Block::Paragraph(p) => p.measure(ctx, available_width),
            Block::Callout(c) => c.measure(ctx, available_width),
            Block::Card(c) => c.measure(ctx, available_width),
            Block::DualColumn(d) => d.measure(ctx, available_width),
            Block::PageBreak | Block::TemplateSwitch(_) => Size::zero(),
        }
    }

    /// Paint at top-left `(x, y)`. `width` must be a width this block was
    /// measured at.
    pub fn draw(&self, ctx: &LayoutContext, canvas: &mut Canvas, x: f64, y: f64, width: f64) {
        let m = &ctx.theme.metrics;
        match self {
            Block::Spacer(_) | Block::PageBreak | Block::TemplateSwitch(_) => {}
            Block::AccentLine { color } => {
                canvas.fill_rect(
                    x,
                    y + m.accent_line_offset,
                    m.accent_line_width,
                    m.accent_line_height,
                    *color,
                );
            }
            Block::GradientBar { height, .. } => {
                let size = self.measure(ctx, width);
                let g = &ctx.theme.gradient;
                paint_strip(canvas, &g.stops, x, y, size.width, *height, g.bar_steps, g.overlap);
            }
            Block::Paragraph(p) => p.draw(ctx, canvas, x, y, width),
            Block::Callout(c) => c.draw(ctx, canvas, x, y, width),
            Block::Card(c) => c.draw(ctx, canvas, x, y, width),
            Block::DualColumn(d) => d.draw(ctx, canvas, x, y, width),
        }
    }
}

#[derive(Debug, Clone)]
struct MeasuredText {
    width: f64,
    lines: Rc<Vec<RunBrokenLine>>,
}

/// A run of rich-text markup set in one style.
#[derive(Debug, Clone)]
pub struct Paragraph {
    markup: String,
    style: ParagraphStyle,
    cache: RefCell<Option<MeasuredText>>,
}

impl Paragraph {
    pub fn new(markup: impl Into<String>, style: ParagraphStyle) -> Self {
        Self {
            markup: markup.into(),
            style,
            cache: RefCell::new(None),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn style(&self) -> &ParagraphStyle {
        &self.style
    }

    fn inner_width(&self, available_width: f64) -> f64 {
        (available_width - self.style.left_indent).max(MIN_INNER_WIDTH)
    }

    fn lines(&self, ctx: &LayoutContext, available_width: f64) -> Rc<Vec<RunBrokenLine>> {
        if let Some(cached) = self.cache.borrow().as_ref() {
            if cached.width == available_width {
                return Rc::clone(&cached.lines);
            }
        }

        let spans = parse_spans(&self.markup);
        let base = ctx.fonts.key(self.style.role);
        let chars = styled_chars(&spans, &base, self.style.font_size, self.style.color);
        let lines = Rc::new(ctx.text.break_runs_into_lines(
            ctx.fonts,
            &chars,
            self.inner_width(available_width),
        ));
        *self.cache.borrow_mut() = Some(MeasuredText {
            width: available_width,
            lines: Rc::clone(&lines),
        });
        lines
    }

    /// Empty markup measures to zero height, spacing included.
    pub fn measure(&self, ctx: &LayoutContext, available_width: f64) -> Size {
        let lines = self.lines(ctx, available_width);
        if lines.is_empty() {
            return Size::new(available_width, 0.0);
        }
        let s = &self.style;
        let height = s.space_before + lines.len() as f64 * s.leading + s.space_after;
        Size::new(available_width, height)
    }

    pub fn draw(&self, ctx: &LayoutContext, canvas: &mut Canvas, x: f64, y: f64, width: f64) {
        let lines = self.lines(ctx, width);
        let s = &self.style;
        let inner = self.inner_width(width);
        let left = x + s.left_indent;
        let mut line_top = y + s.space_before;

        for line in lines.iter() {
            let baseline = line_top + baseline_offset(s.leading, s.font_size);
            let slack = (inner - line.width).max(0.0);
            match s.align {
                Align::Justify if !line.hard_end => {
                    draw_justified(canvas, line, left, baseline, slack);
                }
                Align::Center => draw_runs(canvas, line, left + slack / 2.0, baseline),
                Align::Right => draw_runs(canvas, line, left + slack, baseline),
                _ => draw_runs(canvas, line, left, baseline),
            }
            line_top += s.leading;
        }
    }
}

/// Emit one text op per run of characters sharing a font.
fn draw_runs(canvas: &mut Canvas, line: &RunBrokenLine, left: f64, baseline: f64) {
    let end = trimmed_len(line);
    let mut start = 0;
    while start < end {
        let first = &line.chars[start];
        let mut stop = start + 1;
        while stop < end && line.chars[stop].font == first.font && line.chars[stop].color == first.color
        {
            stop += 1;
        }
        let text: String = line.chars[start..stop].iter().map(|c| c.ch).collect();
        canvas.text(
            left + line.char_positions[start],
            baseline,
            &text,
            &first.font,
            first.font_size,
            first.color,
        );
        start = stop;
    }
}

/// Spread `slack` over the line's interior spaces, emitting each word
/// segment at its shifted position.
fn draw_justified(canvas: &mut Canvas, line: &RunBrokenLine, left: f64, baseline: f64, slack: f64) {
    let end = trimmed_len(line);
    let gaps = line.chars[..end].iter().filter(|c| c.ch == ' ').count();
    if gaps == 0 {
        draw_runs(canvas, line, left, baseline);
        return;
    }
    let extra = slack / gaps as f64;

    let mut shift = 0.0;
    let mut start = 0;
    while start < end {
        if line.chars[start].ch == ' ' {
            shift += extra;
            start += 1;
            continue;
        }
        let first = &line.chars[start];
        let mut stop = start + 1;
        while stop < end
            && line.chars[stop].ch != ' '
            && line.chars[stop].font == first.font
            && line.chars[stop].color == first.color
        {
            stop += 1;
        }
        let text: String = line.chars[start..stop].iter().map(|c| c.ch).collect();
        canvas.text(
            left + line.char_positions[start] + shift,
            baseline,
            &text,
            &first.font,
            first.font_size,
            first.color,
        );
        start = stop;
    }
}

fn trimmed_len(line: &RunBrokenLine) -> usize {
    let mut end = line.chars.len();
    while end > 0 && line.chars[end - 1].ch == ' ' {
        end -= 1;
    }
    end
}

/// A paragraph on a tinted, rounded panel with an accent bar down its left edge.
#[derive(Debug, Clone)]
pub struct CalloutBox {
    text: Paragraph,
    accent: Color,
}

impl CalloutBox {
    pub fn new(markup: impl Into<String>, style: ParagraphStyle, accent: Color) -> Self {
        Self {
            text: Paragraph::new(markup, style),
            accent,
        }
    }

    pub fn accent(&self) -> Color {
        self.accent
    }

    pub fn markup(&self) -> &str {
        self.text.markup()
    }

    fn inner_width(&self, ctx: &LayoutContext, available_width: f64) -> f64 {
        (available_width - ctx.theme.metrics.callout_horizontal_padding).max(MIN_INNER_WIDTH)
    }

    pub fn measure(&self, ctx: &LayoutContext, available_width: f64) -> Size {
        let text = self.text.measure(ctx, self.inner_width(ctx, available_width));
        if text.height == 0.0 {
            return Size::new(available_width, 0.0);
        }
        let pad = ctx.theme.metrics.callout_vertical_padding;
        Size::new(available_width, text.height + 2.0 * pad)
    }

    pub fn draw(&self, ctx: &LayoutContext, canvas: &mut Canvas, x: f64, y: f64, width: f64) {
        let size = self.measure(ctx, width);
        if size.height == 0.0 {
            return;
        }
        let m = &ctx.theme.metrics;
        canvas.round_rect(
            x,
            y,
            width,
            size.height,
            m.corner_radius,
            Some(ctx.theme.palette.parchment),
            None,
        );
        canvas.fill_rect(x, y, m.callout_accent_width, size.height, self.accent);
        self.text.draw(
            ctx,
            canvas,
            x + m.callout_text_offset,
            y + m.callout_vertical_padding,
            self.inner_width(ctx, width),
        );
    }
}

/// A bordered white card: accent strip, title, body, divider, a small
/// label and an italic read-out.
#[derive(Debug, Clone)]
pub struct Card {
    title: Paragraph,
    body: Paragraph,
    label: String,
    read: Paragraph,
    accent: Color,
}

impl Card {
    pub fn new(
        title: Paragraph,
        body: Paragraph,
        label: impl Into<String>,
        read: Paragraph,
        accent: Color,
    ) -> Self {
        Self {
            title,
            body,
            label: label.into(),
            read,
            accent,
        }
    }

    fn inner_width(&self, ctx: &LayoutContext, available_width: f64) -> f64 {
        (available_width - 2.0 * ctx.theme.metrics.card_side_padding).max(MIN_INNER_WIDTH)
    }

    pub fn measure(&self, ctx: &LayoutContext, available_width: f64) -> Size {
        let m = &ctx.theme.metrics;
        let inner = self.inner_width(ctx, available_width);
        let title = self.title.measure(ctx, inner).height;
        let body = self.body.measure(ctx, inner).height;
        let read = self.read.measure(ctx, inner).height;
        let height = m.card_accent_height
            + m.card_top_padding
            + title
            + m.card_title_gap
            + body
            + m.card_body_gap
            + m.card_divider_height
            + m.card_divider_gap
            + m.card_label_gap
            + read
            + m.card_bottom_padding;
        Size::new(available_width, height)
    }

    pub fn draw(&self, ctx: &LayoutContext, canvas: &mut Canvas, x: f64, y: f64, width: f64) {
        let m = &ctx.theme.metrics;
        let p = &ctx.theme.palette;
        let size = self.measure(ctx, width);
        let inner = self.inner_width(ctx, width);
        let left = x + m.card_side_padding;

        canvas.round_rect(
            x,
            y,
            width,
            size.height,
            m.corner_radius,
            Some(p.white),
            Some((p.stone, m.card_border_width)),
        );
        canvas.fill_rect(x, y, width, m.card_accent_height, self.accent);

        let mut cursor = y + m.card_accent_height + m.card_top_padding;
        self.title.draw(ctx, canvas, left, cursor, inner);
        cursor += self.title.measure(ctx, inner).height + m.card_title_gap;

        self.body.draw(ctx, canvas, left, cursor, inner);
        cursor += self.body.measure(ctx, inner).height + m.card_body_gap;

        canvas.line(left, cursor, x + width - m.card_side_padding, cursor, p.stone, m.card_border_width);
        cursor += m.card_divider_height + m.card_divider_gap;

        let label_font = ctx.fonts.key(FontRole::SansBold);
        canvas.text(left, cursor, &self.label, &label_font, m.card_label_size, p.light_gray);
        cursor += m.card_label_gap;

        self.read.draw(ctx, canvas, left, cursor, inner);
    }
}

/// Two tinted columns of short marked items side by side.
#[derive(Debug, Clone)]
pub struct DualColumnList {
    pub left: Column,
    pub right: Column,
}

/// One column of a [`DualColumnList`].
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub marker: char,
    pub items: Vec<String>,
    pub color: Color,
    pub tint: Color,
}

impl DualColumnList {
    pub fn new(left: Column, right: Column) -> Self {
        Self { left, right }
    }

    /// Rows the list reserves: the longer column, never fewer than one.
    pub fn rows(&self) -> usize {
        self.left.items.len().max(self.right.items.len()).max(1)
    }

    pub fn column_width(&self, ctx: &LayoutContext, available_width: f64) -> f64 {
        ((available_width - ctx.theme.metrics.dual_column_gap) / 2.0).max(MIN_INNER_WIDTH)
    }

    pub fn measure(&self, ctx: &LayoutContext, available_width: f64) -> Size {
        let m = &ctx.theme.metrics;
        let height = m.dual_column_header + self.rows() as f64 * m.dual_column_row + m.dual_column_padding;
        Size::new(available_width, height)
    }

    pub fn draw(&self, ctx: &LayoutContext, canvas: &mut Canvas, x: f64, y: f64, width: f64) {
        let m = &ctx.theme.metrics;
        let size = self.measure(ctx, width);
        let col_w = self.column_width(ctx, width);
        let header_font = ctx.fonts.key(FontRole::SansBold);
        let item_font = ctx.fonts.key(FontRole::Sans);

        let columns = [(&self.left, x), (&self.right, x + col_w + m.dual_column_gap)];
        for (column, col_x) in columns {
            canvas.round_rect(col_x, y, col_w, size.height, m.corner_radius, Some(column.tint), None);
        }
        for (column, col_x) in columns {
            let text_x = col_x + m.dual_column_inset;
            canvas.text(
                text_x,
                y + m.dual_column_header_baseline,
                &column.header,
                &header_font,
                m.dual_column_header_size,
                column.color,
            );
            let mut baseline = y + m.dual_column_first_row_baseline;
            for item in &column.items {
                let line = truncate_chars(&format!("{}  {}", column.marker, item), m.dual_column_max_chars);
                canvas.text(text_x, baseline, &line, &item_font, m.dual_column_item_size, column.color);
                baseline += m.dual_column_row;
            }
        }
        debug!(
            "dual column: {} left, {} right, {} rows",
            self.left.items.len(),
            self.right.items.len(),
            self.rows()
        );
    }
}

/// The first `max` characters of `text`. Cuts on char boundaries, no ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;
    use crate::config::Theme;
    use crate::font::FontContext;
    use crate::layout::LayoutContext;

    fn body() -> ParagraphStyle {
        Theme::default().styles().body
    }

    fn long_text() -> String {
        "Measured once, placed once, drawn exactly where the compositor says. ".repeat(12)
    }

    fn column(header: &str, marker: char, n: usize) -> Column {
        Column {
            header: header.to_string(),
            marker,
            items: (0..n).map(|i| format!("signal {}", i)).collect(),
            color: Color::BLACK,
            tint: Color::WHITE,
        }
    }

    fn all_blocks(theme: &Theme) -> Vec<Block> {
        let styles = theme.styles();
        vec![
            Block::Spacer(12.0),
            Block::AccentLine { color: Color::BLACK },
            Block::GradientBar { width: BarWidth::Full, height: 6.0 },
            Block::GradientBar { width: BarWidth::Fixed(120.0), height: 3.0 },
            Block::paragraph(long_text(), styles.body),
            Block::callout(long_text(), styles.insight, Color::BLACK),
            Block::Card(Card::new(
                Paragraph::new("1. Open", styles.card_title),
                Paragraph::new(long_text(), styles.card_body),
                "THE READ",
                Paragraph::new("They lean in.", styles.card_read),
                Color::BLACK,
            )),
            Block::DualColumn(DualColumnList::new(column("WORKING", '✓', 3), column("STALLING", '✗', 7))),
            Block::PageBreak,
            Block::switch_to("content"),
        ]
    }

    #[test]
    fn measure_is_idempotent_for_every_variant() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        for block in all_blocks(&theme) {
            for width in [492.0, 200.0, 492.0] {
                let a = block.measure(&ctx, width);
                let b = block.measure(&ctx, width);
                assert_eq!(a, b, "{} changed between measures", block.kind());
            }
        }
    }

    #[test]
    fn narrower_width_makes_taller_paragraph() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let p = Paragraph::new(long_text(), body());
        let wide = p.measure(&ctx, 492.0).height;
        let narrow = p.measure(&ctx, 150.0).height;
        assert!(narrow > wide);
        // Re-measuring at the first width gives the first answer back.
        assert_eq!(p.measure(&ctx, 492.0).height, wide);
    }

    #[test]
    fn paragraph_height_is_lines_times_leading_plus_spacing() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let style = body().spaced(5.0, 7.0);
        let p = Paragraph::new("one line", style);
        assert_eq!(p.measure(&ctx, 492.0).height, 5.0 + style.leading + 7.0);
    }

    #[test]
    fn only_line_break_tags_add_lines() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let style = body();
        let one_line = style.space_before + style.leading + style.space_after;
        assert_eq!(Paragraph::new("one\ntwo", style).measure(&ctx, 492.0).height, one_line);
        assert_eq!(Paragraph::new("one\r\ntwo", style).measure(&ctx, 492.0).height, one_line);
        assert_eq!(
            Paragraph::new("one<br/>two", style).measure(&ctx, 492.0).height,
            one_line + style.leading
        );
    }

    #[test]
    fn empty_text_is_zero_height() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        assert_eq!(Block::paragraph("", body()).measure(&ctx, 300.0).height, 0.0);
        assert_eq!(
            Block::callout("", body(), Color::BLACK).measure(&ctx, 300.0).height,
            0.0
        );
    }

    #[test]
    fn tiny_width_is_clamped_not_negative() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let callout = Block::callout("squeezed", body(), Color::BLACK);
        let size = callout.measure(&ctx, 5.0);
        assert!(size.height > 0.0);
        assert!(size.height.is_finite());
    }

    #[test]
    fn callout_adds_vertical_padding() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let style = theme.styles().insight;
        let callout = CalloutBox::new("short insight", style, Color::BLACK);
        let size = callout.measure(&ctx, 492.0);
        assert_eq!(size.height, style.leading + 16.0);
    }

    #[test]
    fn callout_paints_panel_then_bar_then_text() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let accent = Color::hex("#E07A5F");
        let block = Block::callout("<b>Stalling:</b> looks away", theme.styles().insight, accent);
        let mut canvas = Canvas::new();
        block.measure(&ctx, 492.0);
        block.draw(&ctx, &mut canvas, 60.0, 100.0, 492.0);
        let ops = canvas.ops();
        assert!(matches!(ops[0], DrawOp::RoundRect { .. }));
        match &ops[1] {
            DrawOp::Rect { x, width, fill, .. } => {
                assert_eq!(*x, 60.0);
                assert_eq!(*width, 3.5);
                assert_eq!(*fill, accent);
            }
            other => panic!("expected accent bar, got {:?}", other),
        }
        match &ops[2] {
            DrawOp::Text { x, text, font, .. } => {
                assert_eq!(*x, 76.0);
                assert_eq!(text, "Stalling:");
                assert_eq!(font.weight, 700);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn card_height_sums_its_parts() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let styles = theme.styles();
        let card = Card::new(
            Paragraph::new("1. Open", styles.card_title),
            Paragraph::new("Ask about the school.", styles.card_body),
            "THE READ",
            Paragraph::new("Leans in.", styles.card_read),
            Color::BLACK,
        );
        let h = card.measure(&ctx, 492.0).height;
        let fixed = 3.0 + 14.0 + 8.0 + 12.0 + 1.0 + 12.0 + 12.0 + 14.0;
        assert_eq!(h, fixed + 15.0 + 13.0 + 13.0);
    }

    #[test]
    fn dual_column_height_follows_longer_column() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let list = DualColumnList::new(column("WORKING", '✓', 3), column("STALLING", '✗', 7));
        assert_eq!(list.measure(&ctx, 492.0).height, 28.0 + 7.0 * 16.0 + 12.0);

        let mut canvas = Canvas::new();
        list.draw(&ctx, &mut canvas, 0.0, 0.0, 492.0);
        let items: Vec<_> = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, text, .. } if text.starts_with('✓') || text.starts_with('✗') => {
                    Some((*x, text.clone()))
                }
                _ => None,
            })
            .collect();
        let left = items.iter().filter(|(x, _)| *x < 240.0).count();
        let right = items.iter().filter(|(x, _)| *x > 240.0).count();
        assert_eq!((left, right), (3, 7));
    }

    #[test]
    fn empty_dual_column_keeps_one_row() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let list = DualColumnList::new(column("WORKING", '✓', 0), column("STALLING", '✗', 0));
        assert_eq!(list.measure(&ctx, 492.0).height, 28.0 + 16.0 + 12.0);
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("✓  abcdef", 5), "✓  ab");
        assert_eq!(truncate_chars("short", 55), "short");
        assert_eq!(truncate_chars("ééééé", 2), "éé");
    }

    #[test]
    fn fixed_gradient_bar_is_capped_to_available_width() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let bar = Block::GradientBar { width: BarWidth::Fixed(120.0), height: 3.0 };
        assert_eq!(bar.measure(&ctx, 492.0), Size::new(120.0, 3.0));
        assert_eq!(bar.measure(&ctx, 80.0), Size::new(80.0, 3.0));
    }

    #[test]
    fn justified_lines_reach_the_right_edge() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let ctx = LayoutContext::new(&fonts, &theme);
        let style = body();
        let p = Paragraph::new(long_text(), style);
        let width = 300.0;
        p.measure(&ctx, width);
        let mut canvas = Canvas::new();
        p.draw(&ctx, &mut canvas, 0.0, 0.0, width);

        let first_baseline = match &canvas.ops()[0] {
            DrawOp::Text { baseline, .. } => *baseline,
            other => panic!("expected text, got {:?}", other),
        };
        let right_edge = canvas
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, baseline, text, font, font_size, .. } if *baseline == first_baseline => {
                    Some(x + fonts.measure_string(text, font, *font_size))
                }
                _ => None,
            })
            .fold(0.0, f64::max);
        assert!((right_edge - width).abs() < 1e-6, "first line ends at {}", right_edge);
    }
}
