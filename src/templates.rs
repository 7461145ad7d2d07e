//! The page templates of a brief.
//!
//! - `cover`: dark page with the brand footer, not numbered.
//! - `divider`: dark page opening a section, not numbered.
//! - `content`: warm-white page with a footer label and page number.

use crate::canvas::Canvas;
use crate::config::{Brand, Gradient, PageGeometry, Palette, RenderConfig, Styles};
use crate::gradient::paint_strip;
use crate::layout::{Frame, PageInfo, PagePainter, PageTemplate, TemplateSet};
use crate::style::ParagraphStyle;

pub const COVER: &str = "cover";
pub const DIVIDER: &str = "divider";
pub const CONTENT: &str = "content";

/// Charcoal background with a gradient band along the top edge and two
/// soft glows.
pub struct DarkPainter {
    palette: Palette,
    gradient: Gradient,
    page: PageGeometry,
    footer: Option<CoverFooter>,
}

/// Two centered lines near the bottom of the cover.
struct CoverFooter {
    lines: [String; 2],
    style: ParagraphStyle,
}

impl PagePainter for DarkPainter {
    fn paint(&self, canvas: &mut Canvas, page: &PageInfo) {
        let (w, h) = (page.width, page.height);
        canvas.fill_rect(0.0, 0.0, w, h, self.palette.charcoal);
        paint_strip(
            canvas,
            &self.gradient.stops,
            0.0,
            0.0,
            w,
            self.page.dark_band_height,
            self.gradient.band_steps,
            self.gradient.overlap,
        );
        canvas.circle(w * 0.75, h * 0.3, 200.0, self.palette.purple.with_alpha(0.08));
        canvas.circle(w * 0.25, h * 0.7, 180.0, self.palette.green.with_alpha(0.06));

        if let Some(footer) = &self.footer {
            let font = page.fonts.key(footer.style.role);
            let leading = footer.style.leading;
            let mut baseline = h - self.page.margin - leading;
            for line in &footer.lines {
                canvas.text_centered(
                    page.fonts,
                    w / 2.0,
                    baseline,
                    line,
                    &font,
                    footer.style.font_size,
                    footer.style.color,
                );
                baseline += leading;
            }
        }
    }
}

/// Warm-white background with a thin gradient band, a footer rule, the
/// footer label and the page number.
pub struct ContentPainter {
    palette: Palette,
    gradient: Gradient,
    page: PageGeometry,
    label: String,
}

impl PagePainter for ContentPainter {
    fn paint(&self, canvas: &mut Canvas, page: &PageInfo) {
        let (w, h) = (page.width, page.height);
        let g = &self.page;
        canvas.fill_rect(0.0, 0.0, w, h, self.palette.warm_white);
        paint_strip(
            canvas,
            &self.gradient.stops,
            0.0,
            0.0,
            w,
            g.content_band_height,
            self.gradient.band_steps,
            self.gradient.overlap,
        );

        let rule_y = h - g.footer_rule_offset;
        canvas.line(g.margin, rule_y, w - g.margin, rule_y, self.palette.stone, 0.5);

        let font = page.fonts.key(crate::style::FontRole::Sans);
        let baseline = h - g.footer_baseline_offset;
        canvas.text(g.margin, baseline, &self.label, &font, g.footer_size, self.palette.light_gray);
        if let Some(n) = page.number {
            canvas.text_right(
                page.fonts,
                w - g.margin,
                baseline,
                &n.to_string(),
                &font,
                g.footer_size,
                self.palette.light_gray,
            );
        }
    }
}

/// Register the cover, divider and content templates.
pub fn brief_templates(config: &RenderConfig) -> TemplateSet {
    let theme = &config.theme;
    let g = theme.page;
    let styles = theme.styles();
    let mut set = TemplateSet::new(g.width, g.height);

    let dark_frame = Frame::new("dark_frame", g.margin, g.margin, g.width - 2.0 * g.margin, g.height - 2.0 * g.margin)
        .padded(g.frame_padding);
    let content_frame = Frame::new(
        "content_frame",
        g.margin,
        g.margin + g.content_inset,
        g.width - 2.0 * g.margin,
        g.height - 2.0 * g.margin - 2.0 * g.content_inset,
    )
    .padded(g.frame_padding);

    set.register(PageTemplate::new(
        COVER,
        vec![dark_frame.clone()],
        Box::new(dark_painter(config, Some(cover_footer(&config.brand, &styles)))),
        false,
    ));
    set.register(PageTemplate::new(
        DIVIDER,
        vec![dark_frame],
        Box::new(dark_painter(config, None)),
        false,
    ));
    set.register(PageTemplate::new(
        CONTENT,
        vec![content_frame],
        Box::new(ContentPainter {
            palette: theme.palette.clone(),
            gradient: theme.gradient.clone(),
            page: g,
            label: config.brand.page_footer.clone(),
        }),
        true,
    ));
    set
}

fn dark_painter(config: &RenderConfig, footer: Option<CoverFooter>) -> DarkPainter {
    DarkPainter {
        palette: config.theme.palette.clone(),
        gradient: config.theme.gradient.clone(),
        page: config.theme.page,
        footer,
    }
}

fn cover_footer(brand: &Brand, styles: &Styles) -> CoverFooter {
    CoverFooter {
        lines: [brand.cover_footer.clone(), brand.tagline.clone()],
        style: styles.cover_footer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;
    use crate::font::FontContext;

    fn paint(set: &TemplateSet, id: &str, number: Option<u32>) -> Vec<DrawOp> {
        let fonts = FontContext::new();
        let template = set.get(id).unwrap();
        let mut canvas = Canvas::new();
        template.painter.paint(
            &mut canvas,
            &PageInfo {
                template_id: id,
                number,
                width: set.page_width,
                height: set.page_height,
                fonts: &fonts,
            },
        );
        canvas.into_ops()
    }

    #[test]
    fn frames_sit_inside_the_margins() {
        let set = brief_templates(&RenderConfig::default());
        let dark = &set.get(COVER).unwrap().frames[0];
        assert_eq!((dark.x, dark.y, dark.width, dark.height), (60.0, 60.0, 492.0, 672.0));
        let content = &set.get(CONTENT).unwrap().frames[0];
        assert_eq!((content.y, content.height), (70.0, 652.0));
        assert!(content.bottom() < 792.0 - 36.0);
    }

    #[test]
    fn only_content_is_numbered() {
        let set = brief_templates(&RenderConfig::default());
        assert!(!set.get(COVER).unwrap().numbered);
        assert!(!set.get(DIVIDER).unwrap().numbered);
        assert!(set.get(CONTENT).unwrap().numbered);
    }

    #[test]
    fn content_page_prints_footer_and_number() {
        let set = brief_templates(&RenderConfig::default());
        let ops = paint(&set, CONTENT, Some(7));
        let texts: Vec<_> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["ProspectAI \u{00B7} Confidential", "7"]);
        assert!(matches!(ops[0], DrawOp::Rect { x, y, .. } if x == 0.0 && y == 0.0));
    }

    #[test]
    fn cover_carries_footer_and_divider_does_not() {
        let set = brief_templates(&RenderConfig::default());
        let cover_text = paint(&set, COVER, None)
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .count();
        let divider_text = paint(&set, DIVIDER, None)
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .count();
        assert_eq!(cover_text, 2);
        assert_eq!(divider_text, 0);
    }

    #[test]
    fn dark_page_has_glows() {
        let set = brief_templates(&RenderConfig::default());
        let circles: Vec<_> = paint(&set, DIVIDER, None)
            .into_iter()
            .filter_map(|op| match op {
                DrawOp::Circle { r, fill, .. } => Some((r, fill.a)),
                _ => None,
            })
            .collect();
        assert_eq!(circles, vec![(200.0, 0.08), (180.0, 0.06)]);
    }
}
