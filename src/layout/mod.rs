//! # Flow Layout
//!
//! Blocks are measured, then placed INTO pages. There is never a tall
//! canvas that gets sliced afterwards.
//!
//! The compositor walks the block sequence once:
//!
//! 1. A template switch only records which template the *next* page uses.
//!    The page already open keeps the template it was opened with.
//! 2. A page break closes the open page. The next page opens lazily, when
//!    the next block needs somewhere to go, so a break with nothing after
//!    it (or two breaks in a row) never produces a blank page.
//! 3. Any other block is measured against the current frame's width. If it
//!    does not fit in what is left of the frame and the frame already holds
//!    something, the flow moves to the next frame, or to a new page when
//!    the template has no frames left. Then the block is drawn at the
//!    cursor and the cursor moves down by its height.
//!
//! A page is finalized when it closes: its template's painter paints the
//! background (and footer and page number, where the template has them)
//! onto a layer beneath the content.

pub mod blocks;
pub mod page_break;
pub mod template;

use log::{debug, warn};

use crate::canvas::{Canvas, DrawOp};
use crate::config::Theme;
use crate::error::FolioError;
use crate::font::FontContext;
use crate::text::TextLayout;

pub use blocks::{BarWidth, Block, Size};
use page_break::{decide_break, BreakDecision};
pub use template::{Frame, PageInfo, PagePainter, PageTemplate, TemplateSet};

/// Read-only state shared by every measure and draw call.
pub struct LayoutContext<'a> {
    pub fonts: &'a FontContext,
    pub theme: &'a Theme,
    pub text: TextLayout,
}

impl<'a> LayoutContext<'a> {
    pub fn new(fonts: &'a FontContext, theme: &'a Theme) -> Self {
        Self {
            fonts,
            theme,
            text: TextLayout::new(),
        }
    }
}

/// Where one block ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub kind: &'static str,
    pub frame: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A finished page.
#[derive(Debug, Clone)]
pub struct ComposedPage {
    pub template_id: String,
    /// Page number on numbered templates.
    pub number: Option<u32>,
    pub width: f64,
    pub height: f64,
    /// Painted by the template, beneath the content.
    pub background: Vec<DrawOp>,
    /// Painted by the blocks, in placement order.
    pub content: Vec<DrawOp>,
    pub placements: Vec<Placement>,
}

/// The page currently being filled.
struct PageCursor {
    template_id: String,
    number: Option<u32>,
    frames: Vec<Frame>,
    frame_index: usize,
    /// Height used in the current frame.
    y: f64,
    /// Blocks placed in the current frame.
    placed_in_frame: usize,
    canvas: Canvas,
    placements: Vec<Placement>,
}

impl PageCursor {
    fn frame(&self) -> &Frame {
        &self.frames[self.frame_index]
    }

    fn remaining_height(&self) -> f64 {
        (self.frame().height - self.y).max(0.0)
    }

    fn has_next_frame(&self) -> bool {
        self.frame_index + 1 < self.frames.len()
    }

    fn next_frame(&mut self) {
        self.frame_index += 1;
        self.y = 0.0;
        self.placed_in_frame = 0;
    }
}

/// Sequences blocks onto pages.
pub struct FlowCompositor<'a> {
    ctx: LayoutContext<'a>,
    templates: &'a TemplateSet,
    pending_template: String,
    page_number: u32,
    cursor: Option<PageCursor>,
    pages: Vec<ComposedPage>,
}

impl<'a> FlowCompositor<'a> {
    /// A compositor whose first page uses `initial_template`.
    pub fn new(
        fonts: &'a FontContext,
        theme: &'a Theme,
        templates: &'a TemplateSet,
        initial_template: &str,
    ) -> Result<Self, FolioError> {
        templates.require(initial_template)?;
        Ok(Self {
            ctx: LayoutContext::new(fonts, theme),
            templates,
            pending_template: initial_template.to_string(),
            page_number: 0,
            cursor: None,
            pages: Vec::new(),
        })
    }

    /// Lay out a whole block sequence and return the finished pages.
    pub fn compose(
        mut self,
        blocks: impl IntoIterator<Item = Block>,
    ) -> Result<Vec<ComposedPage>, FolioError> {
        for block in blocks {
            self.push(block)?;
        }
        Ok(self.finish())
    }

    /// Flow one block. The block is consumed.
    pub fn push(&mut self, block: Block) -> Result<(), FolioError> {
        match block {
            Block::TemplateSwitch(id) => {
                self.templates.require(&id)?;
                debug!("Next page uses template `{}`", id);
                self.pending_template = id;
            }
            Block::PageBreak => self.close_page(),
            block => self.place(block)?,
        }
        Ok(())
    }

    /// Close the last page and return every page, in order.
    pub fn finish(mut self) -> Vec<ComposedPage> {
        self.close_page();
        self.pages
    }

    fn place(&mut self, block: Block) -> Result<(), FolioError> {
        if self.cursor.is_none() {
            // Blocks with nothing to draw must not open a page of their own.
            let template = self.templates.require(&self.pending_template)?;
            let width = template.frames.first().map(|f| f.width).unwrap_or(0.0);
            if block.measure(&self.ctx, width).height <= 0.0 {
                return Ok(());
            }
            self.open_page()?;
        }

        loop {
            let Some(cursor) = self.cursor.as_mut() else {
                return Ok(());
            };
            let frame_width = cursor.frame().width;
            let size = block.measure(&self.ctx, frame_width);
            if size.height <= 0.0 {
                // Nothing to draw, and nothing to move the cursor.
                return Ok(());
            }

            match decide_break(
                size.height,
                cursor.remaining_height(),
                cursor.placed_in_frame > 0,
                cursor.has_next_frame(),
            ) {
                BreakDecision::NextFrame => {
                    cursor.next_frame();
                    continue;
                }
                BreakDecision::NextPage => {
                    self.close_page();
                    self.open_page()?;
                    continue;
                }
                BreakDecision::Overflow => {
                    warn!(
                        "{} block is {:.1}pt tall but frame `{}` only has {:.1}pt; it will overflow",
                        block.kind(),
                        size.height,
                        cursor.frame().id,
                        cursor.remaining_height()
                    );
                }
                BreakDecision::Place => {}
            }

            let frame = cursor.frame().clone();
            let x = frame.x;
            let y = frame.y + cursor.y;
            block.draw(&self.ctx, &mut cursor.canvas, x, y, frame_width);
            cursor.placements.push(Placement {
                kind: block.kind(),
                frame: frame.id,
                x,
                y,
                width: size.width,
                height: size.height,
            });
            cursor.y += size.height;
            cursor.placed_in_frame += 1;
            return Ok(());
        }
    }

    fn open_page(&mut self) -> Result<(), FolioError> {
        let template = self.templates.require(&self.pending_template)?;
        let number = if template.numbered {
            self.page_number += 1;
            Some(self.page_number)
        } else {
            None
        };
        if template.frames.is_empty() {
            return Err(FolioError::UnknownTemplate(format!(
                "{} (has no frames)",
                template.id
            )));
        }
        debug!(
            "Opening page {} with template `{}`",
            self.pages.len() + 1,
            template.id
        );
        self.cursor = Some(PageCursor {
            template_id: template.id.clone(),
            number,
            frames: template.frames.clone(),
            frame_index: 0,
            y: 0.0,
            placed_in_frame: 0,
            canvas: Canvas::new(),
            placements: Vec::new(),
        });
        Ok(())
    }

    fn close_page(&mut self) {
        let Some(cursor) = self.cursor.take() else {
            return;
        };
        let width = self.templates.page_width;
        let height = self.templates.page_height;

        let mut background = Canvas::new();
        if let Some(template) = self.templates.get(&cursor.template_id) {
            let info = PageInfo {
                template_id: &cursor.template_id,
                number: cursor.number,
                width,
                height,
                fonts: self.ctx.fonts,
            };
            template.painter.paint(&mut background, &info);
        }

        debug!(
            "Closed page {} (`{}`, {} blocks)",
            self.pages.len() + 1,
            cursor.template_id,
            cursor.placements.len()
        );
        self.pages.push(ComposedPage {
            template_id: cursor.template_id,
            number: cursor.number,
            width,
            height,
            background: background.into_ops(),
            content: cursor.canvas.into_ops(),
            placements: cursor.placements,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::template::BlankPainter;
    use crate::style::Color;

    struct NumberPainter;

    impl PagePainter for NumberPainter {
        fn paint(&self, canvas: &mut Canvas, page: &PageInfo) {
            if let Some(n) = page.number {
                canvas.text(
                    0.0,
                    page.height - 10.0,
                    &n.to_string(),
                    &crate::font::FontKey::helvetica(),
                    8.0,
                    Color::BLACK,
                );
            }
        }
    }

    fn templates() -> TemplateSet {
        let mut set = TemplateSet::new(600.0, 800.0);
        set.register(PageTemplate::new(
            "cover",
            vec![Frame::new("cover", 50.0, 50.0, 500.0, 700.0)],
            Box::new(BlankPainter),
            false,
        ));
        set.register(PageTemplate::new(
            "content",
            vec![Frame::new("body", 50.0, 50.0, 500.0, 100.0)],
            Box::new(NumberPainter),
            true,
        ));
        set.register(PageTemplate::new(
            "columns",
            vec![
                Frame::new("left", 50.0, 50.0, 240.0, 100.0),
                Frame::new("right", 310.0, 50.0, 240.0, 100.0),
            ],
            Box::new(BlankPainter),
            true,
        ));
        set
    }

    fn compose(blocks: Vec<Block>, initial: &str) -> Vec<ComposedPage> {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let set = templates();
        FlowCompositor::new(&fonts, &theme, &set, initial)
            .unwrap()
            .compose(blocks)
            .unwrap()
    }

    #[test]
    fn overflow_breaks_to_a_new_page() {
        let pages = compose(
            vec![Block::Spacer(60.0), Block::Spacer(60.0), Block::Spacer(60.0)],
            "content",
        );
        assert_eq!(pages.len(), 3);
        for page in &pages {
            assert_eq!(page.placements.len(), 1);
            assert_eq!(page.placements[0].y, 50.0);
        }
    }

    #[test]
    fn no_block_crosses_the_frame_bottom() {
        let heights = [30.0, 45.0, 10.0, 99.0, 1.0, 70.0, 30.0, 100.0, 25.0];
        let pages = compose(heights.iter().map(|h| Block::Spacer(*h)).collect(), "content");
        let placed: usize = pages.iter().map(|p| p.placements.len()).sum();
        assert_eq!(placed, heights.len());
        for page in &pages {
            for p in &page.placements {
                assert!(p.y >= 50.0);
                assert!(p.y + p.height <= 150.0 + 1e-9, "{:?} crosses the frame", p);
            }
        }
    }

    #[test]
    fn page_numbers_skip_unnumbered_templates() {
        let pages = compose(
            vec![
                Block::Spacer(10.0),
                Block::switch_to("content"),
                Block::PageBreak,
                Block::Spacer(80.0),
                Block::Spacer(80.0),
                Block::Spacer(80.0),
            ],
            "cover",
        );
        let numbers: Vec<_> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![None, Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn switch_waits_for_the_next_page() {
        let pages = compose(
            vec![
                Block::Spacer(10.0),
                Block::switch_to("content"),
                Block::Spacer(10.0),
                Block::PageBreak,
                Block::Spacer(10.0),
            ],
            "cover",
        );
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].template_id, "cover");
        assert_eq!(pages[0].placements.len(), 2);
        assert_eq!(pages[1].template_id, "content");
    }

    #[test]
    fn switch_applies_on_implicit_break_too() {
        let pages = compose(
            vec![
                Block::Spacer(90.0),
                Block::switch_to("columns"),
                Block::Spacer(90.0),
            ],
            "content",
        );
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].template_id, "content");
        assert_eq!(pages[1].template_id, "columns");
    }

    #[test]
    fn repeated_breaks_make_no_blank_pages() {
        let pages = compose(
            vec![
                Block::PageBreak,
                Block::Spacer(10.0),
                Block::PageBreak,
                Block::PageBreak,
                Block::Spacer(10.0),
                Block::PageBreak,
            ],
            "content",
        );
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| !p.placements.is_empty()));
    }

    #[test]
    fn empty_sequence_emits_nothing() {
        assert!(compose(vec![], "cover").is_empty());
        assert!(compose(vec![Block::switch_to("content"), Block::PageBreak], "cover").is_empty());
    }

    #[test]
    fn frames_fill_in_order_before_breaking() {
        let pages = compose(
            vec![Block::Spacer(70.0), Block::Spacer(70.0), Block::Spacer(70.0)],
            "columns",
        );
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].placements[0].frame, "left");
        assert_eq!(pages[0].placements[1].frame, "right");
        assert_eq!(pages[0].placements[1].x, 310.0);
        assert_eq!(pages[1].placements[0].frame, "left");
    }

    #[test]
    fn oversized_block_is_placed_alone() {
        let pages = compose(
            vec![Block::Spacer(10.0), Block::Spacer(300.0), Block::Spacer(10.0)],
            "content",
        );
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].placements[0].height, 300.0);
    }

    #[test]
    fn final_page_is_painted() {
        let pages = compose(vec![Block::Spacer(5.0)], "content");
        assert_eq!(pages.len(), 1);
        assert!(matches!(
            &pages[0].background[0],
            DrawOp::Text { text, .. } if text == "1"
        ));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let fonts = FontContext::new();
        let theme = Theme::default();
        let set = templates();
        assert!(FlowCompositor::new(&fonts, &theme, &set, "nope").is_err());
        let compositor = FlowCompositor::new(&fonts, &theme, &set, "cover").unwrap();
        let result = compositor.compose(vec![Block::switch_to("nope")]);
        assert!(matches!(result, Err(FolioError::UnknownTemplate(_))));
    }

    #[test]
    fn zero_height_blocks_do_not_open_pages() {
        let pages = compose(
            vec![
                Block::Spacer(10.0),
                Block::PageBreak,
                Block::paragraph("", Theme::default().styles().body),
            ],
            "content",
        );
        assert_eq!(pages.len(), 1);
    }
}
