//! # Page Templates
//!
//! A page template pairs a background painter with the frames content flows
//! into. Frames are filled in order; when the last frame of a page is full
//! the page breaks.

use crate::canvas::Canvas;
use crate::error::FolioError;
use crate::font::FontContext;

/// A rectangular placement region, in top-down page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(id: &str, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            width,
            height,
        }
    }

    /// The same frame shrunk by `padding` on every side.
    pub fn padded(&self, padding: f64) -> Self {
        Self {
            id: self.id.clone(),
            x: self.x + padding,
            y: self.y + padding,
            width: (self.width - 2.0 * padding).max(0.0),
            height: (self.height - 2.0 * padding).max(0.0),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// What a painter knows about the page it is finishing.
pub struct PageInfo<'a> {
    pub template_id: &'a str,
    /// Present only on templates that carry page numbers.
    pub number: Option<u32>,
    pub width: f64,
    pub height: f64,
    pub fonts: &'a FontContext,
}

/// Paints everything on a page that is not flowed content.
pub trait PagePainter {
    fn paint(&self, canvas: &mut Canvas, page: &PageInfo);
}

/// Paints nothing.
pub struct BlankPainter;

impl PagePainter for BlankPainter {
    fn paint(&self, _canvas: &mut Canvas, _page: &PageInfo) {}
}

pub struct PageTemplate {
    pub id: String,
    pub frames: Vec<Frame>,
    pub painter: Box<dyn PagePainter>,
    /// Whether pages of this template count toward page numbers.
    pub numbered: bool,
}

impl PageTemplate {
    pub fn new(id: &str, frames: Vec<Frame>, painter: Box<dyn PagePainter>, numbered: bool) -> Self {
        Self {
            id: id.to_string(),
            frames,
            painter,
            numbered,
        }
    }
}

/// Page templates by id, plus the shared page size.
pub struct TemplateSet {
    pub page_width: f64,
    pub page_height: f64,
    templates: Vec<PageTemplate>,
}

impl TemplateSet {
    pub fn new(page_width: f64, page_height: f64) -> Self {
        Self {
            page_width,
            page_height,
            templates: Vec::new(),
        }
    }

    /// Add a template. A template with the same id is replaced.
    pub fn register(&mut self, template: PageTemplate) {
        if let Some(existing) = self.templates.iter_mut().find(|t| t.id == template.id) {
            *existing = template;
        } else {
            self.templates.push(template);
        }
    }

    pub fn get(&self, id: &str) -> Option<&PageTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Look up a template a block sequence refers to.
    pub fn require(&self, id: &str) -> Result<&PageTemplate, FolioError> {
        self.get(id)
            .ok_or_else(|| FolioError::UnknownTemplate(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_shrinks_every_side() {
        let frame = Frame::new("f", 54.0, 54.0, 504.0, 684.0).padded(6.0);
        assert_eq!(frame, Frame::new("f", 60.0, 60.0, 492.0, 672.0));
        assert_eq!(frame.bottom(), 732.0);
    }

    #[test]
    fn registering_same_id_replaces() {
        let mut set = TemplateSet::new(612.0, 792.0);
        set.register(PageTemplate::new("a", vec![], Box::new(BlankPainter), false));
        set.register(PageTemplate::new("a", vec![], Box::new(BlankPainter), true));
        assert_eq!(set.ids().count(), 1);
        assert!(set.require("a").unwrap().numbered);
        assert!(matches!(set.require("b"), Err(FolioError::UnknownTemplate(id)) if id == "b"));
    }
}
