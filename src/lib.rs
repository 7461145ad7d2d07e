//! # Folio
//!
//! A flow-layout PDF engine for donor intelligence briefs.
//!
//! Content is never drawn onto a tall canvas and sliced afterwards. Every
//! block is measured first, then placed INTO a page frame; when it does not
//! fit, the flow moves on to the next frame or page before drawing.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON)
//!       ↓
//!   [model]      — Content document, validated
//!       ↓
//!   [assemble]   — Content tree → ordered blocks
//!       ↓
//!   [layout]     — Flow compositor: blocks → pages, via page templates
//!       ↓
//!   [pdf]        — Serialize to PDF bytes
//! ```
//!
//! Design tokens live in one immutable [`RenderConfig`], built once and
//! borrowed by every stage.

pub mod assemble;
pub mod canvas;
pub mod config;
pub mod error;
pub mod font;
pub mod gradient;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod templates;
pub mod text;

use std::fs;
use std::io::Write;
use std::path::Path;

use log::info;

pub use config::RenderConfig;
pub use error::FolioError;
pub use model::ContentDocument;

use font::FontContext;
use layout::{ComposedPage, FlowCompositor};
use pdf::{DocumentInfo, PdfWriter};

/// A finished render: the PDF bytes and the pages they were written from.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub pages: Vec<ComposedPage>,
}

/// What [`render_to_path`] published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub bytes: usize,
    pub pages: usize,
}

/// Render a validated document to PDF bytes.
///
/// Fonts are loaded from `config.font_dir`; missing faces fall back to the
/// standard fonts with a warning.
pub fn render(doc: &ContentDocument, config: &RenderConfig) -> Result<RenderOutput, FolioError> {
    let fonts = FontContext::load_dir(&config.font_dir);
    render_with_fonts(doc, config, &fonts)
}

/// Render with an already loaded font context.
pub fn render_with_fonts(
    doc: &ContentDocument,
    config: &RenderConfig,
    fonts: &FontContext,
) -> Result<RenderOutput, FolioError> {
    let templates = templates::brief_templates(config);
    let blocks = assemble::assemble(doc, config);
    let pages = FlowCompositor::new(fonts, &config.theme, &templates, templates::COVER)?
        .compose(blocks)?;

    let info = DocumentInfo {
        title: Some(format!("{} \u{2014} {}", doc.donor_name, config.brand.title_suffix)),
        author: Some(config.brand.author.clone()),
        subject: None,
    };
    let bytes = PdfWriter::new().write(&pages, &info, fonts)?;
    info!("Rendered {} pages ({} bytes) for {}", pages.len(), bytes.len(), doc.donor_name);
    Ok(RenderOutput { bytes, pages })
}

/// Parse a content document from JSON and render it.
pub fn render_json(json: &str, config: &RenderConfig) -> Result<RenderOutput, FolioError> {
    let doc = ContentDocument::from_json(json)?;
    render(&doc, config)
}

/// Read `input`, render it, and publish the PDF at `output`.
///
/// The PDF is written to a temporary file next to `output` and renamed into
/// place only once it is complete. On any error `output` is left untouched.
pub fn render_to_path(
    input: &Path,
    output: &Path,
    config: &RenderConfig,
) -> Result<RenderSummary, FolioError> {
    let json = fs::read_to_string(input).map_err(|source| FolioError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let rendered = render_json(&json, config)?;
    publish(output, &rendered.bytes)?;
    Ok(RenderSummary {
        bytes: rendered.bytes.len(),
        pages: rendered.pages.len(),
    })
}

/// Atomically replace `path` with `bytes`.
fn publish(path: &Path, bytes: &[u8]) -> Result<(), FolioError> {
    let write_err = |source: std::io::Error| FolioError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
