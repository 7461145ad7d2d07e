//! # PDF Serializer
//!
//! Takes the composed pages from the flow compositor and writes a valid PDF
//! file.
//!
//! This is a from-scratch PDF 1.7 writer. Pages arrive as two ordered
//! lists of paint operations in top-down coordinates; the writer replays the
//! background list first, then the content list, flipping y into PDF space.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Font Embedding
//!
//! Standard PDF fonts (Helvetica, Times) use simple Type1 references.
//! Custom TrueType fonts are embedded whole as CIDFontType2 with Identity-H
//! encoding, producing 5 PDF objects per font: FontFile2, FontDescriptor,
//! CIDFont, ToUnicode CMap, and the root Type0 dictionary.
//!
//! ## Transparency
//!
//! Colors with alpha below 1 are painted through an ExtGState carrying the
//! same constant alpha for fills and strokes. One state object is written
//! per distinct alpha value.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use log::debug;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::canvas::DrawOp;
use crate::error::FolioError;
use crate::font::{FontContext, FontData, FontKey};
use crate::layout::ComposedPage;
use crate::style::Color;

/// Bézier control distance for a quarter circle of radius 1.
const KAPPA: f64 = 0.5522847498;

/// Document-level metadata written to the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

pub struct PdfWriter;

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Embedding data for a custom TrueType font.
struct CustomFontEmbedData {
    /// Maps characters to glyph IDs in the embedded font.
    char_to_gid: HashMap<char, u16>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Resolved font key -> object id, indexed as /F0, /F1, ...
    font_objects: Vec<(FontKey, usize)>,
    custom_font_data: HashMap<FontKey, CustomFontEmbedData>,
    /// Alpha value (in thousandths) -> ExtGState object id, named /GS<alpha>.
    alpha_states: BTreeMap<u32, usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, dict_extra: &str, raw: &[u8]) -> usize {
        let compressed = compress_to_vec_zlib(raw, 6);
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Length {} /Filter /FlateDecode{} >>\nstream\n",
            compressed.len(),
            dict_extra
        );
        data.extend_from_slice(&compressed);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write composed pages to a PDF byte vector.
    pub fn write(
        &self,
        pages: &[ComposedPage],
        info: &DocumentInfo,
        fonts: &FontContext,
    ) -> Result<Vec<u8>, FolioError> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
            custom_font_data: HashMap::new(),
            alpha_states: BTreeMap::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, graphics states, then page objects and content streams
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);

        self.register_fonts(&mut builder, pages, fonts)?;
        self.register_alpha_states(&mut builder, pages);

        let resources = self.build_resource_dict(&builder);
        let mut page_obj_ids: Vec<usize> = Vec::new();

        for page in pages {
            let content = self.build_content_stream(page, &builder, fonts);
            let content_obj_id = builder.push_stream("", content.as_bytes());

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let mut dict = String::from("<< ");
        if let Some(ref title) = info.title {
            let _ = write!(dict, "/Title {} ", Self::text_string(title));
        }
        if let Some(ref author) = info.author {
            let _ = write!(dict, "/Author {} ", Self::text_string(author));
        }
        if let Some(ref subject) = info.subject {
            let _ = write!(dict, "/Subject {} ", Self::text_string(subject));
        }
        dict.push_str("/Producer (Folio 0.1) /Creator (Folio) >>");
        let info_obj_id = builder.push(dict.into_bytes());

        debug!(
            "Writing {} pages, {} fonts, {} objects",
            page_obj_ids.len(),
            builder.font_objects.len(),
            builder.objects.len()
        );
        Ok(self.serialize(&builder, info_obj_id))
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(
        &self,
        page: &ComposedPage,
        builder: &PdfBuilder,
        fonts: &FontContext,
    ) -> String {
        let mut stream = String::new();
        for op in page.background.iter().chain(page.content.iter()) {
            self.write_op(&mut stream, op, page.height, builder, fonts);
        }
        stream
    }

    /// Write a single paint operation as PDF operators.
    fn write_op(
        &self,
        stream: &mut String,
        op: &DrawOp,
        page_height: f64,
        builder: &PdfBuilder,
        fonts: &FontContext,
    ) {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                if fill.a <= 0.0 {
                    return;
                }
                stream.push_str("q\n");
                Self::set_fill(stream, fill);
                let _ = write!(
                    stream,
                    "{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                    x,
                    page_height - y - height,
                    width,
                    height
                );
            }

            DrawOp::RoundRect {
                x,
                y,
                width,
                height,
                radius,
                fill,
                stroke,
            } => {
                let pdf_y = page_height - y - height;
                if let Some(fill) = fill.filter(|c| c.a > 0.0) {
                    stream.push_str("q\n");
                    Self::set_fill(stream, &fill);
                    Self::write_rounded_rect(stream, *x, pdf_y, *width, *height, *radius);
                    stream.push_str("f\nQ\n");
                }
                if let Some((color, line_width)) = stroke.filter(|(c, w)| c.a > 0.0 && *w > 0.0) {
                    stream.push_str("q\n");
                    Self::set_stroke(stream, &color, line_width);
                    Self::write_rounded_rect(stream, *x, pdf_y, *width, *height, *radius);
                    stream.push_str("S\nQ\n");
                }
            }

            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                if color.a <= 0.0 || *width <= 0.0 {
                    return;
                }
                stream.push_str("q\n");
                Self::set_stroke(stream, color, *width);
                let _ = write!(
                    stream,
                    "{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    x1,
                    page_height - y1,
                    x2,
                    page_height - y2
                );
            }

            DrawOp::Circle { cx, cy, r, fill } => {
                if fill.a <= 0.0 || *r <= 0.0 {
                    return;
                }
                stream.push_str("q\n");
                Self::set_fill(stream, fill);
                Self::write_circle(stream, *cx, page_height - cy, *r);
                stream.push_str("f\nQ\n");
            }

            DrawOp::Text {
                x,
                baseline,
                text,
                font,
                font_size,
                color,
            } => {
                if color.a <= 0.0 {
                    return;
                }
                let key = fonts.registry().resolved_key(font);
                let idx = Self::font_index(&key, &builder.font_objects);

                stream.push_str("q\n");
                if let Some(gs) = Self::alpha_state_name(color) {
                    let _ = writeln!(stream, "/{} gs", gs);
                }
                let _ = write!(
                    stream,
                    "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n",
                    color.r,
                    color.g,
                    color.b,
                    idx,
                    font_size,
                    x,
                    page_height - baseline
                );

                if let Some(embed) = builder.custom_font_data.get(&key) {
                    let mut hex = String::new();
                    for ch in text.chars() {
                        let gid = embed.char_to_gid.get(&ch).copied().unwrap_or(0);
                        let _ = write!(hex, "{:04X}", gid);
                    }
                    let _ = writeln!(stream, "<{}> Tj", hex);
                } else {
                    let _ = writeln!(stream, "({}) Tj", Self::encode_winansi(text));
                }
                stream.push_str("ET\nQ\n");
            }
        }
    }

    fn set_fill(stream: &mut String, color: &Color) {
        if let Some(gs) = Self::alpha_state_name(color) {
            let _ = writeln!(stream, "/{} gs", gs);
        }
        let _ = writeln!(stream, "{:.3} {:.3} {:.3} rg", color.r, color.g, color.b);
    }

    fn set_stroke(stream: &mut String, color: &Color, width: f64) {
        if let Some(gs) = Self::alpha_state_name(color) {
            let _ = writeln!(stream, "/{} gs", gs);
        }
        let _ = write!(
            stream,
            "{:.3} {:.3} {:.3} RG\n{:.2} w\n",
            color.r, color.g, color.b, width
        );
    }

    /// Quantized alpha, or `None` when the color is opaque.
    fn alpha_key(color: &Color) -> Option<u32> {
        let key = (color.a.clamp(0.0, 1.0) * 1000.0).round() as u32;
        (key < 1000).then_some(key)
    }

    fn alpha_state_name(color: &Color) -> Option<String> {
        Self::alpha_key(color).map(|k| format!("GS{}", k))
    }

    fn write_rounded_rect(stream: &mut String, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let r = radius.max(0.0).min(w / 2.0).min(h / 2.0);
        if r <= 0.0 {
            let _ = writeln!(stream, "{:.2} {:.2} {:.2} {:.2} re", x, y, w, h);
            return;
        }
        let k = KAPPA;

        let _ = writeln!(stream, "{:.2} {:.2} m", x + r, y);
        let _ = writeln!(stream, "{:.2} {:.2} l", x + w - r, y);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + w - r + r * k, y,
            x + w, y + r - r * k,
            x + w, y + r
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x + w, y + h - r);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + w, y + h - r + r * k,
            x + w - r + r * k, y + h,
            x + w - r, y + h
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x + r, y + h);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + r - r * k, y + h,
            x, y + h - r + r * k,
            x, y + h - r
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x, y + r);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x, y + r - r * k,
            x + r - r * k, y,
            x + r, y
        );
        stream.push_str("h\n");
    }

    /// A full circle as four quarter-circle Béziers.
    fn write_circle(stream: &mut String, cx: f64, cy: f64, r: f64) {
        let d = r * KAPPA;
        let _ = writeln!(stream, "{:.2} {:.2} m", cx + r, cy);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx + r, cy + d, cx + d, cy + r, cx, cy + r
        );
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx - d, cy + r, cx - r, cy + d, cx - r, cy
        );
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx - r, cy - d, cx - d, cy - r, cx, cy - r
        );
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            cx + d, cy - r, cx + r, cy - d, cx + r, cy
        );
        stream.push_str("h\n");
    }

    /// Register fonts used across all pages. Each resolved font gets its own
    /// PDF font object.
    fn register_fonts(
        &self,
        builder: &mut PdfBuilder,
        pages: &[ComposedPage],
        fonts: &FontContext,
    ) -> Result<(), FolioError> {
        let mut font_chars: HashMap<FontKey, HashSet<char>> = HashMap::new();
        for op in pages.iter().flat_map(|p| p.background.iter().chain(p.content.iter())) {
            if let DrawOp::Text { text, font, .. } = op {
                let key = fonts.registry().resolved_key(font);
                font_chars.entry(key).or_default().extend(text.chars());
            }
        }

        let mut keys: Vec<FontKey> = font_chars.keys().cloned().collect();
        keys.sort();

        // Always have at least Helvetica
        if keys.is_empty() {
            keys.push(FontKey::helvetica());
        }

        for key in &keys {
            match fonts.resolve(key) {
                FontData::Standard(std_font) => {
                    let font_dict = format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        std_font.pdf_name()
                    );
                    let obj_id = builder.push(font_dict.into_bytes());
                    builder.font_objects.push((key.clone(), obj_id));
                }
                FontData::Custom { data, .. } => {
                    let used_chars = font_chars.get(key).cloned().unwrap_or_default();
                    let type0_obj_id =
                        Self::write_custom_font_objects(builder, key, data, &used_chars)?;
                    builder.font_objects.push((key.clone(), type0_obj_id));
                }
            }
        }

        Ok(())
    }

    /// Write one ExtGState per distinct non-opaque alpha.
    fn register_alpha_states(&self, builder: &mut PdfBuilder, pages: &[ComposedPage]) {
        let mut alphas: HashSet<u32> = HashSet::new();
        for op in pages.iter().flat_map(|p| p.background.iter().chain(p.content.iter())) {
            let colors: Vec<&Color> = match op {
                DrawOp::Rect { fill, .. } | DrawOp::Circle { fill, .. } => vec![fill],
                DrawOp::RoundRect { fill, stroke, .. } => {
                    fill.iter().chain(stroke.iter().map(|(c, _)| c)).collect()
                }
                DrawOp::Line { color, .. } | DrawOp::Text { color, .. } => vec![color],
            };
            alphas.extend(colors.into_iter().filter_map(Self::alpha_key));
        }

        let mut alphas: Vec<u32> = alphas.into_iter().collect();
        alphas.sort_unstable();
        for alpha in alphas {
            let value = alpha as f64 / 1000.0;
            let dict = format!("<< /Type /ExtGState /ca {:.3} /CA {:.3} >>", value, value);
            let id = builder.push(dict.into_bytes());
            builder.alpha_states.insert(alpha, id);
        }
    }

    /// Write the 5 CIDFont PDF objects for a custom TrueType font.
    /// Returns the object ID of the Type0 root font dictionary.
    fn write_custom_font_objects(
        builder: &mut PdfBuilder,
        key: &FontKey,
        ttf_data: &[u8],
        used_chars: &HashSet<char>,
    ) -> Result<usize, FolioError> {
        let face = ttf_parser::Face::parse(ttf_data, 0).map_err(|e| {
            FolioError::Font(format!("Failed to parse TTF data for font '{}': {}", key.family, e))
        })?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();

        let mut char_to_gid: HashMap<char, u16> = HashMap::new();
        for &ch in used_chars {
            if let Some(gid) = face.glyph_index(ch) {
                char_to_gid.insert(ch, gid.0);
            }
        }

        let pdf_font_name = Self::sanitize_font_name(&key.family, key.weight, key.italic);

        // 1. FontFile2 stream
        let fontfile2_id =
            builder.push_stream(&format!(" /Length1 {}", ttf_data.len()), ttf_data);

        // 2. FontDescriptor
        let bbox = face.global_bounding_box();
        let scale = 1000.0 / units_per_em as f64;
        let bbox_str = format!(
            "[{} {} {} {}]",
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
        );
        let cap_height = face.capital_height().unwrap_or(ascender) as f64 * scale;
        let stem_v = if key.weight >= 700 { 120 } else { 80 };
        let font_descriptor_dict = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox {} /ItalicAngle {} \
             /Ascent {} /Descent {} /CapHeight {} /StemV {} \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            bbox_str,
            if key.italic { -12 } else { 0 },
            (ascender as f64 * scale) as i32,
            (descender as f64 * scale) as i32,
            cap_height as i32,
            stem_v,
            fontfile2_id,
        );
        let font_descriptor_id = builder.push(font_descriptor_dict.into_bytes());

        // 3. CIDFont dictionary (DescendantFont)
        let w_array = Self::build_w_array(&char_to_gid, &face, units_per_em);
        let default_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|adv| (adv as f64 * scale) as u32)
            .unwrap_or(1000);
        let cidfont_dict = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} \
             /CIDToGIDMap /Identity >>",
            pdf_font_name, font_descriptor_id, default_width, w_array,
        );
        let cidfont_id = builder.push(cidfont_dict.into_bytes());

        // 4. ToUnicode CMap
        let cmap_content = Self::build_tounicode_cmap(&char_to_gid, &pdf_font_name);
        let tounicode_id = builder.push_stream("", cmap_content.as_bytes());

        // 5. Type0 font dictionary (the root, referenced by /Resources)
        let type0_dict = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        let type0_id = builder.push(type0_dict.into_bytes());

        builder
            .custom_font_data
            .insert(key.clone(), CustomFontEmbedData { char_to_gid });

        Ok(type0_id)
    }

    /// Build the /W array for per-glyph widths in CIDFont.
    /// Format: [gid [width] gid [width] ...]
    fn build_w_array(
        char_to_gid: &HashMap<char, u16>,
        face: &ttf_parser::Face,
        units_per_em: u16,
    ) -> String {
        let scale = 1000.0 / units_per_em as f64;

        let mut gids: Vec<u16> = char_to_gid.values().copied().collect();
        gids.sort_unstable();
        gids.dedup();

        let mut result = String::from("[");
        for gid in gids {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            let _ = write!(result, " {} [{}]", gid, (advance as f64 * scale) as u32);
        }
        result.push_str(" ]");
        result
    }

    /// Build a ToUnicode CMap for text extraction/copy-paste support.
    fn build_tounicode_cmap(char_to_gid: &HashMap<char, u16>, font_name: &str) -> String {
        let mut gid_to_unicode: Vec<(u16, char)> =
            char_to_gid.iter().map(|(&ch, &gid)| (gid, ch)).collect();
        gid_to_unicode.sort_by_key(|(gid, _)| *gid);

        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo\n");
        cmap.push_str("<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        // At most 100 entries per beginbfchar block
        for chunk in gid_to_unicode.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for &(gid, ch) in chunk {
                let mut utf16 = [0u16; 2];
                let hex: String = ch
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|u| format!("{:04X}", u))
                    .collect();
                let _ = writeln!(cmap, "<{:04X}> <{}>", gid, hex);
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");
        cmap
    }

    /// Sanitize a font name for use as a PDF name object.
    fn sanitize_font_name(family: &str, weight: u32, italic: bool) -> String {
        let mut name: String = family
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();

        match weight {
            w if w >= 700 => name.push_str("-Bold"),
            w if w <= 300 => name.push_str("-Light"),
            500 => name.push_str("-Medium"),
            _ => {}
        }
        if italic {
            name.push_str("-Italic");
        }

        if name.is_empty() {
            name = "CustomFont".to_string();
        }
        name
    }

    /// Font and graphics-state resources, shared by every page.
    fn build_resource_dict(&self, builder: &PdfBuilder) -> String {
        let fonts = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ");
        if builder.alpha_states.is_empty() {
            return format!("/Font << {} >>", fonts);
        }
        let states = builder
            .alpha_states
            .iter()
            .map(|(alpha, obj_id)| format!("/GS{} {} 0 R", alpha, obj_id))
            .collect::<Vec<_>>()
            .join(" ");
        format!("/Font << {} >> /ExtGState << {} >>", fonts, states)
    }

    /// The /F index of a resolved font key. Falls back to the first font.
    fn font_index(key: &FontKey, font_objects: &[(FontKey, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(k, _)| k == key)
            .unwrap_or(0)
    }

    /// Escape special characters in a PDF literal string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// A PDF text string: a literal for ASCII, UTF-16BE hex otherwise.
    fn text_string(s: &str) -> String {
        if s.is_ascii() {
            return format!("({})", Self::escape_pdf_string(s));
        }
        let mut hex = String::from("<FEFF");
        for unit in s.encode_utf16() {
            let _ = write!(hex, "{:04X}", unit);
        }
        hex.push('>');
        hex
    }

    /// Encode text for a WinAnsi standard font. Unmappable characters
    /// become `?`.
    fn encode_winansi(text: &str) -> String {
        let mut out = String::new();
        for ch in text.chars() {
            match Self::unicode_to_winansi(ch).unwrap_or(b'?') {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                b @ 0x20..=0x7E => out.push(b as char),
                b => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// holds the typographic punctuation.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // Euro sign
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85), // Horizontal ellipsis
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91), // Left single quotation mark
            0x2019 => Some(0x92), // Right single quotation mark
            0x201C => Some(0x93), // Left double quotation mark
            0x201D => Some(0x94), // Right double quotation mark
            0x2022 => Some(0x95), // Bullet
            0x2013 => Some(0x96), // En dash
            0x2014 => Some(0x97), // Em dash
            0x02DC => Some(0x98),
            0x2122 => Some(0x99), // Trade mark sign
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontContext;

    fn page(background: Vec<DrawOp>, content: Vec<DrawOp>) -> ComposedPage {
        ComposedPage {
            template_id: "content".to_string(),
            number: Some(1),
            width: 612.0,
            height: 792.0,
            background,
            content,
            placements: vec![],
        }
    }

    fn text_op(text: &str, font: FontKey, color: Color) -> DrawOp {
        DrawOp::Text {
            x: 60.0,
            baseline: 100.0,
            text: text.to_string(),
            font,
            font_size: 12.0,
            color,
        }
    }

    /// Inflate every FlateDecode stream and concatenate the results.
    fn streams(bytes: &[u8]) -> String {
        let mut out = String::new();
        let mut rest = bytes;
        while let Some(start) = find(rest, b"stream\n") {
            let body = &rest[start + 7..];
            let Some(end) = find(body, b"\nendstream") else { break };
            if let Ok(raw) = miniz_oxide::inflate::decompress_to_vec_zlib(&body[..end]) {
                out.push_str(&String::from_utf8_lossy(&raw));
            }
            rest = &body[end..];
        }
        out
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(PdfWriter::escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfWriter::escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn empty_page_produces_valid_pdf() {
        let bytes = PdfWriter::new()
            .write(&[page(vec![], vec![])], &DocumentInfo::default(), &FontContext::new())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(find(&bytes, b"%%EOF").is_some());
        assert!(find(&bytes, b"xref").is_some());
        assert!(find(&bytes, b"/Count 1").is_some());
    }

    #[test]
    fn non_ascii_title_is_utf16() {
        let info = DocumentInfo {
            title: Some("Jane \u{2014} Brief".to_string()),
            author: Some("Folio".to_string()),
            subject: None,
        };
        let bytes = PdfWriter::new()
            .write(&[page(vec![], vec![])], &info, &FontContext::new())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title <FEFF004A0061006E006500202014002000420072006900650066>"));
        assert!(text.contains("/Author (Folio)"));
    }

    #[test]
    fn y_axis_is_flipped() {
        let ops = vec![DrawOp::Rect {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
            fill: Color::BLACK,
        }];
        let bytes = PdfWriter::new()
            .write(&[page(vec![], ops)], &DocumentInfo::default(), &FontContext::new())
            .unwrap();
        assert!(streams(&bytes).contains("10.00 722.00 100.00 50.00 re"));
    }

    #[test]
    fn background_is_written_before_content() {
        let background = vec![text_op("UNDER", FontKey::helvetica(), Color::BLACK)];
        let content = vec![text_op("OVER", FontKey::helvetica(), Color::BLACK)];
        let bytes = PdfWriter::new()
            .write(&[page(background, content)], &DocumentInfo::default(), &FontContext::new())
            .unwrap();
        let s = streams(&bytes);
        let under = s.find("(UNDER) Tj").unwrap();
        let over = s.find("(OVER) Tj").unwrap();
        assert!(under < over);
    }

    #[test]
    fn transparent_colors_get_a_graphics_state() {
        let ops = vec![DrawOp::Circle {
            cx: 100.0,
            cy: 100.0,
            r: 50.0,
            fill: Color::WHITE.with_alpha(0.25),
        }];
        let bytes = PdfWriter::new()
            .write(&[page(ops, vec![])], &DocumentInfo::default(), &FontContext::new())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/ExtGState << /GS250"));
        assert!(text.contains("/ca 0.250 /CA 0.250"));
        assert!(streams(&bytes).contains("/GS250 gs"));
    }

    #[test]
    fn bold_font_registered_separately() {
        let content = vec![
            text_op("A", FontKey::helvetica(), Color::BLACK),
            text_op("B", FontKey::new("Helvetica", 700, false), Color::BLACK),
        ];
        let bytes = PdfWriter::new()
            .write(&[page(vec![], content)], &DocumentInfo::default(), &FontContext::new())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold "));
        assert!(!text.contains("CIDFontType2"));
    }

    #[test]
    fn winansi_encodes_typographic_punctuation() {
        assert_eq!(PdfWriter::encode_winansi("a\u{2014}b"), "a\\227b");
        assert_eq!(PdfWriter::encode_winansi("(x)"), "\\(x\\)");
        assert_eq!(PdfWriter::encode_winansi("\u{2713}"), "?");
    }

    #[test]
    fn sanitize_font_name() {
        assert_eq!(PdfWriter::sanitize_font_name("DMSans", 400, false), "DMSans");
        assert_eq!(PdfWriter::sanitize_font_name("DMSans", 700, true), "DMSans-Bold-Italic");
        assert_eq!(PdfWriter::sanitize_font_name("DMSans", 300, false), "DMSans-Light");
        assert_eq!(PdfWriter::sanitize_font_name("Instrument Serif", 400, false), "InstrumentSerif");
    }

    #[test]
    fn tounicode_cmap_format() {
        let mut char_to_gid = HashMap::new();
        char_to_gid.insert('A', 36u16);
        char_to_gid.insert('\u{2713}', 900u16);

        let cmap = PdfWriter::build_tounicode_cmap(&char_to_gid, "TestFont");
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0024> <0041>"));
        assert!(cmap.contains("<0384> <2713>"));
        assert!(cmap.contains("<0000> <FFFF>"));
    }
}
