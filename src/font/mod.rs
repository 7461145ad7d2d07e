//! # Font Management
//!
//! The standard PDF fonts (Helvetica, Times) are always available and
//! need no embedding. The brief's own faces (a serif display face and a sans
//! text family) are loaded from a font directory when present; every face
//! that is missing falls back to a standard font with a warning.
//!
//! Registration happens once, before any measurement. Afterwards the
//! [`FontContext`] is only ever borrowed.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use std::collections::HashMap;
use std::path::Path;

use log::{info, warn};

use crate::style::FontRole;

/// A font registry key: family + weight + style.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FontKey {
    pub family: String,
    pub weight: u32,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: &str, weight: u32, italic: bool) -> Self {
        Self {
            family: family.to_string(),
            weight,
            italic,
        }
    }

    pub fn helvetica() -> Self {
        Self::new("Helvetica", 400, false)
    }

    /// The same family with bold and/or italic forced on.
    pub fn emphasized(&self, bold: bool, italic: bool) -> Self {
        Self {
            family: self.family.clone(),
            weight: if bold { self.weight.max(700) } else { self.weight },
            italic: self.italic || italic,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType/OpenType font that needs to be embedded.
    Custom {
        data: Vec<u8>,
        /// Parsed metrics from ttf-parser, if the face parsed.
        metrics: Option<CustomFontMetrics>,
    },
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        // Basic Multilingual Plane is enough for the brief's text.
        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_ids,
        })
    }
}

/// The standard PDF fonts the engine can fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
        }
    }
}

static HELVETICA_FALLBACK: FontData = FontData::Standard(StandardFont::Helvetica);

/// A font registry that maps family + weight + style to font data.
pub struct FontRegistry {
    fonts: HashMap<FontKey, FontData>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();

        let standard_mappings = [
            (("Helvetica", 400, false), StandardFont::Helvetica),
            (("Helvetica", 700, false), StandardFont::HelveticaBold),
            (("Helvetica", 400, true), StandardFont::HelveticaOblique),
            (("Helvetica", 700, true), StandardFont::HelveticaBoldOblique),
            (("Times", 400, false), StandardFont::TimesRoman),
            (("Times", 700, false), StandardFont::TimesBold),
            (("Times", 400, true), StandardFont::TimesItalic),
            (("Times", 700, true), StandardFont::TimesBoldItalic),
        ];

        for ((family, weight, italic), font) in standard_mappings {
            fonts.insert(FontKey::new(family, weight, italic), FontData::Standard(font));
        }

        Self { fonts }
    }

    /// Look up a font, falling back to Helvetica if not found.
    pub fn resolve(&self, key: &FontKey) -> &FontData {
        if let Some(font) = self.fonts.get(key) {
            return font;
        }

        // Try with normalized weight (snap to 400 or 700)
        let snapped_weight = if key.weight >= 600 { 700 } else { 400 };
        let snapped = FontKey::new(&key.family, snapped_weight, key.italic);
        if let Some(font) = self.fonts.get(&snapped) {
            return font;
        }

        let fallback = FontKey::new("Helvetica", snapped_weight, key.italic);
        self.fonts.get(&fallback).unwrap_or(&HELVETICA_FALLBACK)
    }

    /// The key a lookup for `key` actually lands on.
    pub fn resolved_key(&self, key: &FontKey) -> FontKey {
        if self.fonts.contains_key(key) {
            return key.clone();
        }
        let snapped_weight = if key.weight >= 600 { 700 } else { 400 };
        let snapped = FontKey::new(&key.family, snapped_weight, key.italic);
        if self.fonts.contains_key(&snapped) {
            return snapped;
        }
        FontKey::new("Helvetica", snapped_weight, key.italic)
    }

    /// Register a custom font. Re-registering a key replaces it.
    pub fn register(&mut self, key: FontKey, data: Vec<u8>) {
        let metrics = CustomFontMetrics::from_font_data(&data);
        if metrics.is_none() {
            warn!("{} {} could not be parsed; using fallback widths", key.family, key.weight);
        }
        self.fonts.insert(key, FontData::Custom { data, metrics });
    }

    pub fn contains(&self, key: &FontKey) -> bool {
        self.fonts.contains_key(key)
    }

}

/// One file of a custom family and the registry slots it fills.
struct FaceFile {
    file: &'static str,
    slots: &'static [(u32, bool)],
}

const SERIF_FAMILY: &str = "InstrumentSerif";
const SANS_FAMILY: &str = "DMSans";

const SERIF_REGULAR: &str = "InstrumentSerif-Regular.ttf";
const SERIF_FACES: &[FaceFile] = &[
    FaceFile {
        file: SERIF_REGULAR,
        slots: &[(400, false), (700, false)],
    },
    FaceFile {
        file: "InstrumentSerif-Italic.ttf",
        slots: &[(400, true), (700, true)],
    },
];

const SANS_REGULAR: &str = "DMSans-Regular.ttf";
const SANS_FACES: &[FaceFile] = &[
    FaceFile {
        file: SANS_REGULAR,
        slots: &[(400, false)],
    },
    FaceFile {
        file: "DMSans-Bold.ttf",
        slots: &[(700, false)],
    },
    FaceFile {
        file: "DMSans-Italic.ttf",
        slots: &[(400, true)],
    },
    FaceFile {
        file: "DMSans-BoldItalic.ttf",
        slots: &[(700, true)],
    },
    FaceFile {
        file: "DMSans-Light.ttf",
        slots: &[(300, false)],
    },
    FaceFile {
        file: "DMSans-Medium.ttf",
        slots: &[(500, false)],
    },
];

/// Which families ended up backing the theme's font roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSet {
    pub serif: String,
    pub sans: String,
    /// Whether the sans family has a distinct light weight.
    pub sans_light: bool,
}

impl Default for FontSet {
    fn default() -> Self {
        Self {
            serif: "Times".to_string(),
            sans: "Helvetica".to_string(),
            sans_light: false,
        }
    }
}

impl FontSet {
    pub fn key(&self, role: FontRole) -> FontKey {
        match role {
            FontRole::Serif => FontKey::new(&self.serif, 400, false),
            FontRole::Sans => FontKey::new(&self.sans, 400, false),
            FontRole::SansBold => FontKey::new(&self.sans, 700, false),
            FontRole::SansItalic => FontKey::new(&self.sans, 400, true),
            FontRole::SansLight if self.sans_light => FontKey::new(&self.sans, 300, false),
            FontRole::SansLight => FontKey::new(&self.sans, 400, false),
        }
    }
}

/// Shared font context used by layout and PDF serialization.
/// Provides text measurement with real glyph metrics.
pub struct FontContext {
    registry: FontRegistry,
    set: FontSet,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// A context with only the standard fonts.
    pub fn new() -> Self {
        Self {
            registry: FontRegistry::new(),
            set: FontSet::default(),
        }
    }

    /// Load the brief's faces from `dir`, falling back per family.
    ///
    /// A family is used only if its regular face exists. Any other missing
    /// face of that family is filled with the regular one. Nothing here is
    /// fatal: an absent directory just means standard fonts throughout.
    pub fn load_dir(dir: &Path) -> Self {
        let mut ctx = Self::new();

        if load_family(&mut ctx.registry, dir, SERIF_FAMILY, SERIF_REGULAR, SERIF_FACES) {
            ctx.set.serif = SERIF_FAMILY.to_string();
            info!("Registered {} fonts", SERIF_FAMILY);
        } else {
            warn!(
                "{} not found at {}, using Times",
                SERIF_FAMILY,
                dir.join(SERIF_REGULAR).display()
            );
        }

        if load_family(&mut ctx.registry, dir, SANS_FAMILY, SANS_REGULAR, SANS_FACES) {
            ctx.set.sans = SANS_FAMILY.to_string();
            ctx.set.sans_light = true;
            info!("Registered {} fonts", SANS_FAMILY);
        } else {
            warn!(
                "{} not found at {}, using Helvetica",
                SANS_FAMILY,
                dir.join(SANS_REGULAR).display()
            );
        }

        ctx
    }

    /// The families backing each font role.
    pub fn font_set(&self) -> &FontSet {
        &self.set
    }

    /// Registry key for a role.
    pub fn key(&self, role: FontRole) -> FontKey {
        self.set.key(role)
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, key: &FontKey, font_size: f64) -> f64 {
        match self.registry.resolve(key) {
            FontData::Standard(std_font) => std_font.metrics().char_width(ch, font_size),
            FontData::Custom {
                metrics: Some(m), ..
            } => m.char_width(ch, font_size),
            FontData::Custom { metrics: None, .. } => {
                StandardFont::Helvetica.metrics().char_width(ch, font_size)
            }
        }
    }

    /// Measure the width of a string in points.
    pub fn measure_string(&self, text: &str, key: &FontKey, font_size: f64) -> f64 {
        match self.registry.resolve(key) {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font_size),
            FontData::Custom {
                metrics: Some(m), ..
            } => text.chars().map(|ch| m.char_width(ch, font_size)).sum(),
            FontData::Custom { metrics: None, .. } => StandardFont::Helvetica
                .metrics()
                .measure_string(text, font_size),
        }
    }

    /// Resolve a font key to its font data.
    pub fn resolve(&self, key: &FontKey) -> &FontData {
        self.registry.resolve(key)
    }

    /// Access the underlying font registry.
    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }
}

/// Register every face of a family found in `dir`. Returns false, leaving
/// the registry untouched, when the regular face is absent.
fn load_family(
    registry: &mut FontRegistry,
    dir: &Path,
    family: &str,
    regular: &str,
    faces: &[FaceFile],
) -> bool {
    let regular_data = match std::fs::read(dir.join(regular)) {
        Ok(data) => data,
        Err(_) => return false,
    };
    if CustomFontMetrics::from_font_data(&regular_data).is_none() {
        warn!("{} is not a usable font file", dir.join(regular).display());
        return false;
    }

    for face in faces {
        let data = if face.file == regular {
            regular_data.clone()
        } else {
            match std::fs::read(dir.join(face.file)) {
                Ok(data) if CustomFontMetrics::from_font_data(&data).is_some() => data,
                _ => {
                    warn!("{} missing or unreadable, substituting {}", face.file, regular);
                    regular_data.clone()
                }
            }
        };
        for &(weight, italic) in face.slots {
            registry.register(FontKey::new(family, weight, italic), data.clone());
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', &FontKey::helvetica(), 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.char_width('A', &FontKey::new("Helvetica", 400, false), 12.0);
        let bold = ctx.char_width('A', &FontKey::new("Helvetica", 700, false), 12.0);
        assert!(bold > regular, "Bold A should be wider than regular A");
    }

    #[test]
    fn test_font_context_fallback() {
        let ctx = FontContext::new();
        let w1 = ctx.char_width('A', &FontKey::helvetica(), 12.0);
        let w2 = ctx.char_width('A', &FontKey::new("UnknownFont", 400, false), 12.0);
        assert!((w1 - w2).abs() < 0.001);
    }

    #[test]
    fn standard_registry_holds_only_the_fallback_families() {
        let registry = FontRegistry::new();
        assert!(registry.contains(&FontKey::new("Times", 700, true)));
        assert!(!registry.contains(&FontKey::new("Courier", 400, false)));
        assert_eq!(
            registry.resolved_key(&FontKey::new("Courier", 400, false)),
            FontKey::helvetica()
        );
    }

    #[test]
    fn test_font_context_weight_resolution() {
        let ctx = FontContext::new();
        let w700 = ctx.char_width('A', &FontKey::new("Helvetica", 700, false), 12.0);
        let w800 = ctx.char_width('A', &FontKey::new("Helvetica", 800, false), 12.0);
        assert!((w700 - w800).abs() < 0.001);
    }

    #[test]
    fn light_weight_snaps_to_regular() {
        let ctx = FontContext::new();
        let key = FontKey::new("Helvetica", 300, false);
        assert_eq!(ctx.registry().resolved_key(&key), FontKey::helvetica());
    }

    #[test]
    fn missing_dir_falls_back_to_standard_families() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FontContext::load_dir(&dir.path().join("absent"));
        assert_eq!(ctx.font_set(), &FontSet::default());
        assert_eq!(ctx.key(FontRole::Serif), FontKey::new("Times", 400, false));
        assert_eq!(ctx.key(FontRole::SansBold), FontKey::new("Helvetica", 700, false));
    }

    #[test]
    fn unparseable_regular_face_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SANS_REGULAR), b"not a font").unwrap();
        let ctx = FontContext::load_dir(dir.path());
        assert_eq!(ctx.font_set().sans, "Helvetica");
        assert!(!ctx.registry().contains(&FontKey::new(SANS_FAMILY, 400, false)));
        let w = ctx.char_width(' ', &ctx.key(FontRole::Sans), 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn emphasis_raises_weight_and_sets_italic() {
        let key = FontKey::new("DMSans", 300, false).emphasized(true, true);
        assert_eq!(key, FontKey::new("DMSans", 700, true));
    }
}
