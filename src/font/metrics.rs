//! Advance widths for the standard PDF fonts, in 1/1000 em.
//!
//! Tables cover printable ASCII (0x20..=0x7E) from the Adobe AFM files.
//! A handful of typographic punctuation marks the brief uses are listed
//! separately; every other character gets the face's default width.

use super::StandardFont;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

/// Width table and fallback for one standard face.
pub struct StandardFontMetrics {
    ascii: &'static [u16; 95],
    default_width: u16,
    bold: bool,
    serif: bool,
}

impl StandardFont {
    /// Metrics for this face. Oblique/italic variants share the upright
    /// widths; Times bold and italic reuse the roman table.
    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => StandardFontMetrics {
                ascii: &HELVETICA,
                default_width: 556,
                bold: false,
                serif: false,
            },
            Self::HelveticaBold | Self::HelveticaBoldOblique => StandardFontMetrics {
                ascii: &HELVETICA_BOLD,
                default_width: 611,
                bold: true,
                serif: false,
            },
            Self::TimesRoman | Self::TimesBold | Self::TimesItalic | Self::TimesBoldItalic => {
                StandardFontMetrics {
                    ascii: &TIMES_ROMAN,
                    default_width: 500,
                    bold: false,
                    serif: true,
                }
            }
        }
    }
}

impl StandardFontMetrics {
    /// Advance width in font units (1/1000 em).
    pub fn advance(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            return self.ascii[(cp - 0x20) as usize];
        }
        self.punctuation(ch).unwrap_or(self.default_width)
    }

    fn punctuation(&self, ch: char) -> Option<u16> {
        let w = match (ch, self.serif, self.bold) {
            ('\u{00A0}', true, _) => 250,
            ('\u{00A0}', false, _) => 278,
            ('\u{00B7}', true, _) => 250,
            ('\u{00B7}', false, _) => 278,
            ('\u{2013}', true, _) => 500,
            ('\u{2013}', false, _) => 556,
            ('\u{2014}', _, _) => 1000,
            ('\u{2022}', _, _) => 350,
            ('\u{2026}', _, _) => 1000,
            ('\u{2018}' | '\u{2019}', true, _) => 333,
            ('\u{2018}' | '\u{2019}', false, false) => 222,
            ('\u{2018}' | '\u{2019}', false, true) => 278,
            ('\u{201C}' | '\u{201D}', true, _) => 444,
            ('\u{201C}' | '\u{201D}', false, false) => 333,
            ('\u{201C}' | '\u{201D}', false, true) => 500,
            _ => return None,
        };
        Some(w)
    }

    /// Width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.advance(ch) as f64 / 1000.0 * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space() {
        let m = StandardFont::Helvetica.metrics();
        assert!((m.char_width(' ', 12.0) - 3.336).abs() < 1e-9);
    }

    #[test]
    fn bold_is_wider() {
        let regular = StandardFont::Helvetica.metrics().advance('b');
        let bold = StandardFont::HelveticaBold.metrics().advance('b');
        assert!(bold > regular);
    }

    #[test]
    fn unknown_chars_use_default() {
        let m = StandardFont::TimesRoman.metrics();
        assert_eq!(m.advance('\u{4E2D}'), 500);
        assert_eq!(m.advance('\u{2014}'), 1000);
    }
}
