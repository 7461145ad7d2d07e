//! # Text Layout
//!
//! Line breaking and text measurement over styled characters.
//!
//! Uses real font metrics from the FontContext for accurate character widths
//! and UAX#14 for break opportunities. Breaking is greedy: a line takes as
//! many characters as fit, backing up to the last break opportunity.

pub mod markup;

use crate::font::{FontContext, FontKey};
use crate::style::Color;
use markup::Span;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A styled character for multi-style line breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledChar {
    pub ch: char,
    pub font: FontKey,
    pub font_size: f64,
    pub color: Color,
}

/// A line of text from multi-style (runs) line breaking.
#[derive(Debug, Clone)]
pub struct RunBrokenLine {
    pub chars: Vec<StyledChar>,
    /// X position of each character relative to line start.
    pub char_positions: Vec<f64>,
    /// Width excluding trailing spaces.
    pub width: f64,
    /// Whether this line ended at a forced break or the end of the text.
    pub hard_end: bool,
}

/// Expand spans into styled characters on top of a base font.
pub fn styled_chars(spans: &[Span], base: &FontKey, font_size: f64, color: Color) -> Vec<StyledChar> {
    let mut out = Vec::new();
    for span in spans {
        let font = base.emphasized(span.bold, span.italic);
        out.extend(span.text.chars().map(|ch| StyledChar {
            ch,
            font: font.clone(),
            font_size,
            color,
        }));
    }
    out
}

/// Distance from the top of a line box to its baseline.
pub fn baseline_offset(leading: f64, font_size: f64) -> f64 {
    (leading + font_size) / 2.0 - font_size * 0.2
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position (i.e. "can we break before
/// char[i]?"). Index 0 is always `None` (no break before the first char).
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields (byte_offset, opportunity) where byte_offset is the
    // position AFTER the break, i.e. the start of the next segment.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        let mut char_idx = 0;
        for (byte_idx, _) in text.char_indices() {
            map[byte_idx] = char_idx;
            char_idx += 1;
        }
        map[text.len()] = char_idx;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// End of the line content in `chars[..end]`, dropping one trailing line
/// terminator. CR LF counts as a single terminator.
fn content_end(chars: &[StyledChar], end: usize) -> usize {
    match &chars[..end] {
        [.., cr, lf] if cr.ch == '\r' && lf.ch == '\n' => end - 2,
        [.., last] if is_newline(last.ch) => end - 1,
        _ => end,
    }
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break multi-style text into lines that fit within `max_width`.
    ///
    /// A word wider than `max_width` is split at the character that
    /// overflows. Empty input yields no lines.
    pub fn break_runs_into_lines(
        &self,
        font_context: &FontContext,
        chars: &[StyledChar],
        max_width: f64,
    ) -> Vec<RunBrokenLine> {
        if chars.is_empty() {
            return Vec::new();
        }

        let char_widths: Vec<f64> = chars
            .iter()
            .map(|sc| font_context.char_width(sc.ch, &sc.font, sc.font_size))
            .collect();

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        let plain_text: String = chars.iter().map(|sc| sc.ch).collect();
        let break_opps = compute_break_opportunities(&plain_text);

        for (i, sc) in chars.iter().enumerate() {
            let char_width = char_widths[i];

            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        let end = content_end(chars, i).max(line_start);
                        lines.push(self.make_run_line(
                            &chars[line_start..end],
                            &char_widths[line_start..end],
                            true,
                        ));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        last_break_point = Some(i - 1);
                    }
                    None => {}
                }
            }

            // Already handled by the mandatory break above
            if is_newline(sc.ch) {
                continue;
            }

            if line_width + char_width > max_width && line_start < i {
                if let Some(bp) = last_break_point {
                    if bp >= line_start {
                        let break_at = bp + 1;
                        lines.push(self.make_run_line(
                            &chars[line_start..break_at],
                            &char_widths[line_start..break_at],
                            false,
                        ));
                        line_start = break_at;
                        line_width = char_widths[line_start..=i]
                            .iter()
                            .zip(&chars[line_start..=i])
                            .filter(|(_, sc)| !is_newline(sc.ch))
                            .map(|(w, _)| w)
                            .sum();
                        last_break_point = None;
                        continue;
                    }
                }

                lines.push(self.make_run_line(
                    &chars[line_start..i],
                    &char_widths[line_start..i],
                    false,
                ));
                line_start = i;
                line_width = char_width;
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        let tail_end = content_end(chars, chars.len());
        if line_start < tail_end {
            lines.push(self.make_run_line(
                &chars[line_start..tail_end],
                &char_widths[line_start..tail_end],
                true,
            ));
        }

        lines
    }

    fn make_run_line(&self, chars: &[StyledChar], widths: &[f64], hard_end: bool) -> RunBrokenLine {
        let mut positions = Vec::with_capacity(chars.len());
        let mut x = 0.0;
        for &w in widths {
            positions.push(x);
            x += w;
        }

        // Trim trailing spaces from width calculation
        let mut effective_width = x;
        let mut i = chars.len();
        while i > 0 && chars[i - 1].ch == ' ' {
            i -= 1;
            effective_width -= widths[i];
        }

        RunBrokenLine {
            chars: chars.to_vec(),
            char_positions: positions,
            width: effective_width,
            hard_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<StyledChar> {
        styled_chars(&[Span::plain(text)], &FontKey::helvetica(), 10.0, Color::BLACK)
    }

    fn line_text(line: &RunBrokenLine) -> String {
        line.chars.iter().map(|c| c.ch).collect()
    }

    #[test]
    fn short_text_is_one_line() {
        let fonts = FontContext::new();
        let lines = TextLayout::new().break_runs_into_lines(&fonts, &chars("Hello world"), 500.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].hard_end);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let fonts = FontContext::new();
        let text = "the quick brown fox jumps over the lazy dog";
        let lines = TextLayout::new().break_runs_into_lines(&fonts, &chars(text), 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width <= 60.0 + 1e-9, "line too wide: {}", line.width);
        }
        let rejoined: String = lines.iter().map(line_text).collect();
        assert_eq!(rejoined, text);
        assert!(!lines[0].hard_end);
        assert!(lines.last().unwrap().hard_end);
    }

    #[test]
    fn newline_forces_break() {
        let fonts = FontContext::new();
        let lines = TextLayout::new().break_runs_into_lines(&fonts, &chars("one\ntwo"), 500.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "one");
        assert_eq!(line_text(&lines[1]), "two");
        assert!(lines[0].hard_end);
    }

    #[test]
    fn crlf_ends_a_line_without_leaving_a_carriage_return() {
        let fonts = FontContext::new();
        let lines = TextLayout::new().break_runs_into_lines(&fonts, &chars("one\r\ntwo\r\n"), 500.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "one");
        assert_eq!(line_text(&lines[1]), "two");
        let one = TextLayout::new().break_runs_into_lines(&fonts, &chars("one"), 500.0);
        assert_eq!(lines[0].width, one[0].width);
    }

    #[test]
    fn overlong_word_is_split() {
        let fonts = FontContext::new();
        let lines = TextLayout::new().break_runs_into_lines(&fonts, &chars("WWWWWWWWWW"), 30.0);
        assert!(lines.len() > 1);
        let rejoined: String = lines.iter().map(line_text).collect();
        assert_eq!(rejoined, "WWWWWWWWWW");
    }

    #[test]
    fn empty_text_has_no_lines() {
        let fonts = FontContext::new();
        assert!(TextLayout::new().break_runs_into_lines(&fonts, &[], 100.0).is_empty());
    }

    #[test]
    fn emphasis_changes_font_per_char() {
        let spans = markup::parse_spans("a<b>b</b>");
        let sc = styled_chars(&spans, &FontKey::helvetica(), 9.0, Color::BLACK);
        assert_eq!(sc[0].font.weight, 400);
        assert_eq!(sc[1].font.weight, 700);
    }
}
