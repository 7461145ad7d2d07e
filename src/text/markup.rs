//! Inline emphasis markup.
//!
//! Content strings use a markdown-like convention: `***x***` bold italic,
//! `**x**` bold, `*x*` italic. [`to_rich_text`] turns such a string into
//! rich-text markup (`<b>`, `<i>`, escaped entities), and [`parse_spans`]
//! reads rich-text markup back into styled spans for typesetting.

use std::sync::OnceLock;

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

/// Escape the characters that are structural in rich-text markup.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

struct EmphasisRules {
    triple: Regex,
    bold: Regex,
    italic: Regex,
}

fn rules() -> &'static EmphasisRules {
    static RULES: OnceLock<EmphasisRules> = OnceLock::new();
    RULES.get_or_init(|| EmphasisRules {
        triple: Regex::new(r"\*\*\*(.+?)\*\*\*").expect("static pattern"),
        bold: Regex::new(r"\*\*(.+?)\*\*").expect("static pattern"),
        italic: Regex::new(r"\*(.+?)\*").expect("static pattern"),
    })
}

/// Fold each run of whitespace holding a line ending into one space.
/// Only `<br/>` forces a line break in markup.
fn fold_line_ends(text: &str) -> std::borrow::Cow<'_, str> {
    static LINE_END: OnceLock<Regex> = OnceLock::new();
    LINE_END
        .get_or_init(|| Regex::new(r"[ \t]*[\r\n]\s*").expect("static pattern"))
        .replace_all(text, " ")
}

/// Convert raw content text to rich-text markup.
///
/// Escapes first, then substitutes triple emphasis, bold, and italic in that
/// order; each pass is non-overlapping, leftmost-first. Empty input yields
/// an empty string.
pub fn to_rich_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let rules = rules();
    let escaped = escape(text);
    let text = rules.triple.replace_all(&escaped, "<b><i>${1}</i></b>");
    let text = rules.bold.replace_all(&text, "<b>${1}</b>");
    let text = rules.italic.replace_all(&text, "<i>${1}</i>");
    text.into_owned()
}

/// A run of text sharing one emphasis state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Span {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
            italic: false,
        }
    }
}

/// Parse rich-text markup into spans.
///
/// Understands `<b>`/`<strong>`, `<i>`/`<em>`, `<br/>` and XML entities;
/// other tags are dropped, keeping their text. Line endings in the text
/// are whitespace; `<br/>` is the only forced break. Mis-nested emphasis is
/// tolerated. Markup that cannot be read at all comes back as one plain span.
pub fn parse_spans(markup: &str) -> Vec<Span> {
    if markup.is_empty() {
        return Vec::new();
    }

    let wrapped = format!("<p>{}</p>", markup);
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().check_end_names = false;

    let mut spans: Vec<Span> = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"b" | b"strong" => bold += 1,
                b"i" | b"em" => italic += 1,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"b" | b"strong" => bold = bold.saturating_sub(1),
                b"i" | b"em" => italic = italic.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"br" {
                    push_text(&mut spans, "\n", bold > 0, italic > 0);
                }
            }
            Ok(Event::Text(e)) => match e.unescape() {
                Ok(text) => push_text(&mut spans, &fold_line_ends(&text), bold > 0, italic > 0),
                Err(err) => {
                    debug!("Unreadable entity in markup ({}); using raw text", err);
                    return vec![Span::plain(&fold_line_ends(markup))];
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                debug!("Unreadable markup ({}); using raw text", err);
                return vec![Span::plain(&fold_line_ends(markup))];
            }
        }
    }

    spans
}

fn push_text(spans: &mut Vec<Span>, text: &str, bold: bool, italic: bool) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = spans.last_mut() {
        if last.bold == bold && last.italic == italic {
            last.text.push_str(text);
            return;
        }
    }
    spans.push(Span {
        text: text.to_string(),
        bold,
        italic,
    });
}

/// Plain text of a markup string, emphasis dropped.
pub fn plain_text(markup: &str) -> String {
    parse_spans(markup).into_iter().map(|s| s.text).collect()
}
