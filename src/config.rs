//! # Render Configuration
//!
//! Design tokens and brand strings for a brief. A [`RenderConfig`] is built
//! once (defaults, optionally overlaid from a JSON file) and then only
//! borrowed: the assembler, the blocks and the page painters all read the
//! same immutable value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::FolioError;
use crate::gradient::{check_stops, GradientStop};
use crate::style::{Align, Color, FontRole, ParagraphStyle};

/// Everything a render needs besides the content document itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Directory the custom faces are loaded from.
    pub font_dir: PathBuf,
    pub theme: Theme,
    pub brand: Brand,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from("fonts"),
            theme: Theme::default(),
            brand: Brand::default(),
        }
    }
}

impl RenderConfig {
    /// Read a config file. Fields the file leaves out keep their defaults.
    /// Gradient stops that do not run from 0 to 1 in order are rejected.
    pub fn load(path: &Path) -> Result<Self, FolioError> {
        let config_err = |reason: String| FolioError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| config_err(e.to_string()))?;
        check_stops(&config.theme.gradient.stops).map_err(config_err)?;
        Ok(config)
    }
}

/// Visual design tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Theme {
    pub palette: Palette,
    pub gradient: Gradient,
    pub page: PageGeometry,
    pub metrics: BlockMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Palette {
    pub charcoal: Color,
    pub warm_white: Color,
    pub parchment: Color,
    pub stone: Color,
    pub body_text: Color,
    pub light_gray: Color,
    pub white: Color,
    pub purple: Color,
    pub purple_light: Color,
    pub green: Color,
    pub green_light: Color,
    pub coral: Color,
    pub working_tint: Color,
    pub stalling_tint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            charcoal: Color::hex("#1A1A1A"),
            warm_white: Color::hex("#FAF8F5"),
            parchment: Color::hex("#F5F3EF"),
            stone: Color::hex("#E8E5E0"),
            body_text: Color::hex("#4A4A4A"),
            light_gray: Color::hex("#9A9A9A"),
            white: Color::WHITE,
            purple: Color::hex("#7B2D8E"),
            purple_light: Color::hex("#D894E8"),
            green: Color::hex("#2D6A4F"),
            green_light: Color::hex("#40916C"),
            coral: Color::hex("#E07A5F"),
            working_tint: Color::hex("#E8F5E9"),
            stalling_tint: Color::hex("#FBE9E7"),
        }
    }
}

/// The brand gradient and how strips of it are painted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gradient {
    pub stops: Vec<GradientStop>,
    /// Rectangles per full-width page band.
    pub band_steps: usize,
    /// Rectangles per in-flow gradient bar.
    pub bar_steps: usize,
    /// How far each rectangle reaches into its neighbour.
    pub overlap: f64,
}

impl Default for Gradient {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            stops: vec![
                GradientStop::new(0.0, palette.purple),
                GradientStop::new(0.33, palette.green),
                GradientStop::new(0.66, palette.coral),
                GradientStop::new(1.0, palette.purple),
            ],
            band_steps: 200,
            bar_steps: 100,
            overlap: 0.5,
        }
    }
}

/// Page size and margins, in points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Extra inset of the content frame above and below the margins.
    pub content_inset: f64,
    /// Padding inside every frame.
    pub frame_padding: f64,
    pub dark_band_height: f64,
    pub content_band_height: f64,
    /// Distance of the footer rule from the bottom edge.
    pub footer_rule_offset: f64,
    /// Distance of the footer baseline from the bottom edge.
    pub footer_baseline_offset: f64,
    pub footer_size: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 54.0,
            content_inset: 10.0,
            frame_padding: 6.0,
            dark_band_height: 6.0,
            content_band_height: 3.0,
            footer_rule_offset: 36.0,
            footer_baseline_offset: 24.0,
            footer_size: 7.5,
        }
    }
}

/// Fixed dimensions of the block variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockMetrics {
    pub accent_line_width: f64,
    pub accent_line_height: f64,
    /// Height of the box the accent line sits in.
    pub accent_line_box: f64,
    /// Offset of the accent line from the top of its box.
    pub accent_line_offset: f64,

    pub gradient_rule_width: f64,
    pub gradient_rule_height: f64,

    pub callout_accent_width: f64,
    pub callout_text_offset: f64,
    /// Total horizontal padding around the callout text, accent bar included.
    pub callout_horizontal_padding: f64,
    pub callout_vertical_padding: f64,
    pub corner_radius: f64,

    pub card_accent_height: f64,
    pub card_side_padding: f64,
    pub card_top_padding: f64,
    pub card_title_gap: f64,
    pub card_body_gap: f64,
    pub card_divider_height: f64,
    /// Divider to label baseline, divider included.
    pub card_divider_gap: f64,
    /// Label baseline to the top of the read text.
    pub card_label_gap: f64,
    pub card_bottom_padding: f64,
    pub card_label_size: f64,
    pub card_border_width: f64,

    pub dual_column_header: f64,
    pub dual_column_row: f64,
    pub dual_column_padding: f64,
    pub dual_column_gap: f64,
    pub dual_column_inset: f64,
    pub dual_column_header_baseline: f64,
    pub dual_column_first_row_baseline: f64,
    pub dual_column_header_size: f64,
    pub dual_column_item_size: f64,
    /// Items are cut to this many characters, marker included.
    pub dual_column_max_chars: usize,

    /// Sources listed before the remainder is summarized.
    pub sources_cap: usize,
}

impl Default for BlockMetrics {
    fn default() -> Self {
        Self {
            accent_line_width: 40.0,
            accent_line_height: 2.0,
            accent_line_box: 10.0,
            accent_line_offset: 4.0,

            gradient_rule_width: 120.0,
            gradient_rule_height: 3.0,

            callout_accent_width: 3.5,
            callout_text_offset: 16.0,
            callout_horizontal_padding: 24.0,
            callout_vertical_padding: 8.0,
            corner_radius: 4.0,

            card_accent_height: 3.0,
            card_side_padding: 16.0,
            card_top_padding: 14.0,
            card_title_gap: 8.0,
            card_body_gap: 12.0,
            card_divider_height: 1.0,
            card_divider_gap: 12.0,
            card_label_gap: 14.0,
            card_bottom_padding: 12.0,
            card_label_size: 7.5,
            card_border_width: 0.5,

            dual_column_header: 28.0,
            dual_column_row: 16.0,
            dual_column_padding: 12.0,
            dual_column_gap: 12.0,
            dual_column_inset: 10.0,
            dual_column_header_baseline: 18.0,
            dual_column_first_row_baseline: 34.0,
            dual_column_header_size: 8.0,
            dual_column_item_size: 8.0,
            dual_column_max_chars: 55,

            sources_cap: 50,
        }
    }
}

/// Paragraph styles of the brief, derived from the palette.
#[derive(Debug, Clone)]
pub struct Styles {
    pub cover_overline: ParagraphStyle,
    pub cover_name: ParagraphStyle,
    pub cover_subtitle: ParagraphStyle,
    pub cover_meta: ParagraphStyle,
    pub cover_footer: ParagraphStyle,
    pub section_overline: ParagraphStyle,
    pub section_title: ParagraphStyle,
    pub section_desc: ParagraphStyle,
    pub heading: ParagraphStyle,
    pub body: ParagraphStyle,
    pub body_bold: ParagraphStyle,
    pub body_italic: ParagraphStyle,
    pub insight: ParagraphStyle,
    pub bullet: ParagraphStyle,
    pub card_title: ParagraphStyle,
    pub card_body: ParagraphStyle,
    pub card_read: ParagraphStyle,
    pub source_title: ParagraphStyle,
    pub source_domain: ParagraphStyle,
}

impl Theme {
    pub fn styles(&self) -> Styles {
        let p = &self.palette;
        let white = p.white;
        Styles {
            cover_overline: ParagraphStyle::new(FontRole::Sans, 8.5, 12.0, p.purple_light)
                .spaced(0.0, 8.0),
            cover_name: ParagraphStyle::new(FontRole::Serif, 52.0, 58.0, white).spaced(0.0, 6.0),
            cover_subtitle: ParagraphStyle::new(
                FontRole::SansLight,
                14.0,
                20.0,
                white.with_alpha(0.6),
            )
            .spaced(0.0, 40.0),
            cover_meta: ParagraphStyle::new(FontRole::Sans, 9.0, 20.0, white.with_alpha(0.7)),
            cover_footer: ParagraphStyle::new(FontRole::Sans, 7.5, 11.0, white.with_alpha(0.25))
                .aligned(Align::Center),
            section_overline: ParagraphStyle::new(FontRole::Sans, 9.0, 14.0, p.purple_light)
                .spaced(0.0, 12.0),
            section_title: ParagraphStyle::new(FontRole::Serif, 44.0, 50.0, white)
                .spaced(0.0, 12.0),
            section_desc: ParagraphStyle::new(
                FontRole::SansLight,
                11.0,
                16.0,
                white.with_alpha(0.4),
            ),
            heading: ParagraphStyle::new(FontRole::Serif, 18.0, 24.0, p.charcoal).spaced(20.0, 8.0),
            body: ParagraphStyle::new(FontRole::Sans, 9.5, 14.0, p.body_text)
                .aligned(Align::Justify)
                .spaced(0.0, 6.0),
            body_bold: ParagraphStyle::new(FontRole::SansBold, 9.5, 14.0, p.charcoal)
                .aligned(Align::Justify)
                .spaced(0.0, 6.0),
            body_italic: ParagraphStyle::new(FontRole::SansItalic, 9.5, 14.0, p.body_text)
                .aligned(Align::Justify)
                .spaced(0.0, 6.0),
            insight: ParagraphStyle::new(FontRole::SansItalic, 9.5, 14.0, p.body_text),
            bullet: ParagraphStyle::new(FontRole::Sans, 9.5, 14.0, p.body_text)
                .indented(16.0)
                .spaced(0.0, 3.0),
            card_title: ParagraphStyle::new(FontRole::SansBold, 11.0, 15.0, p.charcoal),
            card_body: ParagraphStyle::new(FontRole::Sans, 9.0, 13.0, p.body_text),
            card_read: ParagraphStyle::new(FontRole::SansItalic, 9.0, 13.0, p.body_text),
            source_title: ParagraphStyle::new(FontRole::Sans, 7.5, 11.0, p.charcoal),
            source_domain: ParagraphStyle::new(FontRole::SansLight, 6.5, 10.0, p.light_gray),
        }
    }
}

/// Fixed strings printed on every brief.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Brand {
    pub cover_overline: String,
    pub cover_subtitle: String,
    pub classification: String,
    pub cover_footer: String,
    pub tagline: String,
    pub page_footer: String,
    pub guide_description: String,
    pub title_suffix: String,
    pub author: String,
}

impl Default for Brand {
    fn default() -> Self {
        Self {
            cover_overline: "P R O S P E C T A I   D O N O R   I N T E L L I G E N C E".to_string(),
            cover_subtitle: "Behavioral Profile & Meeting Strategy".to_string(),
            classification: "Confidential \u{2014} Internal Use Only".to_string(),
            cover_footer: "Generated by ProspectAI \u{00B7} Confidential \u{00B7} Internal Use Only"
                .to_string(),
            tagline: "Democracy Takes Work".to_string(),
            page_footer: "ProspectAI \u{00B7} Confidential".to_string(),
            guide_description: "Tactical preparation for your conversation \u{2014} what to say, \
                                when to say it, and how to read the room."
                .to_string(),
            title_suffix: "ProspectAI Donor Intelligence".to_string(),
            author: "ProspectAI / Democracy Takes Work".to_string(),
        }
    }
}
