//! # Content Assembly
//!
//! Turns a [`ContentDocument`] into the ordered block sequence the
//! compositor lays out. This is a pure mapping: nothing here measures or
//! draws, and the same document always gives the same blocks.
//!
//! Section order is fixed: cover, persuasion profile, the meeting guide
//! (behind its own divider page, only when the guide has a known shape),
//! then sources. Every string from the document goes through the emphasis
//! transform before it lands in a block.

use log::debug;

use crate::config::{Brand, RenderConfig, Styles, Theme};
use crate::layout::blocks::{Card, Column, DualColumnList, Paragraph};
use crate::layout::{BarWidth, Block};
use crate::model::{BeatGuide, ContentDocument, LegacyGuide, MeetingGuide, ParagraphKind};
use crate::style::{Color, ParagraphStyle};
use crate::templates::{CONTENT, DIVIDER};
use crate::text::markup::{escape, to_rich_text};

/// Build the full block sequence for a brief.
pub fn assemble(doc: &ContentDocument, config: &RenderConfig) -> Vec<Block> {
    let mut assembler = Assembler::new(&config.theme, &config.brand);
    assembler.cover(doc);
    assembler.profile(doc);
    if let Some(guide) = &doc.meeting_guide {
        assembler.meeting_guide(guide);
    }
    assembler.sources(doc);
    debug!("Assembled {} blocks", assembler.blocks.len());
    assembler.blocks
}

struct Assembler<'a> {
    theme: &'a Theme,
    brand: &'a Brand,
    styles: Styles,
    blocks: Vec<Block>,
}

impl<'a> Assembler<'a> {
    fn new(theme: &'a Theme, brand: &'a Brand) -> Self {
        Self {
            theme,
            brand,
            styles: theme.styles(),
            blocks: Vec::new(),
        }
    }

    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn spacer(&mut self, height: f64) {
        self.push(Block::Spacer(height));
    }

    fn para(&mut self, markup: String, style: ParagraphStyle) {
        self.push(Block::paragraph(markup, style));
    }

    fn callout(&mut self, markup: String, accent: Color) {
        self.push(Block::callout(markup, self.styles.insight, accent));
    }

    /// Accent line plus serif heading: the opening of every subsection.
    fn heading(&mut self, title: &str, accent: Color) {
        self.push(Block::AccentLine { color: accent });
        self.para(to_rich_text(title), self.styles.heading);
    }

    fn new_page(&mut self, template: &str) {
        self.push(Block::switch_to(template));
        self.push(Block::PageBreak);
    }

    fn bullets(&mut self, marker: &str, items: &[String]) {
        for item in items {
            self.para(format!("{}  {}", marker, to_rich_text(item)), self.styles.bullet);
        }
    }

    fn cover(&mut self, doc: &ContentDocument) {
        let s = self.styles.clone();
        let m = self.theme.metrics;
        self.spacer(self.theme.page.height * 0.35);
        self.para(escape(&self.brand.cover_overline), s.cover_overline);
        self.para(to_rich_text(&doc.donor_name), s.cover_name);
        self.para(escape(&self.brand.cover_subtitle), s.cover_subtitle);
        self.push(Block::GradientBar {
            width: BarWidth::Fixed(m.gradient_rule_width),
            height: m.gradient_rule_height,
        });
        self.spacer(16.0);

        if let Some(prepared_for) = &doc.prepared_for {
            self.para(
                format!("<b>Prepared for</b>  {}", to_rich_text(prepared_for)),
                s.cover_meta,
            );
        }
        self.para(format!("<b>Date</b>  {}", to_rich_text(&doc.date)), s.cover_meta);
        self.para(
            format!("<b>Classification</b>  {}", escape(&self.brand.classification)),
            s.cover_meta,
        );
        self.para(
            format!("<b>Sources</b>  {} verified references", doc.source_count),
            s.cover_meta,
        );
    }

    fn profile(&mut self, doc: &ContentDocument) {
        let accent = self.theme.palette.purple;
        self.new_page(CONTENT);

        for (i, section) in doc.sections.iter().enumerate() {
            if i > 0 {
                self.spacer(12.0);
            }
            self.heading(&section.title, accent);

            for paragraph in &section.paragraphs {
                let markup = to_rich_text(&paragraph.content);
                match paragraph.kind {
                    ParagraphKind::Insight => {
                        self.spacer(4.0);
                        self.callout(markup, accent);
                        self.spacer(4.0);
                    }
                    ParagraphKind::Bold => self.para(markup, self.styles.body_bold),
                    ParagraphKind::Text => self.para(markup, self.styles.body),
                }
            }
        }
    }

    fn meeting_guide(&mut self, guide: &MeetingGuide) {
        self.divider("2", "Meeting Guide");
        self.new_page(CONTENT);
        match guide {
            MeetingGuide::Beats(g) => self.beat_guide(g),
            MeetingGuide::Legacy(g) => self.legacy_guide(g),
        }
    }

    fn divider(&mut self, number: &str, title: &str) {
        let s = self.styles.clone();
        self.new_page(DIVIDER);
        self.spacer(self.theme.page.height * 0.38);
        let spaced: Vec<String> = number.chars().map(String::from).collect();
        self.para(
            format!("S E C T I O N   {}", spaced.join(" ")),
            s.section_overline.colored(self.theme.palette.green_light),
        );
        self.para(escape(title), s.section_title);
        self.para(escape(&self.brand.guide_description), s.section_desc);
    }

    fn beat_guide(&mut self, g: &BeatGuide) {
        let s = self.styles.clone();
        let p = &self.theme.palette;
        let (accent, coral) = (p.green, p.coral);

        if !g.setup_groups.is_empty() {
            self.heading("Setup", accent);
            for group in &g.setup_groups {
                self.spacer(6.0);
                self.para(format!("<b>{}</b>", to_rich_text(&group.heading)), s.body_bold);
                self.bullets("\u{2014}", &group.bullets);
            }
        }

        if !g.beats.is_empty() {
            self.spacer(16.0);
            self.heading("The Arc", accent);
            for beat in &g.beats {
                self.spacer(10.0);
                let number = beat.number.as_ref().map(|n| n.to_string()).unwrap_or_default();
                self.para(
                    format!("<b>Beat {}:</b> {}", escape(&number), to_rich_text(&beat.title)),
                    s.card_title,
                );
                if !beat.goal.is_empty() {
                    self.para(format!("<i>{}</i>", to_rich_text(&beat.goal)), s.body_italic);
                }
                self.spacer(4.0);
                if !beat.start.is_empty() {
                    self.para(format!("<b>START.</b> {}", to_rich_text(&beat.start)), s.body);
                }
                if !beat.stay.is_empty() {
                    let stay = to_rich_text(&beat.stay).replace("\n\n", "<br/><br/>");
                    self.para(format!("<b>STAY.</b> {}", stay), s.body);
                }
                if !beat.stalling_text.is_empty() {
                    self.spacer(2.0);
                    self.callout(
                        format!("<b>Stalling:</b> {}", to_rich_text(&beat.stalling_text)),
                        coral,
                    );
                }
                if !beat.continue_text.is_empty() {
                    self.para(
                        format!("<b>CONTINUE.</b> {}", to_rich_text(&beat.continue_text)),
                        s.body,
                    );
                }
            }
        }

        if !g.tripwires.is_empty() {
            self.spacer(16.0);
            self.heading("Tripwires", coral);
            for tripwire in &g.tripwires {
                self.spacer(6.0);
                self.para(format!("<b>{}.</b>", to_rich_text(&tripwire.name)), s.body_bold);
                if !tripwire.tell.is_empty() {
                    self.para(format!("<i>Tell:</i> {}", to_rich_text(&tripwire.tell)), s.body);
                }
                if !tripwire.recovery.is_empty() {
                    self.para(
                        format!("<i>Recovery:</i> {}", to_rich_text(&tripwire.recovery)),
                        s.body,
                    );
                }
            }
        }

        if !g.one_line.is_empty() {
            self.spacer(16.0);
            self.heading("One Line", accent);
            self.spacer(4.0);
            self.callout(format!("<i>{}</i>", to_rich_text(&g.one_line)), accent);
        }
    }

    fn legacy_guide(&mut self, g: &LegacyGuide) {
        let s = self.styles.clone();
        let p = self.theme.palette.clone();
        let (accent, coral) = (p.green, p.coral);

        if let Some(read) = &g.donor_read {
            self.heading("The Donor Read", accent);
            if !read.posture.is_empty() {
                self.para(to_rich_text(&read.posture), s.body_bold);
            }
            for body in &read.body {
                self.para(to_rich_text(body), s.body);
            }
        }

        if !g.lights_up.is_empty() {
            self.spacer(12.0);
            self.heading("What Lights Them Up", accent);
            for item in &g.lights_up {
                self.para(format!("<b>{}</b>", to_rich_text(&item.title)), s.body_bold);
                self.para(to_rich_text(&item.body), s.body);
            }
        }

        if !g.shuts_down.is_empty() {
            self.spacer(12.0);
            self.heading("What Shuts Them Down", coral);
            self.bullets("\u{2022}", &g.shuts_down);
        }

        if let Some(map) = &g.alignment_map {
            self.spacer(12.0);
            self.heading("Alignment Map", accent);
            for item in map.primary.iter().chain(map.secondary.iter()) {
                self.para(format!("<b>{}</b>", to_rich_text(&item.title)), s.body_bold);
                self.para(to_rich_text(&item.body), s.body);
            }
            for text in [&map.fight_or_build, &map.hands_on_wheel] {
                if !text.is_empty() {
                    self.spacer(4.0);
                    self.callout(to_rich_text(text), accent);
                }
            }
            if !map.five_min_collapse.is_empty() {
                self.spacer(8.0);
                self.callout(
                    format!("<b>5 MIN COLLAPSE:</b> {}", to_rich_text(&map.five_min_collapse)),
                    coral,
                );
            }
        }

        if let Some(arc) = &g.meeting_arc {
            self.spacer(12.0);
            self.heading("Meeting Arc", accent);
            if !arc.intro.is_empty() {
                self.para(to_rich_text(&arc.intro), s.body);
            }
            for mv in &arc.moves {
                self.spacer(8.0);
                let title = match &mv.number {
                    Some(n) => format!("{}. {}", escape(&n.to_string()), to_rich_text(&mv.title)),
                    None => to_rich_text(&mv.title),
                };
                self.push(Block::Card(Card::new(
                    Paragraph::new(title, s.card_title),
                    Paragraph::new(to_rich_text(&mv.move_text), s.card_body),
                    "THE READ",
                    Paragraph::new(to_rich_text(&mv.read_text), s.card_read),
                    accent,
                )));
            }
        }

        if let Some(room) = &g.reading_room {
            self.spacer(12.0);
            self.heading("Reading the Room", accent);
            self.push(Block::DualColumn(DualColumnList::new(
                Column {
                    header: "WORKING".to_string(),
                    marker: '\u{2713}',
                    items: room.working.clone(),
                    color: p.green,
                    tint: p.working_tint,
                },
                Column {
                    header: "STALLING".to_string(),
                    marker: '\u{2717}',
                    items: room.stalling.clone(),
                    color: p.coral,
                    tint: p.stalling_tint,
                },
            )));
        }

        if !g.reset_moves.is_empty() {
            self.spacer(12.0);
            self.heading("Reset Moves", coral);
            self.bullets("\u{2022}", &g.reset_moves);
        }
    }

    fn sources(&mut self, doc: &ContentDocument) {
        let s = self.styles.clone();
        let cap = self.theme.metrics.sources_cap;
        self.new_page(CONTENT);
        self.heading(&format!("{} Research Sources", doc.sources.len()), self.theme.palette.coral);
        self.spacer(8.0);

        for (i, source) in doc.sources.iter().take(cap).enumerate() {
            self.para(
                format!("<b>{}.</b>  {}", i + 1, escape(source.display_title())),
                s.source_title,
            );
            self.para(escape(&source.domain()), s.source_domain);
            self.spacer(6.0);
        }

        if doc.sources.len() > cap {
            self.spacer(8.0);
            self.para(
                format!("+ {} additional sources", doc.sources.len() - cap),
                s.source_domain,
            );
        }
    }
}
