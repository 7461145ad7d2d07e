//! # Content Document
//!
//! The input tree a brief is built from: who the donor is, the persuasion
//! profile, an optional meeting guide and the research sources.
//!
//! Parsing happens in two steps. serde reads a permissive raw form in which
//! everything is optional; [`ContentDocument::from_json`] then checks the
//! fields a brief cannot do without and resolves the meeting guide to one of
//! its known shapes. After that the document is plain data.

use std::fmt;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::FolioError;

/// A validated content document.
#[derive(Debug, Clone)]
pub struct ContentDocument {
    pub donor_name: String,
    pub date: String,
    pub source_count: u64,
    pub prepared_for: Option<String>,
    pub sections: Vec<ProfileSection>,
    /// Absent when the input had no guide or one of unknown shape.
    pub meeting_guide: Option<MeetingGuide>,
    pub sources: Vec<Source>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    donor_name: Option<String>,
    date: Option<String>,
    source_count: Option<u64>,
    prepared_for: Option<String>,
    persuasion_profile: Option<RawProfile>,
    meeting_guide: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    sources: Vec<Source>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    sections: Option<Vec<ProfileSection>>,
}

impl ContentDocument {
    /// Parse and validate a content document.
    pub fn from_json(json: &str) -> Result<Self, FolioError> {
        let raw: RawDocument = serde_json::from_str(json)?;

        let donor_name = raw.donor_name.ok_or(FolioError::MissingField("donorName"))?;
        let date = raw.date.ok_or(FolioError::MissingField("date"))?;
        let source_count = raw.source_count.ok_or(FolioError::MissingField("sourceCount"))?;
        let sections = raw
            .persuasion_profile
            .and_then(|p| p.sections)
            .ok_or(FolioError::MissingField("persuasionProfile.sections"))?;

        let meeting_guide = raw.meeting_guide.as_ref().and_then(MeetingGuide::resolve);

        Ok(Self {
            donor_name,
            date,
            source_count,
            prepared_for: raw.prepared_for.filter(|s| !s.is_empty()),
            sections,
            meeting_guide,
            sources: raw.sources,
        })
    }
}

/// A titled subsection of the persuasion profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paragraphs: Vec<ProfileParagraph>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileParagraph {
    #[serde(rename = "type", default)]
    pub kind: ParagraphKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

/// How a profile paragraph is set. Unknown tags read as plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParagraphKind {
    #[default]
    Text,
    Bold,
    Insight,
}

impl From<String> for ParagraphKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "bold" => ParagraphKind::Bold,
            "insight" => ParagraphKind::Insight,
            _ => ParagraphKind::Text,
        }
    }
}

impl From<ParagraphKind> for String {
    fn from(kind: ParagraphKind) -> Self {
        match kind {
            ParagraphKind::Text => "text",
            ParagraphKind::Bold => "bold",
            ParagraphKind::Insight => "insight",
        }
        .to_string()
    }
}

/// A research source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

impl Source {
    /// The title as given, even when empty; the URL only when the title
    /// is missing or null.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }

    /// Host of the URL (the raw URL if it has none) with every `www.`
    /// removed.
    pub fn domain(&self) -> String {
        let parsed = url::Url::parse(&self.url).ok();
        let host = parsed.as_ref().and_then(|u| u.host_str()).unwrap_or(&self.url);
        host.replace("www.", "")
    }
}

/// A number that may arrive as an integer or as text ("1", "2a").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(n) => write!(f, "{}", n),
            Label::Float(n) => write!(f, "{}", n),
            Label::Text(s) => write!(f, "{}", s),
        }
    }
}

/// The meeting guide, in one of its two content shapes.
#[derive(Debug, Clone)]
pub enum MeetingGuide {
    /// Setup groups, beats, tripwires and a closing line (`format: "v3"`).
    Beats(BeatGuide),
    /// Donor read, alignment map, move cards and room signals.
    Legacy(LegacyGuide),
}

impl MeetingGuide {
    /// Decide the shape once. `None`, with a warning, when the value matches
    /// neither shape.
    pub fn resolve(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        if value.get("format").and_then(Value::as_str) == Some("v3") {
            return match BeatGuide::deserialize(value) {
                Ok(guide) => Some(MeetingGuide::Beats(guide)),
                Err(e) => {
                    warn!("Meeting guide marked v3 could not be read ({}); skipping section", e);
                    None
                }
            };
        }
        let legacy_marker = ["donorRead", "meetingArc", "lightsUp"]
            .iter()
            .any(|key| value.get(key).map(is_truthy).unwrap_or(false));
        if legacy_marker {
            let mut pruned = value.clone();
            drop_empty_entries(&mut pruned);
            return match LegacyGuide::deserialize(&pruned) {
                Ok(guide) => Some(MeetingGuide::Legacy(guide)),
                Err(e) => {
                    warn!("Meeting guide could not be read ({}); skipping section", e);
                    None
                }
            };
        }
        warn!("Meeting guide matches no known shape; skipping section");
        None
    }
}

/// Remove object entries whose value is empty or false, descending into
/// nested objects. A section given as `{}` reads as absent.
fn drop_empty_entries(value: &mut Value) {
    if let Value::Object(map) = value {
        map.retain(|_, v| is_truthy(v));
        map.values_mut().for_each(drop_empty_entries);
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeatGuide {
    #[serde(deserialize_with = "null_as_default")]
    pub setup_groups: Vec<SetupGroup>,
    #[serde(deserialize_with = "null_as_default")]
    pub beats: Vec<Beat>,
    #[serde(deserialize_with = "null_as_default")]
    pub tripwires: Vec<Tripwire>,
    #[serde(deserialize_with = "null_as_default")]
    pub one_line: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupGroup {
    #[serde(deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Beat {
    pub number: Option<Label>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub goal: String,
    #[serde(deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stay: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stalling_text: String,
    #[serde(rename = "continue", deserialize_with = "null_as_default")]
    pub continue_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tripwire {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tell: String,
    #[serde(deserialize_with = "null_as_default")]
    pub recovery: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyGuide {
    pub donor_read: Option<DonorRead>,
    #[serde(deserialize_with = "null_as_default")]
    pub lights_up: Vec<TitledText>,
    #[serde(deserialize_with = "null_as_default")]
    pub shuts_down: Vec<String>,
    pub alignment_map: Option<AlignmentMap>,
    pub meeting_arc: Option<MeetingArc>,
    pub reading_room: Option<ReadingRoom>,
    #[serde(deserialize_with = "null_as_default")]
    pub reset_moves: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DonorRead {
    #[serde(deserialize_with = "null_as_default")]
    pub posture: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TitledText {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlignmentMap {
    pub primary: Option<TitledText>,
    #[serde(deserialize_with = "null_as_default")]
    pub secondary: Vec<TitledText>,
    #[serde(deserialize_with = "null_as_default")]
    pub fight_or_build: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hands_on_wheel: String,
    #[serde(deserialize_with = "null_as_default")]
    pub five_min_collapse: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetingArc {
    #[serde(deserialize_with = "null_as_default")]
    pub intro: String,
    #[serde(deserialize_with = "null_as_default")]
    pub moves: Vec<Move>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Move {
    pub number: Option<Label>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub move_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub read_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingRoom {
    #[serde(deserialize_with = "null_as_default")]
    pub working: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub stalling: Vec<String>,
}

/// Read `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
