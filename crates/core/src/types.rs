//! Domain types for placards read from a rendered teaching-materials page.

use serde::{Deserialize, Serialize};

use crate::video;

/// Title used when the presentation has no topic.
pub const DEFAULT_TOPIC: &str = "Educational Presentation";

/// Grade level shown when none was supplied.
pub const DEFAULT_GRADE_LEVEL: &str = "Not specified";

/// Presentation-wide metadata supplied alongside the placards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationMetadata {
    /// Lesson topic; drives the title slide and the output file name.
    #[serde(default)]
    pub topic: Option<String>,

    /// Grade or class level of the audience.
    #[serde(default)]
    pub grade_level: Option<String>,

    /// Subject area, written to the document properties.
    #[serde(default)]
    pub subject: Option<String>,
}

impl PresentationMetadata {
    /// Create metadata with the given topic and grade level.
    pub fn new(topic: impl Into<String>, grade_level: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            grade_level: Some(grade_level.into()),
            subject: None,
        }
    }

    /// Set the subject area.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// The topic, if present and not blank.
    pub fn topic(&self) -> Option<&str> {
        non_blank(self.topic.as_deref())
    }

    /// The grade level, if present and not blank.
    pub fn grade_level(&self) -> Option<&str> {
        non_blank(self.grade_level.as_deref())
    }

    /// The subject, if present and not blank.
    pub fn subject(&self) -> Option<&str> {
        non_blank(self.subject.as_deref())
    }

    /// Title text for the deck: the topic or the generic fallback.
    pub fn display_title(&self) -> &str {
        self.topic().unwrap_or(DEFAULT_TOPIC)
    }

    /// Subtitle text for the title slide.
    pub fn grade_line(&self) -> String {
        format!(
            "Grade Level: {}",
            self.grade_level().unwrap_or(DEFAULT_GRADE_LEVEL)
        )
    }

    /// Fill any field that is missing here from `other`.
    pub fn or(self, other: PresentationMetadata) -> Self {
        Self {
            topic: self.topic.or(other.topic),
            grade_level: self.grade_level.or(other.grade_level),
            subject: self.subject.or(other.subject),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A titled content block on the page that becomes one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placard {
    /// Trimmed title text.
    pub title: String,

    /// Text or video classification.
    pub kind: PlacardKind,

    /// Trimmed text content of the placard body.
    pub raw_body: String,
}

impl Placard {
    /// Create a text placard.
    pub fn text(title: impl Into<String>, raw_body: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            kind: PlacardKind::Text,
            raw_body: raw_body.into().trim().to_string(),
        }
    }

    /// Create a video placard from the embed source and the body text.
    ///
    /// The video id is parsed from `src`; `description` is the body text with
    /// every embedded frame removed.
    pub fn video(
        title: impl Into<String>,
        src: impl Into<String>,
        raw_body: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let src = src.into();
        let video_id = video::parse_video_id(&src);
        Self {
            title: title.into().trim().to_string(),
            kind: PlacardKind::Video(VideoEmbed {
                src,
                video_id,
                description: description.into().trim().to_string(),
            }),
            raw_body: raw_body.into().trim().to_string(),
        }
    }

    /// Whether this placard was classified as a video placard.
    pub fn is_video(&self) -> bool {
        matches!(self.kind, PlacardKind::Video(_))
    }

    /// The resolved video id, if this is a video placard with a parseable embed.
    pub fn video_id(&self) -> Option<&str> {
        match &self.kind {
            PlacardKind::Video(embed) => embed.video_id.as_deref(),
            PlacardKind::Text => None,
        }
    }
}

/// Classification of a placard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlacardKind {
    /// Free text, possibly with bullets or URLs.
    Text,
    /// Body holds an embedded video frame.
    Video(VideoEmbed),
}

/// The embedded video frame of a video placard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEmbed {
    /// Raw `src` of the frame.
    pub src: String,

    /// Id parsed from `src`; `None` when unparseable.
    pub video_id: Option<String>,

    /// Body text with the frame removed.
    pub description: String,
}

/// A URL pulled out of placard text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedLink {
    /// The URL with trailing punctuation removed.
    pub url: String,

    /// Shortened label, at most 40 characters.
    pub display_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_fallbacks() {
        let metadata = PresentationMetadata::default();
        assert_eq!(metadata.display_title(), "Educational Presentation");
        assert_eq!(metadata.grade_line(), "Grade Level: Not specified");
    }

    #[test]
    fn test_blank_topic_is_absent() {
        let metadata = PresentationMetadata::new("   ", "9");
        assert_eq!(metadata.topic(), None);
        assert_eq!(metadata.grade_line(), "Grade Level: 9");
    }

    #[test]
    fn test_metadata_or_keeps_explicit_values() {
        let explicit = PresentationMetadata {
            topic: Some("Cells".to_string()),
            ..Default::default()
        };
        let merged = explicit.or(PresentationMetadata::new("Atoms", "7"));
        assert_eq!(merged.topic(), Some("Cells"));
        assert_eq!(merged.grade_level(), Some("7"));
    }

    #[test]
    fn test_video_placard_parses_id() {
        let placard = Placard::video(
            "Mitosis",
            "https://www.youtube.com/embed/abc123?rel=0",
            "Watch this",
            "Watch this",
        );
        assert!(placard.is_video());
        assert_eq!(placard.video_id(), Some("abc123"));
    }

    #[test]
    fn test_text_placard_is_trimmed() {
        let placard = Placard::text("  Intro ", "\n body \n");
        assert_eq!(placard.title, "Intro");
        assert_eq!(placard.raw_body, "body");
        assert_eq!(placard.video_id(), None);
    }
}
