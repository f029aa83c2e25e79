//! Colour themes and slide layouts.

use serde::{Deserialize, Serialize};

/// Colours and typefaces applied by the slide mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Titles.
    pub primary: String,
    /// Body text.
    pub text: String,
    /// Subtitles and placeholders.
    pub subtitle: String,
    /// Hyperlinks.
    pub hyperlink: String,
    /// Slide background.
    pub background: String,
    /// Typeface for titles.
    pub heading_font: Option<String>,
    /// Typeface for everything else.
    pub body_font: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Blue-and-grey palette with the writer's default fonts.
    pub fn classic() -> Self {
        Self {
            primary: "#3498db".to_string(),
            text: "#333333".to_string(),
            subtitle: "#7f8c8d".to_string(),
            hyperlink: "#0068DA".to_string(),
            background: "#ffffff".to_string(),
            heading_font: None,
            body_font: None,
        }
    }

    /// System-blue palette with SF Pro typefaces.
    pub fn modern() -> Self {
        Self {
            primary: "#007AFF".to_string(),
            text: "#1D1D1F".to_string(),
            subtitle: "#86868B".to_string(),
            hyperlink: "#0068DA".to_string(),
            background: "#FFFFFF".to_string(),
            heading_font: Some("SF Pro Display".to_string()),
            body_font: Some("SF Pro Text".to_string()),
        }
    }

    /// Look up a built-in theme by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

/// Slide dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlideLayout {
    /// 10 x 5.625 inches.
    #[default]
    Standard16x9,
    /// 13.333 x 7.5 inches.
    Wide,
}

impl SlideLayout {
    /// English Metric Units per inch.
    pub const EMU_PER_INCH: i64 = 914_400;

    /// Slide width in EMU.
    pub fn width_emu(&self) -> i64 {
        match self {
            Self::Standard16x9 => 9_144_000,
            Self::Wide => 12_192_000,
        }
    }

    /// Slide height in EMU.
    pub fn height_emu(&self) -> i64 {
        match self {
            Self::Standard16x9 => 5_143_500,
            Self::Wide => 6_858_000,
        }
    }

    /// Detect a layout from its name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "16x9" | "layout_16x9" => Some(Self::Standard16x9),
            "wide" | "layout_wide" => Some(Self::Wide),
            _ => None,
        }
    }
}
