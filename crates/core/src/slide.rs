//! Slide specifications produced by the mapper and consumed by deck writers.

use serde::{Deserialize, Serialize};

/// Position and size of a block, in percent of the slide area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Frame {
    /// Create a frame from percentages.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The same frame moved down by `dy` percent.
    pub fn shifted_down(self, dy: f64) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// What the writer does when text overflows its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFit {
    /// Let the text overflow.
    #[default]
    None,
    /// Shrink the font until the text fits.
    Shrink,
}

/// Font and paragraph attributes of a text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Font size in points.
    pub font_size: f64,
    /// Hex RGB colour without `#`, e.g. `3498DB`.
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub align: Align,
    pub fit: TextFit,
    /// Typeface, or the theme default when `None`.
    pub font_face: Option<String>,
}

impl TextStyle {
    /// Plain left-aligned text in the given size and colour.
    pub fn new(font_size: f64, color: impl Into<String>) -> Self {
        Self {
            font_size,
            color: normalize_color(&color.into()),
            bold: false,
            italic: false,
            underline: false,
            align: Align::Left,
            fit: TextFit::None,
            font_face: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn shrink_to_fit(mut self) -> Self {
        self.fit = TextFit::Shrink;
        self
    }

    pub fn with_font_face(mut self, face: Option<&str>) -> Self {
        self.font_face = face.map(str::to_string);
        self
    }
}

/// Strip a leading `#` and upper-case a hex colour.
pub fn normalize_color(color: &str) -> String {
    color.trim().trim_start_matches('#').to_ascii_uppercase()
}

/// Encoding of embedded image bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }

    /// Get the file extension for this image format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }

    /// Detect the format from magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF8") {
            Some(Self::Gif)
        } else {
            None
        }
    }
}

/// Where an image block gets its pixels from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ImageSource {
    /// A remote image the deck links to.
    Url { url: String },
    /// Image bytes stored inside the deck.
    Embedded {
        #[serde(skip)]
        bytes: Vec<u8>,
        format: ImageFormat,
    },
}

/// A text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub frame: Frame,
    pub style: TextStyle,
}

/// A picture block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub source: ImageSource,
    pub frame: Frame,
    /// Alternative text for the picture.
    pub alt: String,
}

/// Clickable text pointing at a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperlinkBlock {
    pub text: String,
    pub url: String,
    pub frame: Frame,
    pub style: TextStyle,
}

/// One positioned, styled unit of slide content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Block {
    Title(TextBlock),
    Subtitle(TextBlock),
    BodyText(TextBlock),
    Bullet(TextBlock),
    Image(ImageBlock),
    Hyperlink(HyperlinkBlock),
}

impl Block {
    /// The block's frame.
    pub fn frame(&self) -> Frame {
        match self {
            Block::Title(b) | Block::Subtitle(b) | Block::BodyText(b) | Block::Bullet(b) => b.frame,
            Block::Image(b) => b.frame,
            Block::Hyperlink(b) => b.frame,
        }
    }

    /// Visible text, if the block carries any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Title(b) | Block::Subtitle(b) | Block::BodyText(b) | Block::Bullet(b) => {
                Some(&b.text)
            }
            Block::Hyperlink(b) => Some(&b.text),
            Block::Image(_) => None,
        }
    }
}

/// The ordered blocks of one slide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    pub blocks: Vec<Block>,
}

impl SlideSpec {
    /// Create an empty slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// The text of the first title block.
    pub fn title(&self) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Title(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    /// Whether the slide carries a picture.
    pub fn has_image(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, Block::Image(_)))
    }

    /// Iterate over the bullet blocks.
    pub fn bullets(&self) -> impl Iterator<Item = &TextBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Bullet(t) => Some(t),
            _ => None,
        })
    }

    /// Iterate over the body-text blocks.
    pub fn body_texts(&self) -> impl Iterator<Item = &TextBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::BodyText(t) => Some(t),
            _ => None,
        })
    }

    /// Iterate over the hyperlink blocks.
    pub fn hyperlinks(&self) -> impl Iterator<Item = &HyperlinkBlock> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Hyperlink(h) => Some(h),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#3498db"), "3498DB");
        assert_eq!(normalize_color("333333"), "333333");
    }

    #[test]
    fn test_detect_image_format() {
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::detect(&[0x89, b'P', b'N', b'G', 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::detect(b"<html>"), None);
    }

    #[test]
    fn test_slide_accessors() {
        let mut slide = SlideSpec::new();
        let style = TextStyle::new(28.0, "#000000").bold();
        slide.push(Block::Title(TextBlock {
            text: "Cells".to_string(),
            frame: Frame::new(5.0, 5.0, 90.0, 10.0),
            style: style.clone(),
        }));
        slide.push(Block::Bullet(TextBlock {
            text: "a".to_string(),
            frame: Frame::new(8.0, 22.0, 84.0, 8.0),
            style,
        }));
        assert_eq!(slide.title(), Some("Cells"));
        assert_eq!(slide.bullets().count(), 1);
        assert!(!slide.has_image());
    }
}
