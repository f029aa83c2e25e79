//! Interface to deck writers.
//!
//! The pipeline never serializes slides itself. It hands each [`SlideSpec`]
//! to a [`DeckWriter`] block by block and then asks it to save.

use crate::error::Result;
use crate::slide::{Block, Frame, ImageSource, SlideSpec, TextStyle};

/// Document-level properties of a deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckProperties {
    pub title: String,
    pub subject: String,
    pub author: String,
}

/// Extra paragraph options for a text box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextOptions<'a> {
    /// Render each line as a bulleted paragraph.
    pub bullet: bool,
    /// Make the text a link to this URL.
    pub hyperlink: Option<&'a str>,
}

/// A slide being filled by a writer.
pub trait SlideHandle {
    /// Add a text box.
    fn add_text(&mut self, text: &str, frame: Frame, style: &TextStyle, options: TextOptions<'_>);

    /// Add a picture.
    fn add_image(&mut self, source: &ImageSource, frame: Frame, alt: &str);
}

/// Serializes slides into a presentation file.
#[allow(async_fn_in_trait)]
pub trait DeckWriter {
    type Slide: SlideHandle;
    /// What a successful save returns.
    type Output;

    /// Set title, subject and author.
    fn set_properties(&mut self, _properties: DeckProperties) {}

    /// Append a new blank slide and return it.
    fn add_slide(&mut self) -> &mut Self::Slide;

    /// Serialize the deck under `file_name`.
    ///
    /// On error nothing may be left behind for the user to open.
    async fn save(self, file_name: &str) -> Result<Self::Output>;
}

/// Replay slide specifications into a writer, in order.
pub fn render_slides<W: DeckWriter>(writer: &mut W, slides: &[SlideSpec]) {
    for spec in slides {
        let slide = writer.add_slide();
        for block in &spec.blocks {
            render_block(slide, block);
        }
    }
}

fn render_block<S: SlideHandle>(slide: &mut S, block: &Block) {
    match block {
        Block::Title(text) | Block::Subtitle(text) | Block::BodyText(text) => {
            slide.add_text(&text.text, text.frame, &text.style, TextOptions::default());
        }
        Block::Bullet(text) => {
            let options = TextOptions {
                bullet: true,
                ..Default::default()
            };
            slide.add_text(&text.text, text.frame, &text.style, options);
        }
        Block::Hyperlink(link) => {
            let options = TextOptions {
                hyperlink: Some(&link.url),
                ..Default::default()
            };
            slide.add_text(&link.text, link.frame, &link.style, options);
        }
        Block::Image(image) => slide.add_image(&image.source, image.frame, &image.alt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::{HyperlinkBlock, TextBlock};

    #[derive(Default)]
    struct RecordingSlide {
        calls: Vec<String>,
    }

    impl SlideHandle for RecordingSlide {
        fn add_text(
            &mut self,
            text: &str,
            _frame: Frame,
            _style: &TextStyle,
            options: TextOptions<'_>,
        ) {
            self.calls.push(format!(
                "text:{}:{}:{}",
                text,
                options.bullet,
                options.hyperlink.unwrap_or("-")
            ));
        }

        fn add_image(&mut self, _source: &ImageSource, _frame: Frame, alt: &str) {
            self.calls.push(format!("image:{}", alt));
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        slides: Vec<RecordingSlide>,
    }

    impl DeckWriter for RecordingWriter {
        type Slide = RecordingSlide;
        type Output = Vec<Vec<String>>;

        fn add_slide(&mut self) -> &mut RecordingSlide {
            self.slides.push(RecordingSlide::default());
            self.slides.last_mut().unwrap()
        }

        async fn save(self, _file_name: &str) -> Result<Self::Output> {
            Ok(self.slides.into_iter().map(|s| s.calls).collect())
        }
    }

    #[test]
    fn test_render_slides_in_order() {
        let style = TextStyle::new(18.0, "333333");
        let frame = Frame::new(0.0, 0.0, 10.0, 10.0);
        let mut first = SlideSpec::new();
        first.push(Block::Title(TextBlock {
            text: "T".to_string(),
            frame,
            style: style.clone(),
        }));
        let mut second = SlideSpec::new();
        second.push(Block::Bullet(TextBlock {
            text: "b".to_string(),
            frame,
            style: style.clone(),
        }));
        second.push(Block::Hyperlink(HyperlinkBlock {
            text: "1. x".to_string(),
            url: "https://x.test".to_string(),
            frame,
            style,
        }));

        let mut writer = RecordingWriter::default();
        render_slides(&mut writer, &[first, second]);
        let calls = futures::executor::block_on(writer.save("deck.pptx")).unwrap();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec!["text:T:false:-"]);
        assert_eq!(
            calls[1],
            vec!["text:b:true:-", "text:1. x:false:https://x.test"]
        );
    }
}
