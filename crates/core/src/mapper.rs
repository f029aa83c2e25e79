//! Mapping of placards to slide specifications.
//!
//! Produces one title slide from the presentation metadata followed by one
//! slide per placard, in input order. Video placards get a thumbnail and a
//! watch link; text placards become bullets, body text with a reference list,
//! or plain body text.

use crate::error::Result;
use crate::links::LinkNormalizer;
use crate::slide::{
    Block, Frame, HyperlinkBlock, ImageBlock, ImageSource, SlideSpec, TextBlock, TextStyle,
};
use crate::theme::Theme;
use crate::types::{Placard, PlacardKind, PresentationMetadata};
use crate::video;

/// Body text shown when a placard has no content.
pub const EMPTY_PLACARD_MESSAGE: &str = "No content available for this slide.";

/// Header placed above the reference list.
pub const REFERENCES_HEADER: &str = "References:";

/// Leading characters that mark a line as a list item.
const BULLET_MARKERS: &[char] = &['-', '•'];

const DECK_TITLE_FRAME: Frame = Frame::new(5.0, 40.0, 90.0, 15.0);
const DECK_SUBTITLE_FRAME: Frame = Frame::new(5.0, 55.0, 90.0, 10.0);
const SLIDE_TITLE_FRAME: Frame = Frame::new(5.0, 5.0, 90.0, 10.0);
const THUMBNAIL_FRAME: Frame = Frame::new(15.0, 22.0, 70.0, 40.0);
const WATCH_LINK_FRAME: Frame = Frame::new(10.0, 65.0, 80.0, 5.0);
const DESCRIPTION_FRAME: Frame = Frame::new(10.0, 72.0, 80.0, 20.0);
const PLACEHOLDER_FRAME: Frame = Frame::new(10.0, 45.0, 80.0, 10.0);
const FIRST_BULLET_FRAME: Frame = Frame::new(8.0, 22.0, 84.0, 8.0);
const LINKED_BODY_FRAME: Frame = Frame::new(8.0, 22.0, 84.0, 60.0);
const REFERENCES_FRAME: Frame = Frame::new(8.0, 82.0, 84.0, 5.0);
const FIRST_REFERENCE_FRAME: Frame = Frame::new(8.0, 87.0, 84.0, 4.0);
const REFERENCE_STEP: f64 = 4.0;
const BODY_FRAME: Frame = Frame::new(8.0, 22.0, 84.0, 70.0);

/// Slides produced for one export.
#[derive(Debug, Clone, Default)]
pub struct SlidePlan {
    /// Title slide followed by one slide per mapped placard.
    pub slides: Vec<SlideSpec>,

    /// Placards that could not be extracted and were left out.
    pub skipped: usize,
}

/// Converts placards into slide specifications.
#[derive(Debug, Clone)]
pub struct SlideMapper {
    theme: Theme,
    normalizer: LinkNormalizer,
    /// Vertical distance between bullet lines, in percent.
    bullet_step: f64,
}

impl Default for SlideMapper {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            normalizer: LinkNormalizer::new(),
            bullet_step: 8.0,
        }
    }
}

impl SlideMapper {
    /// Create a mapper with the classic theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the vertical distance between bullets (at least 1%).
    pub fn with_bullet_step(mut self, step: f64) -> Self {
        self.bullet_step = step.max(1.0);
        self
    }

    /// The theme in use.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Map the metadata and every successfully extracted placard.
    ///
    /// Extraction failures are logged and skipped; the remaining placards
    /// still produce their slides.
    pub fn map_all<I>(&self, metadata: &PresentationMetadata, placards: I) -> SlidePlan
    where
        I: IntoIterator<Item = Result<Placard>>,
    {
        let mut plan = SlidePlan {
            slides: vec![self.map_metadata(metadata)],
            skipped: 0,
        };

        for (index, placard) in placards.into_iter().enumerate() {
            match placard {
                Ok(placard) => {
                    log::debug!("Processing placard {}: {}", index + 1, placard.title);
                    plan.slides.push(self.map_placard(&placard));
                }
                Err(e) => {
                    log::warn!("Skipping placard {}: {}", index, e);
                    plan.skipped += 1;
                }
            }
        }

        plan
    }

    /// Build the title slide.
    pub fn map_metadata(&self, metadata: &PresentationMetadata) -> SlideSpec {
        let mut slide = SlideSpec::new();
        slide.push(Block::Title(TextBlock {
            text: metadata.display_title().to_string(),
            frame: DECK_TITLE_FRAME,
            style: self.heading_style(44.0).centered().shrink_to_fit(),
        }));
        slide.push(Block::Subtitle(TextBlock {
            text: metadata.grade_line(),
            frame: DECK_SUBTITLE_FRAME,
            style: TextStyle::new(24.0, &self.theme.subtitle)
                .centered()
                .with_font_face(self.theme.body_font.as_deref()),
        }));
        slide
    }

    /// Build the slide for one placard.
    pub fn map_placard(&self, placard: &Placard) -> SlideSpec {
        let mut slide = SlideSpec::new();
        slide.push(Block::Title(TextBlock {
            text: placard.title.clone(),
            frame: SLIDE_TITLE_FRAME,
            style: self.heading_style(28.0).shrink_to_fit(),
        }));

        match &placard.kind {
            PlacardKind::Video(embed) => match embed.video_id.as_deref() {
                Some(video_id) => self.push_video(&mut slide, video_id, &embed.description),
                None => {
                    log::debug!(
                        "Unparseable video embed '{}', using text layout",
                        embed.src
                    );
                    self.push_text(&mut slide, &placard.raw_body);
                }
            },
            PlacardKind::Text => self.push_text(&mut slide, &placard.raw_body),
        }

        slide
    }

    fn push_video(&self, slide: &mut SlideSpec, video_id: &str, description: &str) {
        let watch_url = video::watch_url(video_id);

        slide.push(Block::Image(ImageBlock {
            source: ImageSource::Url {
                url: video::thumbnail_url(video_id),
            },
            frame: THUMBNAIL_FRAME,
            alt: format!("Video thumbnail for {}", watch_url),
        }));
        slide.push(Block::Hyperlink(HyperlinkBlock {
            text: watch_url.clone(),
            url: watch_url,
            frame: WATCH_LINK_FRAME,
            style: self.link_style(),
        }));

        let description = description.trim();
        if !description.is_empty() {
            slide.push(Block::BodyText(TextBlock {
                text: description.to_string(),
                frame: DESCRIPTION_FRAME,
                style: self.body_style(14.0),
            }));
        }
    }

    fn push_text(&self, slide: &mut SlideSpec, raw_body: &str) {
        let content = raw_body.trim();

        if content.is_empty() {
            slide.push(Block::BodyText(TextBlock {
                text: EMPTY_PLACARD_MESSAGE.to_string(),
                frame: PLACEHOLDER_FRAME,
                style: TextStyle::new(18.0, &self.theme.subtitle)
                    .italic()
                    .centered()
                    .with_font_face(self.theme.body_font.as_deref()),
            }));
            return;
        }

        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.iter().any(|line| line.starts_with(BULLET_MARKERS)) {
            self.push_bullets(slide, &lines);
            return;
        }

        let normalized = self.normalizer.normalize(content);
        if normalized.has_links() {
            slide.push(Block::BodyText(TextBlock {
                text: normalized.text,
                frame: LINKED_BODY_FRAME,
                style: self.body_style(18.0),
            }));
            slide.push(Block::BodyText(TextBlock {
                text: REFERENCES_HEADER.to_string(),
                frame: REFERENCES_FRAME,
                style: self.body_style(18.0).bold(),
            }));
            for (idx, link) in normalized.links.iter().enumerate() {
                slide.push(Block::Hyperlink(HyperlinkBlock {
                    text: format!("{}. {}", idx + 1, link.display_text),
                    url: link.url.clone(),
                    frame: FIRST_REFERENCE_FRAME.shifted_down(idx as f64 * REFERENCE_STEP),
                    style: self.link_style(),
                }));
            }
        } else {
            slide.push(Block::BodyText(TextBlock {
                text: content.to_string(),
                frame: BODY_FRAME,
                style: self.body_style(18.0),
            }));
        }
    }

    fn push_bullets(&self, slide: &mut SlideSpec, lines: &[&str]) {
        let items = lines
            .iter()
            .map(|line| strip_bullet_marker(line))
            .filter(|item| !item.is_empty());

        for (idx, item) in items.enumerate() {
            slide.push(Block::Bullet(TextBlock {
                text: item.to_string(),
                frame: FIRST_BULLET_FRAME.shifted_down(idx as f64 * self.bullet_step),
                style: self.body_style(18.0).shrink_to_fit(),
            }));
        }
    }

    fn heading_style(&self, size: f64) -> TextStyle {
        TextStyle::new(size, &self.theme.primary)
            .bold()
            .with_font_face(self.theme.heading_font.as_deref())
    }

    fn body_style(&self, size: f64) -> TextStyle {
        TextStyle::new(size, &self.theme.text).with_font_face(self.theme.body_font.as_deref())
    }

    fn link_style(&self) -> TextStyle {
        TextStyle::new(16.0, &self.theme.hyperlink)
            .underline()
            .with_font_face(self.theme.body_font.as_deref())
    }
}

/// Remove one leading list marker and the whitespace after it.
fn strip_bullet_marker(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix(BULLET_MARKERS)
        .map(str::trim_start)
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::slide::Align;

    fn mapper() -> SlideMapper {
        SlideMapper::new()
    }

    #[test]
    fn test_title_slide_uses_metadata() {
        let slide = mapper().map_metadata(&PresentationMetadata::new("Cells", "9"));
        assert_eq!(slide.blocks.len(), 2);
        match (&slide.blocks[0], &slide.blocks[1]) {
            (Block::Title(title), Block::Subtitle(subtitle)) => {
                assert_eq!(title.text, "Cells");
                assert_eq!(subtitle.text, "Grade Level: 9");
                assert_eq!(title.style.align, Align::Center);
                assert_eq!(subtitle.style.align, Align::Center);
            }
            other => panic!("unexpected blocks: {:?}", other),
        }
    }

    #[test]
    fn test_title_slide_fallbacks() {
        let slide = mapper().map_metadata(&PresentationMetadata::default());
        assert_eq!(slide.title(), Some("Educational Presentation"));
        assert_eq!(slide.blocks[1].text(), Some("Grade Level: Not specified"));
    }

    #[test]
    fn test_whitespace_body_gets_placeholder() {
        let slide = mapper().map_placard(&Placard::text("Empty", "   "));
        let bodies: Vec<_> = slide.body_texts().collect();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].text, EMPTY_PLACARD_MESSAGE);
        assert!(bodies[0].style.italic);
        assert_eq!(bodies[0].style.align, Align::Center);
        assert_eq!(slide.blocks.len(), 2);
    }

    #[test]
    fn test_bullets_stack_downwards() {
        let slide = mapper().map_placard(&Placard::text("List", "- a\n- b\n- c"));
        let bullets: Vec<_> = slide.bullets().collect();
        assert_eq!(bullets.len(), 3);
        let texts: Vec<&str> = bullets.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
        assert!(bullets[0].frame.y < bullets[1].frame.y);
        assert!(bullets[1].frame.y < bullets[2].frame.y);
        assert!(bullets.iter().all(|b| b.style.fit == crate::slide::TextFit::Shrink));
    }

    #[test]
    fn test_mixed_markers_and_plain_lines() {
        let slide = mapper().map_placard(&Placard::text(
            "Mixed",
            "Intro line\n\n• first\n-\n-   second",
        ));
        let texts: Vec<&str> = slide.bullets().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Intro line", "first", "second"]);
    }

    #[test]
    fn test_bullet_step_is_configurable() {
        let slide = mapper()
            .with_bullet_step(5.0)
            .map_placard(&Placard::text("List", "- a\n- b"));
        let ys: Vec<f64> = slide.bullets().map(|b| b.frame.y).collect();
        assert_eq!(ys, vec![22.0, 27.0]);
    }

    #[test]
    fn test_links_become_references() {
        let slide = mapper().map_placard(&Placard::text(
            "Reading",
            "Start at https://example.com/a and then https://example.org/b.",
        ));
        let bodies: Vec<_> = slide.body_texts().collect();
        assert_eq!(bodies[0].text, "Start at [Link] and then [Link].");
        assert_eq!(bodies[1].text, REFERENCES_HEADER);
        assert!(bodies[1].style.bold);

        let links: Vec<_> = slide.hyperlinks().collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].text, "1. https://example.com/a");
        assert_eq!(links[1].url, "https://example.org/b");
        assert!(links[0].frame.y < links[1].frame.y);
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let slide = mapper().map_placard(&Placard::text("Plain", "  Just words.  "));
        let bodies: Vec<_> = slide.body_texts().collect();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].text, "Just words.");
    }

    #[test]
    fn test_video_with_id() {
        let placard = Placard::video(
            "Mitosis",
            "https://www.youtube.com/embed/abc123?x=1",
            "A short overview",
            "A short overview",
        );
        let slide = mapper().map_placard(&placard);
        assert!(slide.has_image());
        let link = slide.hyperlinks().next().unwrap();
        assert_eq!(link.text, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(link.url, link.text);
        match &slide.blocks[1] {
            Block::Image(image) => assert_eq!(
                image.source,
                ImageSource::Url {
                    url: "https://img.youtube.com/vi/abc123/hqdefault.jpg".to_string()
                }
            ),
            other => panic!("expected image, got {:?}", other),
        }
        assert_eq!(
            slide.body_texts().next().map(|b| b.text.as_str()),
            Some("A short overview")
        );
    }

    #[test]
    fn test_video_without_description() {
        let placard = Placard::video("Clip", "https://www.youtube.com/embed/xyz", "", "");
        let slide = mapper().map_placard(&placard);
        assert_eq!(slide.blocks.len(), 3);
        assert_eq!(slide.body_texts().count(), 0);
    }

    #[test]
    fn test_unparseable_video_degrades_to_text() {
        let placard = Placard::video(
            "Broken",
            "https://www.youtube.com/embed/",
            "See https://example.com",
            "See https://example.com",
        );
        let slide = mapper().map_placard(&placard);
        assert!(!slide.has_image());
        assert_eq!(slide.hyperlinks().count(), 1);
    }

    #[test]
    fn test_empty_unparseable_video_is_empty_text() {
        let placard = Placard::video("Nothing", "https://www.youtube.com/embed/", "", "");
        let slide = mapper().map_placard(&placard);
        assert!(!slide.has_image());
        assert_eq!(
            slide.body_texts().next().map(|b| b.text.as_str()),
            Some(EMPTY_PLACARD_MESSAGE)
        );
    }

    #[test]
    fn test_map_all_skips_failed_placards() {
        let placards = vec![
            Ok(Placard::text("One", "first")),
            Err(Error::MissingElement {
                index: 1,
                element: "title",
            }),
            Ok(Placard::text("Three", "third")),
        ];
        let plan = mapper().map_all(&PresentationMetadata::default(), placards);
        assert_eq!(plan.slides.len(), 3);
        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.slides[1].title(), Some("One"));
        assert_eq!(plan.slides[2].title(), Some("Three"));
    }

    #[test]
    fn test_modern_theme_sets_fonts() {
        let slide = mapper()
            .with_theme(Theme::modern())
            .map_placard(&Placard::text("Styled", "body"));
        match &slide.blocks[0] {
            Block::Title(title) => {
                assert_eq!(title.style.color, "007AFF");
                assert_eq!(title.style.font_face.as_deref(), Some("SF Pro Display"));
            }
            other => panic!("expected title, got {:?}", other),
        }
    }
}
