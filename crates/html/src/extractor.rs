//! HTML placard extractor.

use deck_core::{video, Error, Placard, PlacardSource, PresentationMetadata, Result};
use scraper::{ElementRef, Html, Node, Selector};

/// CSS selectors used to find placards and their parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// One element per placard, in document order.
    pub placard: String,
    /// Title element, searched inside the placard.
    pub title: String,
    /// Content element, searched inside the placard.
    pub content: String,
    /// Video frame, searched inside the content element.
    pub video_frame: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            placard: ".placard".to_string(),
            title: ".placard-title".to_string(),
            content: ".placard-content".to_string(),
            video_frame: r#"iframe[src*="youtube.com"]"#.to_string(),
        }
    }
}

impl ExtractorConfig {
    pub fn with_placard_selector(mut self, selector: impl Into<String>) -> Self {
        self.placard = selector.into();
        self
    }

    pub fn with_title_selector(mut self, selector: impl Into<String>) -> Self {
        self.title = selector.into();
        self
    }

    pub fn with_content_selector(mut self, selector: impl Into<String>) -> Self {
        self.content = selector.into();
        self
    }

    pub fn with_video_selector(mut self, selector: impl Into<String>) -> Self {
        self.video_frame = selector.into();
        self
    }
}

/// Compiled form of [`ExtractorConfig`].
struct Selectors {
    placard: Selector,
    title: Selector,
    content: Selector,
    video_frame: Selector,
}

impl Selectors {
    fn compile(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            placard: parse_selector(&config.placard)?,
            title: parse_selector(&config.title)?,
            content: parse_selector(&config.content)?,
            video_frame: parse_selector(&config.video_frame)?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::SelectorError {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Placards read from a rendered HTML page.
#[derive(Debug, Clone)]
pub struct HtmlPlacardSource {
    html: String,
    config: ExtractorConfig,
    metadata: Option<PresentationMetadata>,
}

impl HtmlPlacardSource {
    /// Read placards from `html` with the default selectors.
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            config: ExtractorConfig::default(),
            metadata: None,
        }
    }

    /// Read the file at `path`.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    /// Use custom selectors.
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach metadata that the page itself does not carry.
    pub fn with_metadata(mut self, metadata: PresentationMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn extract(
        &self,
        index: usize,
        placard: ElementRef<'_>,
        selectors: &Selectors,
    ) -> Result<Placard> {
        let title = placard
            .select(&selectors.title)
            .next()
            .ok_or(Error::MissingElement {
                index,
                element: "title",
            })?;
        let content = placard
            .select(&selectors.content)
            .next()
            .ok_or(Error::MissingElement {
                index,
                element: "content",
            })?;

        let title = text_of(title);
        let raw_body = text_outside_frames(content);

        let frame_src = content
            .select(&selectors.video_frame)
            .find_map(|frame| frame.value().attr("src"))
            .filter(|src| video::is_video_embed(src));

        match frame_src {
            Some(src) => {
                log::debug!("Placard {} embeds {}", index, src);
                let description = raw_body.clone();
                Ok(Placard::video(title, src, raw_body, description))
            }
            None => Ok(Placard::text(title, raw_body)),
        }
    }
}

impl PlacardSource for HtmlPlacardSource {
    fn placards(&self) -> Result<Vec<Result<Placard>>> {
        let selectors = Selectors::compile(&self.config)?;
        let document = Html::parse_document(&self.html);

        if !document.errors.is_empty() {
            log::debug!("HTML parser reported {} error(s)", document.errors.len());
        }

        let placards: Vec<Result<Placard>> = document
            .select(&selectors.placard)
            .enumerate()
            .map(|(index, placard)| self.extract(index, placard, &selectors))
            .collect();

        log::debug!("HTML extractor found {} placard(s)", placards.len());
        Ok(placards)
    }

    fn metadata(&self) -> Option<PresentationMetadata> {
        self.metadata.clone()
    }
}

/// Concatenated descendant text, trimmed.
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Descendant text with anything inside an `iframe` left out, trimmed.
fn text_outside_frames(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        if let Node::Text(chunk) = node.value() {
            let in_frame = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| el.name() == "iframe")
            });
            if !in_frame {
                text.push_str(chunk);
            }
        }
    }
    text.trim().to_string()
}
