//! Embedding of video thumbnails.
//!
//! The mapper references thumbnails by URL. When the deck should carry the
//! image bytes instead, [`embed_thumbnails`] fetches every thumbnail at once,
//! waits for all of them, and swaps each linked image for an embedded one.
//! A thumbnail that cannot be fetched is replaced by a text placeholder.

use futures::future::join_all;

use crate::slide::{Block, ImageFormat, ImageSource, SlideSpec, TextBlock, TextStyle};
use crate::theme::Theme;

/// Text shown where a thumbnail could not be embedded.
pub const THUMBNAIL_UNAVAILABLE: &str = "Video Thumbnail Not Available";

/// Outcome of fetching one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFetch {
    /// The image bytes and their detected encoding.
    Fetched { bytes: Vec<u8>, format: ImageFormat },
    /// The image could not be fetched; the reason is for logging.
    Missing(String),
}

impl ImageFetch {
    /// Classify downloaded bytes, rejecting anything that is not an image.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match ImageFormat::detect(&bytes) {
            Some(format) => Self::Fetched { bytes, format },
            None => Self::Missing("response is not a PNG, JPEG or GIF image".to_string()),
        }
    }
}

/// Fetches image bytes by URL.
#[allow(async_fn_in_trait)]
pub trait ThumbnailFetcher {
    /// Fetch one image. Never fails; problems come back as [`ImageFetch::Missing`].
    async fn fetch(&self, url: &str) -> ImageFetch;
}

/// Replace every linked image in `slides` with embedded bytes.
///
/// All fetches run concurrently and are joined before any slide is touched.
/// Returns the number of thumbnails that had to be replaced by a placeholder.
pub async fn embed_thumbnails<F: ThumbnailFetcher>(
    slides: &mut [SlideSpec],
    fetcher: &F,
    theme: &Theme,
) -> usize {
    let targets: Vec<(usize, usize, String)> = slides
        .iter()
        .enumerate()
        .flat_map(|(slide_idx, slide)| {
            slide
                .blocks
                .iter()
                .enumerate()
                .filter_map(move |(block_idx, block)| match block {
                    Block::Image(image) => match &image.source {
                        ImageSource::Url { url } => Some((slide_idx, block_idx, url.clone())),
                        ImageSource::Embedded { .. } => None,
                    },
                    _ => None,
                })
        })
        .collect();

    if targets.is_empty() {
        return 0;
    }

    log::debug!("Fetching {} thumbnail(s)", targets.len());
    let results = join_all(targets.iter().map(|(_, _, url)| fetcher.fetch(url))).await;

    let mut missing = 0;
    for ((slide_idx, block_idx, url), result) in targets.into_iter().zip(results) {
        let block = &mut slides[slide_idx].blocks[block_idx];
        let Block::Image(image) = block else {
            continue;
        };
        let frame = image.frame;

        match result {
            ImageFetch::Fetched { bytes, format } => {
                image.source = ImageSource::Embedded { bytes, format };
            }
            ImageFetch::Missing(reason) => {
                log::warn!("Failed to load thumbnail {}: {}", url, reason);
                missing += 1;
                *block = Block::BodyText(TextBlock {
                    text: THUMBNAIL_UNAVAILABLE.to_string(),
                    frame,
                    style: TextStyle::new(16.0, &theme.text)
                        .centered()
                        .with_font_face(theme.body_font.as_deref()),
                });
            }
        }
    }

    missing
}
