//! Sources of placards.
//!
//! A source reads placards from some document: a rendered page (see the
//! `deck-html` crate) or a stored JSON snapshot of one.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Placard, PresentationMetadata};
use crate::video;

/// Something that can produce placard records in document order.
pub trait PlacardSource {
    /// Read every placard candidate.
    ///
    /// The outer error means the document itself could not be read. Each
    /// inner error is one candidate that could not be extracted; callers skip
    /// those and keep the rest.
    fn placards(&self) -> Result<Vec<Result<Placard>>>;

    /// Metadata stored alongside the placards, if the document carries any.
    fn metadata(&self) -> Option<PresentationMetadata> {
        None
    }
}

impl PlacardSource for Vec<Placard> {
    fn placards(&self) -> Result<Vec<Result<Placard>>> {
        Ok(self.iter().cloned().map(Ok).collect())
    }
}

/// On-disk layout of a snapshot.
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    metadata: Option<PresentationMetadata>,
    #[serde(default)]
    placards: Vec<SnapshotRecord>,
}

/// One placard as stored in a snapshot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecord {
    title: Option<String>,
    content: Option<String>,
    embed_src: Option<String>,
}

/// Placards read from a JSON snapshot of a rendered page.
///
/// ```json
/// { "metadata": { "topic": "Cells", "gradeLevel": "9" },
///   "placards": [ { "title": "Intro", "content": "- a\n- b" },
///                 { "title": "Clip", "content": "Overview",
///                   "embedSrc": "https://www.youtube.com/embed/abc123" } ] }
/// ```
#[derive(Debug)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    /// Parse a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self { snapshot })
    }

    /// Read and parse a snapshot file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl PlacardSource for SnapshotSource {
    fn placards(&self) -> Result<Vec<Result<Placard>>> {
        let records = self
            .snapshot
            .placards
            .iter()
            .enumerate()
            .map(|(index, record)| record_to_placard(index, record))
            .collect();
        Ok(records)
    }

    fn metadata(&self) -> Option<PresentationMetadata> {
        self.snapshot.metadata.clone()
    }
}

fn record_to_placard(index: usize, record: &SnapshotRecord) -> Result<Placard> {
    let title = record.title.as_deref().ok_or(Error::MissingElement {
        index,
        element: "title",
    })?;
    let content = record.content.as_deref().ok_or(Error::MissingElement {
        index,
        element: "content",
    })?;

    match record.embed_src.as_deref() {
        Some(src) if video::is_video_embed(src) => Ok(Placard::video(title, src, content, content)),
        _ => Ok(Placard::text(title, content)),
    }
}
