//! Core domain types, link normalization and slide mapping for exporting
//! teaching-material placards as a slide deck.

pub mod error;
pub mod export;
pub mod links;
pub mod mapper;
pub mod slide;
pub mod source;
pub mod theme;
pub mod thumbnail;
pub mod types;
pub mod video;
pub mod writer;

pub use error::{Error, Result};
pub use export::{export_file_name, ExportOptions, ExportReport, Exporter, LogStatus, StatusSink};
pub use links::{LinkNormalizer, NormalizedText};
pub use mapper::{SlideMapper, SlidePlan};
pub use slide::{Block, Frame, ImageFormat, ImageSource, SlideSpec, TextStyle};
pub use source::{PlacardSource, SnapshotSource};
pub use theme::{SlideLayout, Theme};
pub use thumbnail::{ImageFetch, ThumbnailFetcher};
pub use types::{ExtractedLink, Placard, PlacardKind, PresentationMetadata, VideoEmbed};
pub use writer::{DeckProperties, DeckWriter, SlideHandle, TextOptions};
