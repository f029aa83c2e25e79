//! PPTX (Office Open XML) backend for generated slide decks.
//!
//! [`PptxWriter`] serializes slides into a .pptx package (a ZIP archive of
//! XML parts). [`PptxInspector`] reads a package back and lists the text on
//! each slide.

pub mod inspect;
mod template;
pub mod writer;

pub use inspect::PptxInspector;
pub use writer::{PptxSlide, PptxWriter, SaveTarget, SavedDeck};
