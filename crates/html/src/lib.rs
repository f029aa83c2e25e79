//! Placard extraction from rendered teaching-material pages.
//!
//! Reads `.placard` elements out of an HTML document with CSS selectors and
//! turns each into a [`deck_core::Placard`].

pub mod extractor;

pub use extractor::{ExtractorConfig, HtmlPlacardSource};
