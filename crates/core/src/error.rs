//! Error types for deck assembly.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling or writing a slide deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// A JSON snapshot could not be decoded.
    #[error("Invalid snapshot: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A placard candidate lacks a required sub-element.
    #[error("Placard {index} is missing its {element} element")]
    MissingElement {
        /// 0-based position of the candidate in document order.
        index: usize,
        /// Which sub-element was absent (`title` or `content`).
        element: &'static str,
    },

    /// The source document could not be read at all.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A configured CSS selector failed to parse.
    #[error("Invalid selector '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML generation or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// The deck writer failed to serialize or save the deck.
    #[error("Error saving PowerPoint: {0}")]
    WriterError(String),

    /// Another export is still running against this exporter.
    #[error("An export is already in progress")]
    ExportInProgress,

    /// A thumbnail could not be fetched or embedded.
    #[error("Thumbnail unavailable for '{url}': {reason}")]
    ThumbnailError { url: String, reason: String },
}
