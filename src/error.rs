//! Error types for unocr library.

use std::io;
use thiserror::Error;

/// Result type alias for unocr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while decoding OCR markup.
///
/// Every variant is fatal for the decode session that produced it.
/// Recoverable problems are logged as warnings instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The markup could not be tokenized.
    #[error("XML error: {0}")]
    Xml(String),

    /// The input is neither hOCR nor ALTO.
    #[error("Unknown file format: not hOCR or ALTO")]
    UnknownFormat,

    /// An element has neither usable geometry attributes nor a polygon.
    #[error("{position}: {element} has no bounding box and no polygon")]
    MissingGeometry {
        /// Element name or role
        element: String,
        /// Byte offset in the input
        position: u64,
    },

    /// A word element carries no text.
    #[error("{position}: {element} has no text content")]
    MissingContent {
        /// Element name
        element: String,
        /// Byte offset in the input
        position: u64,
    },

    /// Coordinates are not pixels and no reference size was supplied.
    #[error("Measurement unit '{unit}' requires a reference size to convert to pixels")]
    MissingReferenceSize {
        /// Declared measurement unit
        unit: String,
    },

    /// The input ended while an element was still open.
    #[error("Unexpected end of input inside {element}")]
    UnexpectedEof {
        /// Innermost open element
        element: String,
    },

    /// The input contains no page.
    #[error("No page found in input")]
    NoPage,

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(e) => Error::Io(io::Error::new(e.kind(), e.to_string())),
            _ => Error::Xml(err.to_string()),
        }
    }
}
