//! OCR markup decoding.
//!
//! The [`EventSource`] trait separates tokenizing from decoding; the hOCR
//! and ALTO decoders turn events into [`Page`](crate::model::Page) trees
//! and [`Pages`] drives either one lazily.

mod alto;
mod attrs;
mod cursor;
mod events;
mod hocr;
mod options;
mod pages;

pub use alto::{AltoDecoder, MeasurementUnit};
pub use attrs::{resolve_entities, Attributes};
pub use events::{EventSource, Tag, XmlEvent, XmlEventSource};
pub use hocr::HocrDecoder;
pub use options::{ParseOptions, ReferenceSizeFn, ReferenceSizes, Size};
pub use pages::Pages;
