//! Document tree model for recognized OCR pages.
//!
//! The model is dialect-agnostic: hOCR and ALTO input both decode into the
//! same `Page → Block → Paragraph → Line → Word` hierarchy. Intermediate
//! levels are optional, so a page may hold lines directly.
//!
//! Flattened views (`words()`, `lines()`, ...) and `text()` are computed
//! from the children on every call and are never stored.

mod block;
mod geometry;
mod line;
mod page;

pub use block::{Block, BlockItem, Paragraph};
pub use geometry::{BoundingBox, PartialBox, Point, Polygon};
pub use line::{Choice, Line, LineItem, Word};
pub use page::{Checksum, Features, ImageSource, Page, PageItem, Resolution};
