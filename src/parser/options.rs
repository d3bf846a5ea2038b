//! Parsing options and configuration.

use std::fmt;
use std::sync::Arc;

use super::attrs::Attributes;
use crate::detect::OcrFormat;

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Callback resolving the reference size of a page from its index and raw attributes.
pub type ReferenceSizeFn = dyn Fn(usize, &Attributes) -> Option<Size> + Send + Sync;

/// Reference resolution that page coordinates are scaled to.
///
/// `None` from any lookup means "no scaling": the page's native
/// coordinates are taken as pixels.
#[derive(Clone, Default)]
pub enum ReferenceSizes {
    /// No scaling for any page
    #[default]
    None,
    /// Callback per page
    Callback(Arc<ReferenceSizeFn>),
}

impl ReferenceSizes {
    /// Adapt a positional list to a callback; pages past the end are unscaled.
    pub fn from_list(sizes: Vec<Size>) -> Self {
        ReferenceSizes::Callback(Arc::new(move |index: usize, _attrs: &Attributes| {
            sizes.get(index).copied()
        }))
    }

    /// Wrap a callback.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(usize, &Attributes) -> Option<Size> + Send + Sync + 'static,
    {
        ReferenceSizes::Callback(Arc::new(f))
    }

    /// Reference size for the page at `index`.
    pub fn resolve(&self, index: usize, attrs: &Attributes) -> Option<Size> {
        match self {
            ReferenceSizes::None => None,
            ReferenceSizes::Callback(f) => f(index, attrs),
        }
    }
}

impl fmt::Debug for ReferenceSizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSizes::None => write!(f, "None"),
            ReferenceSizes::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

/// Options for decoding OCR markup.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Markup dialect of the input
    pub format: OcrFormat,

    /// Reference resolution per page
    pub reference_sizes: ReferenceSizes,
}

impl ParseOptions {
    /// Create options for the given dialect, without scaling.
    pub fn new(format: OcrFormat) -> Self {
        Self {
            format,
            reference_sizes: ReferenceSizes::None,
        }
    }

    /// Set positional reference sizes (one per page, in document order).
    pub fn with_reference_sizes(mut self, sizes: Vec<Size>) -> Self {
        self.reference_sizes = ReferenceSizes::from_list(sizes);
        self
    }

    /// Set a reference size callback.
    pub fn with_reference_size_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, &Attributes) -> Option<Size> + Send + Sync + 'static,
    {
        self.reference_sizes = ReferenceSizes::from_fn(f);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options =
            ParseOptions::new(OcrFormat::Alto).with_reference_sizes(vec![Size::new(10.0, 20.0)]);

        assert_eq!(options.format, OcrFormat::Alto);
        let attrs = Attributes::new();
        assert_eq!(
            options.reference_sizes.resolve(0, &attrs),
            Some(Size::new(10.0, 20.0))
        );
        assert_eq!(options.reference_sizes.resolve(1, &attrs), None);
    }

    #[test]
    fn test_reference_size_fn() {
        let options = ParseOptions::new(OcrFormat::Hocr).with_reference_size_fn(|idx, attrs| {
            (idx == 2 && attrs.get("id") == Some("p3")).then(|| Size::new(1.0, 1.0))
        });

        let attrs: Attributes = [("id", "p3")].into_iter().collect();
        assert_eq!(options.reference_sizes.resolve(0, &attrs), None);
        assert_eq!(
            options.reference_sizes.resolve(2, &attrs),
            Some(Size::new(1.0, 1.0))
        );
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::new(OcrFormat::Hocr);
        assert!(matches!(options.reference_sizes, ReferenceSizes::None));
        assert_eq!(format!("{:?}", options.reference_sizes), "None");
    }
}
