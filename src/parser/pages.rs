//! Lazy page sequence over either dialect decoder.

use std::io::BufRead;
use std::iter::FusedIterator;

use super::alto::AltoDecoder;
use super::events::{EventSource, XmlEventSource};
use super::hocr::HocrDecoder;
use super::options::ParseOptions;
use crate::detect::OcrFormat;
use crate::error::{Error, Result};
use crate::model::Page;

enum Decoder<S: EventSource> {
    Hocr(HocrDecoder<S>),
    Alto(AltoDecoder<S>),
}

/// Forward-only sequence of decoded pages, in document order.
///
/// Each page is decoded when it is requested. After an error the
/// iterator is exhausted; dropping it releases the underlying reader.
///
/// # Example
///
/// ```
/// use unocr::{OcrFormat, ParseOptions, Pages};
///
/// let hocr = r#"<div class="ocr_page" title="bbox 0 0 100 50">
///   <span class="ocr_line" title="bbox 0 0 100 10">
///     <span class="ocrx_word" title="bbox 0 0 40 10">Hello</span>
///   </span>
/// </div>"#;
///
/// let pages = Pages::from_reader(hocr.as_bytes(), ParseOptions::new(OcrFormat::Hocr));
/// for page in pages {
///     println!("{}", page?.text());
/// }
/// # Ok::<(), unocr::Error>(())
/// ```
pub struct Pages<S: EventSource> {
    decoder: Decoder<S>,
    done: bool,
}

impl<R: BufRead> Pages<XmlEventSource<R>> {
    /// Decode pages from a buffered reader using the `quick-xml` tokenizer.
    pub fn from_reader(reader: R, options: ParseOptions) -> Self {
        let source = match options.format {
            OcrFormat::Hocr => XmlEventSource::html(reader),
            OcrFormat::Alto => XmlEventSource::xml(reader),
        };
        Self::with_source(source, options)
    }
}

impl<S: EventSource> Pages<S> {
    /// Decode pages from any event source.
    pub fn with_source(source: S, options: ParseOptions) -> Self {
        let decoder = match options.format {
            OcrFormat::Hocr => Decoder::Hocr(HocrDecoder::new(source, options.reference_sizes)),
            OcrFormat::Alto => Decoder::Alto(AltoDecoder::new(source, options.reference_sizes)),
        };
        Self {
            decoder,
            done: false,
        }
    }

    /// Decode only the first page and discard the rest of the input.
    ///
    /// # Errors
    ///
    /// `Error::NoPage` if the input holds no page.
    pub fn first_page(mut self) -> Result<Page> {
        self.next().unwrap_or(Err(Error::NoPage))
    }
}

impl<S: EventSource> Iterator for Pages<S> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match &mut self.decoder {
            Decoder::Hocr(decoder) => decoder.next_page(),
            Decoder::Alto(decoder) => decoder.next_page(),
        };
        match result {
            Ok(Some(page)) => Some(Ok(page)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: EventSource> FusedIterator for Pages<S> {}
