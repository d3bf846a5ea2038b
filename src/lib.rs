//! # unocr
//!
//! Streaming decoder for OCR markup in Rust.
//!
//! This library reads the two common OCR output dialects, hOCR (HTML-based)
//! and ALTO (XML-based), and turns them into one tree of pages, blocks,
//! paragraphs, lines and words with pixel geometry.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unocr::{parse_file, render};
//!
//! fn main() -> unocr::Result<()> {
//!     // Pages are decoded lazily, one at a time
//!     for page in parse_file("scan.hocr")? {
//!         let page = page?;
//!         println!("{} words", page.words().len());
//!         println!("{}", render::to_json(&page, render::JsonFormat::Pretty)?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two dialects, one model**: hOCR and ALTO decode into the same types
//! - **Streaming**: pages are produced as they are completed
//! - **Scaling**: coordinates can be mapped to a reference resolution per page
//! - **Rich words**: polygons, baselines, confidence, alternatives, hyphenation
//! - **Lenient**: unexpected elements are logged and skipped

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_gzip, OcrFormat};
pub use error::{Error, Result};
pub use model::{
    Block, BlockItem, BoundingBox, Checksum, Choice, Features, ImageSource, Line, LineItem, Page,
    PageItem, Paragraph, Point, Polygon, Resolution, Word,
};
pub use parser::{Attributes, EventSource, Pages, ParseOptions, ReferenceSizes, Size, XmlEventSource};
pub use render::JsonFormat;

use std::io::{BufRead, Read};
use std::path::Path;

/// Page iterator over a file opened by [`parse_file`].
pub type FilePages = Pages<XmlEventSource<Box<dyn BufRead>>>;

/// Parse all pages of an in-memory document.
///
/// # Arguments
///
/// * `input` - hOCR or ALTO markup
/// * `format` - Dialect of the markup
///
/// # Example
///
/// ```
/// use unocr::{parse_str, OcrFormat};
///
/// let alto = r#"<alto><Layout><Page WIDTH="100" HEIGHT="50">
///   <TextBlock HPOS="0" VPOS="0" WIDTH="100" HEIGHT="10">
///     <TextLine HPOS="0" VPOS="0" WIDTH="100" HEIGHT="10">
///       <String CONTENT="Hello" HPOS="0" VPOS="0" WIDTH="40" HEIGHT="10"/>
///       <String CONTENT="world" HPOS="50" VPOS="0" WIDTH="50" HEIGHT="10"/>
///     </TextLine>
///   </TextBlock>
/// </Page></Layout></alto>"#;
///
/// let pages = parse_str(alto, OcrFormat::Alto).unwrap();
/// assert_eq!(pages[0].text(), "Hello world");
/// ```
pub fn parse_str(input: &str, format: OcrFormat) -> Result<Vec<Page>> {
    parse_str_with_options(input, ParseOptions::new(format))
}

/// Parse all pages of an in-memory document with custom options.
pub fn parse_str_with_options(input: &str, options: ParseOptions) -> Result<Vec<Page>> {
    Pages::from_reader(input.as_bytes(), options).collect()
}

/// Parse only the first page of an in-memory document.
///
/// # Errors
///
/// `Error::NoPage` if the document contains no page.
pub fn parse_page_str(input: &str, format: OcrFormat) -> Result<Page> {
    Pages::from_reader(input.as_bytes(), ParseOptions::new(format)).first_page()
}

/// Parse a document from bytes, detecting the dialect.
///
/// Gzip-compressed input is decompressed first.
///
/// # Example
///
/// ```no_run
/// use unocr::parse_bytes;
///
/// let data = std::fs::read("scan.xml.gz").unwrap();
/// let pages = parse_bytes(&data).unwrap();
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<Vec<Page>> {
    let mut inflated = Vec::new();
    let data = if is_gzip(data) {
        detect::open_bytes(data).read_to_end(&mut inflated)?;
        &inflated[..]
    } else {
        data
    };
    let format = detect_format_from_bytes(data)?;
    parse_bytes_with_options(data, ParseOptions::new(format))
}

/// Parse a document from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Vec<Page>> {
    Pages::from_reader(detect::open_bytes(data), options).collect()
}

/// Decode pages lazily from a reader.
///
/// # Arguments
///
/// * `reader` - Any type implementing `BufRead`
/// * `options` - Parsing options; the format is required
///
/// # Example
///
/// ```no_run
/// use std::fs::File;
/// use std::io::BufReader;
/// use unocr::{parse_reader, OcrFormat, ParseOptions};
///
/// let file = BufReader::new(File::open("book.xml").unwrap());
/// for page in parse_reader(file, ParseOptions::new(OcrFormat::Alto)) {
///     println!("{}", page.unwrap().text());
/// }
/// ```
pub fn parse_reader<R: BufRead>(reader: R, options: ParseOptions) -> Pages<XmlEventSource<R>> {
    Pages::from_reader(reader, options)
}

/// Open a file and decode its pages lazily, detecting the dialect.
///
/// # Example
///
/// ```no_run
/// use unocr::parse_file;
///
/// let first = parse_file("scan.hocr").unwrap().first_page().unwrap();
/// println!("{:?}", first.dimensions());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<FilePages> {
    let format = detect_format_from_path(path.as_ref())?;
    parse_file_with_options(path, ParseOptions::new(format))
}

/// Open a file and decode its pages lazily with custom options.
///
/// # Example
///
/// ```no_run
/// use unocr::{parse_file_with_options, OcrFormat, ParseOptions, Size};
///
/// let options = ParseOptions::new(OcrFormat::Alto)
///     .with_reference_sizes(vec![Size::new(2480.0, 3508.0)]);
/// let pages = parse_file_with_options("page.xml", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<FilePages> {
    let reader = detect::open_path(path)?;
    Ok(Pages::from_reader(reader, options))
}

/// Extract plain text from an OCR file.
///
/// # Example
///
/// ```no_run
/// use unocr::extract_text;
///
/// let text = extract_text("scan.hocr").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let pages = parse_file(path)?.collect::<Result<Vec<_>>>()?;
    Ok(render::to_text(&pages))
}

/// Convert an OCR file to JSON.
///
/// # Example
///
/// ```no_run
/// use unocr::{to_json, JsonFormat};
///
/// let json = to_json("scan.hocr", JsonFormat::Pretty).unwrap();
/// std::fs::write("output.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let pages = parse_file(path)?.collect::<Result<Vec<_>>>()?;
    render::to_json(&pages, format)
}
