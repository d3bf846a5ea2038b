//! OCR format detection and input sniffing.

use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// OCR markup dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrFormat {
    /// HTML-based hOCR
    Hocr,
    /// XML-based ALTO
    Alto,
}

impl fmt::Display for OcrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrFormat::Hocr => write!(f, "hocr"),
            OcrFormat::Alto => write!(f, "alto"),
        }
    }
}

impl FromStr for OcrFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hocr" => Ok(OcrFormat::Hocr),
            "alto" => Ok(OcrFormat::Alto),
            _ => Err(Error::UnknownFormat),
        }
    }
}

/// gzip magic bytes
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// How much of the input is inspected when sniffing.
const SNIFF_LEN: usize = 8192;

lazy_static! {
    static ref ALTO_RE: Regex = Regex::new(r"<(?:[A-Za-z0-9_]+:)?alto[\s>]").unwrap();
    static ref HOCR_RE: Regex = Regex::new(r#"class\s*=\s*['"][^'"]*\bocr_page\b"#).unwrap();
}

/// Check for the gzip magic bytes.
pub fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(GZIP_MAGIC)
}

/// Detect the OCR dialect from the start of (uncompressed) input.
///
/// # Returns
/// * `Ok(OcrFormat)` if an ALTO root or an hOCR page is found
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<OcrFormat> {
    let head = &data[..data.len().min(SNIFF_LEN)];
    if ALTO_RE.is_match(head) {
        Ok(OcrFormat::Alto)
    } else if HOCR_RE.is_match(head) {
        Ok(OcrFormat::Hocr)
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Detect the OCR dialect of a file, decompressing gzip input.
///
/// # Example
/// ```no_run
/// use unocr::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("page.hocr").unwrap();
/// println!("Format: {}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<OcrFormat> {
    let reader = open_path(path)?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    reader.take(SNIFF_LEN as u64).read_to_end(&mut head)?;
    detect_format_from_bytes(&head)
}

/// Open a file as a buffered reader, transparently decompressing gzip.
pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let mut reader = BufReader::new(File::open(path)?);
    let gzip = is_gzip(reader.fill_buf()?);
    if gzip {
        Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Wrap in-memory bytes as a buffered reader, transparently decompressing gzip.
pub fn open_bytes(data: &[u8]) -> Box<dyn BufRead + '_> {
    if is_gzip(data) {
        Box::new(BufReader::new(GzDecoder::new(data)))
    } else {
        Box::new(data)
    }
}
