//! Tag/text event source backed by `quick-xml`.
//!
//! Decoders never see the tokenizer directly; they consume [`XmlEvent`]s
//! through the [`EventSource`] trait so the tokenizer can be swapped out.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::attrs::{resolve_entities, Attributes};
use crate::error::Result;

/// HTML elements that never have a closing tag.
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "hr", "img", "input", "link", "meta", "wbr",
];

/// An opening tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Local name (namespace prefix removed)
    pub name: String,
    /// Attributes in document order, entities resolved
    pub attrs: Attributes,
    /// Written as `<x/>`; a matching `Close` still follows
    pub self_closing: bool,
}

impl Tag {
    /// Create a tag with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Attributes::new(),
            self_closing: false,
        }
    }
}

/// One event of the markup stream.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    Open(Tag),
    Text(String),
    Close(String),
}

/// A forward-only source of markup events.
///
/// Implementations must emit properly nested events: every `Open` is
/// eventually followed by its `Close`, also for self-closing elements.
pub trait EventSource {
    /// Next event, or `None` once the input is exhausted.
    fn next_event(&mut self) -> Result<Option<XmlEvent>>;

    /// Byte offset of the last event, used in diagnostics.
    fn position(&self) -> u64;
}

/// Streaming event source over any buffered reader.
pub struct XmlEventSource<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending_close: Option<String>,
    html: bool,
    position: u64,
}

impl<R: BufRead> XmlEventSource<R> {
    /// Create a source for XML input (ALTO).
    pub fn xml(input: R) -> Self {
        Self::new(input, false)
    }

    /// Create a source for XHTML/HTML input (hOCR).
    pub fn html(input: R) -> Self {
        Self::new(input, true)
    }

    fn new(input: R, html: bool) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(false);
        reader.check_end_names(false);
        Self {
            reader,
            buf: Vec::new(),
            pending_close: None,
            html,
            position: 0,
        }
    }
}

impl<R: BufRead> EventSource for XmlEventSource<R> {
    fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if let Some(name) = self.pending_close.take() {
            return Ok(Some(XmlEvent::Close(name)));
        }

        loop {
            self.position = self.reader.buffer_position() as u64;
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(ref e) => {
                    let mut tag = convert_tag(e, self.html, self.position);
                    if self.html && HTML_VOID_ELEMENTS.contains(&tag.name.as_str()) {
                        tag.self_closing = true;
                        self.pending_close = Some(tag.name.clone());
                    }
                    XmlEvent::Open(tag)
                }
                Event::Empty(ref e) => {
                    let mut tag = convert_tag(e, self.html, self.position);
                    tag.self_closing = true;
                    self.pending_close = Some(tag.name.clone());
                    XmlEvent::Open(tag)
                }
                Event::End(ref e) => {
                    let name = local_name(e.local_name().as_ref(), self.html);
                    if self.html && HTML_VOID_ELEMENTS.contains(&name.as_str()) {
                        // `<br></br>` style: already closed when opened
                        continue;
                    }
                    XmlEvent::Close(name)
                }
                Event::Text(e) => {
                    let raw = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    XmlEvent::Text(resolve_entities(&raw).into_owned())
                }
                Event::CData(e) => {
                    XmlEvent::Text(String::from_utf8_lossy(&e.into_inner()).into_owned())
                }
                Event::Eof => return Ok(None),
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => continue,
            };
            return Ok(Some(event));
        }
    }

    fn position(&self) -> u64 {
        self.position
    }
}

fn local_name(raw: &[u8], html: bool) -> String {
    let name = String::from_utf8_lossy(raw);
    if html {
        name.to_ascii_lowercase()
    } else {
        name.into_owned()
    }
}

fn convert_tag(e: &BytesStart<'_>, html: bool, position: u64) -> Tag {
    // HTML allows unquoted and valueless attributes
    let mut raw_attrs = if html {
        e.html_attributes()
    } else {
        e.attributes()
    };

    let mut attrs = Attributes::new();
    for attr in raw_attrs.with_checks(false) {
        match attr {
            Ok(attr) => {
                let key = local_name(attr.key.local_name().as_ref(), html);
                let raw = String::from_utf8_lossy(&attr.value);
                attrs.push(key, resolve_entities(&raw));
            }
            Err(e) => log::warn!("{}: skipping malformed attribute: {}", position, e),
        }
    }

    Tag {
        name: local_name(e.local_name().as_ref(), html),
        attrs,
        self_closing: false,
    }
}
