//! Depth-tracked cursor over an event source.

use super::events::{EventSource, Tag, XmlEvent};
use crate::error::{Error, Result};

/// A child of the element currently being decoded.
#[derive(Debug)]
pub(crate) enum Child {
    Element(Tag),
    Text(String),
}

/// Owns the event stream for one decode session and keeps the stack of
/// open elements.
///
/// Nested decoders borrow the cursor mutably for the span of their element,
/// so the open/close bookkeeping lives in one place.
pub(crate) struct Cursor<S: EventSource> {
    source: S,
    open: Vec<String>,
}

impl<S: EventSource> Cursor<S> {
    pub(crate) fn new(source: S) -> Self {
        Self {
            source,
            open: Vec::new(),
        }
    }

    /// Byte offset of the last event.
    pub(crate) fn position(&self) -> u64 {
        self.source.position()
    }

    /// Number of currently open elements.
    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    /// Next event, updating the open-element stack.
    pub(crate) fn next(&mut self) -> Result<Option<XmlEvent>> {
        let event = self.source.next_event()?;
        match &event {
            Some(XmlEvent::Open(tag)) => self.open.push(tag.name.clone()),
            Some(XmlEvent::Close(_)) => {
                self.open.pop();
            }
            _ => {}
        }
        Ok(event)
    }

    fn eof(&self) -> Error {
        Error::UnexpectedEof {
            element: self
                .open
                .last()
                .cloned()
                .unwrap_or_else(|| "document".to_string()),
        }
    }

    /// Consume events until the stack is back to `depth`.
    fn unwind_to(&mut self, depth: usize) -> Result<()> {
        while self.depth() > depth {
            if self.next()?.is_none() {
                return Err(self.eof());
            }
        }
        Ok(())
    }

    /// Skip the rest of the element whose `Open` was just consumed.
    pub(crate) fn skip_element(&mut self) -> Result<()> {
        let depth = self.depth().saturating_sub(1);
        self.unwind_to(depth)
    }

    /// Feed every direct child of the current element to `visit`, then
    /// consume the element's `Close`.
    ///
    /// `visit` may decode a child element or ignore it; whatever it leaves
    /// unread is skipped, so sibling parsing always resumes at the right
    /// depth.
    pub(crate) fn children<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(&mut Self, Child) -> Result<()>,
    {
        let depth = self.depth();
        loop {
            match self.next()? {
                None => return Err(self.eof()),
                Some(XmlEvent::Close(_)) => return Ok(()),
                Some(XmlEvent::Text(text)) => visit(self, Child::Text(text))?,
                Some(XmlEvent::Open(tag)) => {
                    visit(self, Child::Element(tag))?;
                    self.unwind_to(depth)?;
                }
            }
        }
    }

    /// Concatenated text of all descendants of the current element.
    pub(crate) fn text_content(&mut self) -> Result<String> {
        let mut text = String::new();
        self.collect_text(&mut text)?;
        Ok(text)
    }

    fn collect_text(&mut self, out: &mut String) -> Result<()> {
        self.children(|cursor, child| match child {
            Child::Text(t) => {
                out.push_str(&t);
                Ok(())
            }
            Child::Element(_) => cursor.collect_text(out),
        })
    }
}
