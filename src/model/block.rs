//! Block and paragraph types.

use super::{BoundingBox, Line, Polygon, Word};
use serde::{Deserialize, Serialize};

/// A paragraph: a run of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Position on the page; unset for dialects without paragraph geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,

    pub lines: Vec<Line>,
}

impl Paragraph {
    /// Create an empty paragraph.
    pub fn new(bbox: Option<BoundingBox>) -> Self {
        Self {
            bbox,
            polygon: None,
            lines: Vec::new(),
        }
    }

    /// Append a line.
    pub fn add_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// All lines of the paragraph.
    pub fn lines(&self) -> Vec<&Line> {
        self.lines.iter().collect()
    }

    /// All words of the paragraph, in reading order.
    pub fn words(&self) -> Vec<&Word> {
        self.lines.iter().flat_map(|l| l.words()).collect()
    }

    /// Plain text, lines joined by single spaces.
    pub fn text(&self) -> String {
        join_parts(self.lines.iter().map(TextPart::line))
    }

    /// Check whether the paragraph ends in a hyphenated word.
    pub fn ends_with_hyphen(&self) -> bool {
        self.lines.last().is_some_and(Line::ends_with_hyphen)
    }
}

/// A child of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockItem {
    Paragraph(Paragraph),
    Line(Line),
}

/// A block of text, e.g. a column or a content area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub bbox: BoundingBox,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,

    pub children: Vec<BlockItem>,
}

impl Block {
    /// Create an empty block.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            polygon: None,
            children: Vec::new(),
        }
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.children.push(BlockItem::Paragraph(paragraph));
    }

    /// Append a line.
    pub fn add_line(&mut self, line: Line) {
        self.children.push(BlockItem::Line(line));
    }

    /// Paragraphs directly inside the block.
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        self.children
            .iter()
            .filter_map(|c| match c {
                BlockItem::Paragraph(p) => Some(p),
                BlockItem::Line(_) => None,
            })
            .collect()
    }

    /// All lines at or below the block.
    pub fn lines(&self) -> Vec<&Line> {
        self.children
            .iter()
            .flat_map(|c| match c {
                BlockItem::Paragraph(p) => p.lines(),
                BlockItem::Line(l) => vec![l],
            })
            .collect()
    }

    /// All words at or below the block.
    pub fn words(&self) -> Vec<&Word> {
        self.lines().into_iter().flat_map(Line::words).collect()
    }

    /// Plain text of the block.
    pub fn text(&self) -> String {
        join_parts(self.children.iter().map(|c| match c {
            BlockItem::Paragraph(p) => TextPart::container(p.text(), p.ends_with_hyphen()),
            BlockItem::Line(l) => TextPart::line(l),
        }))
    }

    /// Check whether the block ends in a hyphenated word.
    pub fn ends_with_hyphen(&self) -> bool {
        match self.children.last() {
            Some(BlockItem::Paragraph(p)) => p.ends_with_hyphen(),
            Some(BlockItem::Line(l)) => l.ends_with_hyphen(),
            None => false,
        }
    }
}

/// Text of one child, as seen by its parent when joining.
pub(crate) struct TextPart {
    text: String,
    is_line: bool,
    hyphenated: bool,
}

impl TextPart {
    pub(crate) fn line(line: &Line) -> Self {
        Self {
            text: line.text(),
            is_line: true,
            hyphenated: line.ends_with_hyphen(),
        }
    }

    pub(crate) fn container(text: String, hyphenated: bool) -> Self {
        Self {
            text,
            is_line: false,
            hyphenated,
        }
    }
}

/// Join sibling texts.
///
/// Two lines are separated by a space, anything next to a paragraph or
/// block by a newline, and nothing follows a hyphenated word.
pub(crate) fn join_parts(parts: impl IntoIterator<Item = TextPart>) -> String {
    let mut out = String::new();
    let mut prev: Option<(bool, bool)> = None;
    for part in parts {
        if let Some((prev_is_line, prev_hyphenated)) = prev {
            if !prev_hyphenated {
                out.push(if prev_is_line && part.is_line { ' ' } else { '\n' });
            }
        }
        out.push_str(&part.text);
        prev = Some((part.is_line, part.hyphenated));
    }
    out
}
