//! Line and word-level types.

use super::{BoundingBox, Point, Polygon};
use serde::{Deserialize, Serialize};

/// A single recognized word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Position on the page
    pub bbox: BoundingBox,

    /// Exact outline, if the engine reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,

    /// Recognized text (never empty)
    pub text: String,

    /// Recognition confidence in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Alternative readings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,

    /// Word continues on the next line (soft hyphen stripped from `text`)
    #[serde(default)]
    pub hyphen_start: bool,
}

impl Word {
    /// Create a word with its text and box.
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            bbox,
            polygon: None,
            text: text.into(),
            confidence: None,
            choices: Vec::new(),
            hyphen_start: false,
        }
    }

    /// Set the confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// An alternative reading of a word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

impl Choice {
    /// Create a choice without probability.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            probability: None,
        }
    }

    /// Create a choice from a negative log probability (`exp(-nlp)`).
    pub fn from_nlp(text: impl Into<String>, nlp: f64) -> Self {
        Self {
            text: text.into(),
            probability: Some((-nlp).exp()),
        }
    }
}

/// A child of a line: either a word or a literal text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItem {
    /// A recognized word
    Word(Word),

    /// Stray text or explicit whitespace
    Text {
        /// Fragment content
        content: String,
    },
}

impl LineItem {
    /// Create a text fragment.
    pub fn text(content: impl Into<String>) -> Self {
        LineItem::Text {
            content: content.into(),
        }
    }

    /// A single space fragment.
    pub fn space() -> Self {
        Self::text(" ")
    }

    /// Check if this is a whitespace-only text fragment.
    pub fn is_whitespace(&self) -> bool {
        match self {
            LineItem::Text { content } => content.trim().is_empty(),
            LineItem::Word(_) => false,
        }
    }

    /// Get the word, if this item is one.
    pub fn as_word(&self) -> Option<&Word> {
        match self {
            LineItem::Word(w) => Some(w),
            LineItem::Text { .. } => None,
        }
    }

    /// Text contributed by this item.
    pub fn as_str(&self) -> &str {
        match self {
            LineItem::Word(w) => &w.text,
            LineItem::Text { content } => content,
        }
    }
}

/// A line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub bbox: BoundingBox,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,

    /// Polyline the glyphs rest on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Vec<Point>>,

    /// Words interleaved with text fragments
    pub children: Vec<LineItem>,
}

impl Line {
    /// Create an empty line.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            polygon: None,
            baseline: None,
            children: Vec::new(),
        }
    }

    /// Append a word.
    pub fn add_word(&mut self, word: Word) {
        self.children.push(LineItem::Word(word));
    }

    /// Append a text fragment.
    pub fn add_text(&mut self, content: impl Into<String>) {
        self.children.push(LineItem::text(content));
    }

    /// All words of the line, in order.
    pub fn words(&self) -> Vec<&Word> {
        self.children.iter().filter_map(LineItem::as_word).collect()
    }

    pub(crate) fn words_mut(&mut self) -> impl Iterator<Item = &mut Word> {
        self.children.iter_mut().filter_map(|c| match c {
            LineItem::Word(w) => Some(w),
            LineItem::Text { .. } => None,
        })
    }

    /// Concatenated text of all children.
    pub fn text(&self) -> String {
        self.children.iter().map(LineItem::as_str).collect()
    }

    /// Check whether the last word of the line is hyphenated.
    pub fn ends_with_hyphen(&self) -> bool {
        self.children
            .iter()
            .rev()
            .find_map(LineItem::as_word)
            .is_some_and(|w| w.hyphen_start)
    }

    /// Check if the line has no words.
    pub fn is_empty(&self) -> bool {
        self.words().is_empty()
    }

    /// Insert a space between every adjacent pair of children.
    ///
    /// No space is placed after the final child or after a hyphen-start word.
    pub(crate) fn synthesize_spaces(&mut self) {
        let children = std::mem::take(&mut self.children);
        let count = children.len();
        for (idx, child) in children.into_iter().enumerate() {
            let hyphenated = child.as_word().is_some_and(|w| w.hyphen_start);
            self.children.push(child);
            if idx + 1 < count && !hyphenated {
                self.children.push(LineItem::space());
            }
        }
    }

    /// Drop a trailing whitespace-only fragment.
    pub(crate) fn trim_trailing_space(&mut self) {
        if self.children.last().is_some_and(LineItem::is_whitespace) {
            self.children.pop();
        }
    }
}
