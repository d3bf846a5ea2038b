//! Page-level types.

use super::block::{join_parts, TextPart};
use super::{Block, BoundingBox, Line, Paragraph, Word};
use serde::{Deserialize, Serialize};

/// A single scanned page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page extent in pixels
    pub bbox: BoundingBox,

    /// Identifier from the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Physical page number (image sequence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_number: Option<u32>,

    /// Printed page number (e.g. "iv")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_number: Option<String>,

    /// Scanned image this page was recognized from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_source: Option<ImageSource>,

    /// Optional capabilities present anywhere on the page
    #[serde(default)]
    pub features: Features,

    /// Top-level content
    pub children: Vec<PageItem>,
}

impl Page {
    /// Create an empty page.
    pub fn new(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            id: None,
            physical_number: None,
            logical_number: None,
            image_source: None,
            features: Features::default(),
            children: Vec::new(),
        }
    }

    /// Append a block.
    pub fn add_block(&mut self, block: Block) {
        self.children.push(PageItem::Block(block));
    }

    /// Append a paragraph.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.children.push(PageItem::Paragraph(paragraph));
    }

    /// Append a line.
    pub fn add_line(&mut self, line: Line) {
        self.children.push(PageItem::Line(line));
    }

    /// All blocks of the page.
    pub fn blocks(&self) -> Vec<&Block> {
        self.children
            .iter()
            .filter_map(|c| match c {
                PageItem::Block(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    /// All paragraphs of the page, whether inside a block or not.
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        self.children
            .iter()
            .flat_map(|c| match c {
                PageItem::Block(b) => b.paragraphs(),
                PageItem::Paragraph(p) => vec![p],
                PageItem::Line(_) => Vec::new(),
            })
            .collect()
    }

    /// All lines of the page, in document order.
    pub fn lines(&self) -> Vec<&Line> {
        self.children
            .iter()
            .flat_map(|c| match c {
                PageItem::Block(b) => b.lines(),
                PageItem::Paragraph(p) => p.lines(),
                PageItem::Line(l) => vec![l],
            })
            .collect()
    }

    /// All words of the page, in document order.
    pub fn words(&self) -> Vec<&Word> {
        self.lines().into_iter().flat_map(Line::words).collect()
    }

    /// Plain text of the page.
    pub fn text(&self) -> String {
        join_parts(self.children.iter().map(|c| match c {
            PageItem::Block(b) => TextPart::container(b.text(), b.ends_with_hyphen()),
            PageItem::Paragraph(p) => TextPart::container(p.text(), p.ends_with_hyphen()),
            PageItem::Line(l) => TextPart::line(l),
        }))
    }

    /// Check if the page has no content.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Page dimensions as (width, height).
    pub fn dimensions(&self) -> (f64, f64) {
        (self.bbox.width, self.bbox.height)
    }
}

/// A direct child of a page. Dialects may skip hierarchy levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageItem {
    Block(Block),
    Paragraph(Paragraph),
    Line(Line),
}

/// Description of the scanned image behind a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// Image file name or path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Identifier of the image file (`location:identifier` when qualified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,

    /// Identifier of the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Checksum>,

    /// Scan resolution in dots per inch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl ImageSource {
    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Image checksum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checksum {
    pub algorithm: String,
    pub value: String,
}

/// Horizontal and vertical scan resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

/// Optional capabilities found on a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub polygons: bool,
    pub baselines: bool,
    pub confidence: bool,
    pub alternatives: bool,
    pub hyphenation: bool,
}

impl Features {
    /// Scan every element of a fully decoded page.
    pub fn scan(page: &Page) -> Self {
        let mut features = Self::default();

        for block in page.blocks() {
            features.polygons |= block.polygon.is_some();
        }
        for para in page.paragraphs() {
            features.polygons |= para.polygon.is_some();
        }
        for line in page.lines() {
            features.polygons |= line.polygon.is_some();
            features.baselines |= line.baseline.is_some();
            for word in line.words() {
                features.polygons |= word.polygon.is_some();
                features.confidence |= word.confidence.is_some();
                features.alternatives |= !word.choices.is_empty();
                features.hyphenation |= word.hyphen_start;
            }
        }

        features
    }

    /// Names of the features that are present.
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.polygons, "polygons"),
            (self.baselines, "baselines"),
            (self.confidence, "confidence"),
            (self.alternatives, "alternatives"),
            (self.hyphenation, "hyphenation"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}
