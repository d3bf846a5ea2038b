//! ALTO decoder.

use std::fmt;

use super::attrs::{parse_points, resolve_bbox, scale_factor, AttrMap, BoxFields, PointsError};
use super::cursor::{Child, Cursor};
use super::events::{EventSource, Tag, XmlEvent};
use super::options::{ReferenceSizes, Size};
use crate::error::{Error, Result};
use crate::model::{
    Block, BoundingBox, Choice, Features, ImageSource, Line, LineItem, Page, Point, Polygon, Word,
};

const SOFT_HYPHEN: char = '\u{ad}';

const ALTO_BOX: BoxFields = BoxFields {
    x: "HPOS",
    y: "VPOS",
    width: "WIDTH",
    height: "HEIGHT",
};

const BOX_NUMERIC: &[&str] = &["HPOS", "VPOS", "WIDTH", "HEIGHT"];
const PAGE_NUMERIC: &[&str] = &["HPOS", "VPOS", "WIDTH", "HEIGHT", "PHYSICAL_IMG_NR"];
const WORD_NUMERIC: &[&str] = &["HPOS", "VPOS", "WIDTH", "HEIGHT", "WC"];

/// Coordinate unit declared in the ALTO description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MeasurementUnit {
    #[default]
    Pixel,
    /// 1/10 mm
    Mm10,
    /// 1/1200 inch
    Inch1200,
    Other(String),
}

impl MeasurementUnit {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "pixel" => MeasurementUnit::Pixel,
            "mm10" => MeasurementUnit::Mm10,
            "inch1200" => MeasurementUnit::Inch1200,
            other => MeasurementUnit::Other(other.to_string()),
        }
    }

    pub fn is_pixel(&self) -> bool {
        matches!(self, MeasurementUnit::Pixel)
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementUnit::Pixel => write!(f, "pixel"),
            MeasurementUnit::Mm10 => write!(f, "mm10"),
            MeasurementUnit::Inch1200 => write!(f, "inch1200"),
            MeasurementUnit::Other(s) => write!(f, "{}", s),
        }
    }
}

/// ALTO layout elements the decoder knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    /// `PrintSpace`, margins and `ComposedBlock`: looked through
    Container,
    Block,
    Line,
    Word,
    Space,
    Shape,
    Alternative,
    /// Known but irrelevant to text: `HYP`, `Illustration`, `GraphicalElement`
    Ignored,
}

impl Element {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "PrintSpace" | "TopMargin" | "LeftMargin" | "RightMargin" | "BottomMargin"
            | "ComposedBlock" => Some(Element::Container),
            "TextBlock" => Some(Element::Block),
            "TextLine" => Some(Element::Line),
            "String" => Some(Element::Word),
            "SP" => Some(Element::Space),
            "Shape" => Some(Element::Shape),
            "ALTERNATIVE" => Some(Element::Alternative),
            "HYP" | "Illustration" | "GraphicalElement" => Some(Element::Ignored),
            _ => None,
        }
    }
}

const PAGE_CHILDREN: &[Element] = &[Element::Container, Element::Block];
const BLOCK_CHILDREN: &[Element] = &[Element::Line, Element::Shape];
const LINE_CHILDREN: &[Element] = &[Element::Word, Element::Space, Element::Shape];
const WORD_CHILDREN: &[Element] = &[Element::Shape, Element::Alternative];

/// Classify a child element, logging and skipping anything not legal under `parent`.
fn dispatch(position: u64, tag: &Tag, legal: &[Element], parent: &str) -> Option<Element> {
    match Element::from_name(&tag.name) {
        Some(Element::Ignored) => {
            log::debug!("{}: skipping <{}>", position, tag.name);
            None
        }
        Some(element) if legal.contains(&element) => Some(element),
        _ => {
            log::warn!(
                "{}: unexpected <{}> inside <{}>, skipping",
                position,
                tag.name,
                parent
            );
            None
        }
    }
}

/// Decodes ALTO pages one at a time from an event source.
pub struct AltoDecoder<S: EventSource> {
    cursor: Cursor<S>,
    reference_sizes: ReferenceSizes,
    page_index: usize,
    unit: MeasurementUnit,
    /// Pending until the first page takes it
    image_source: Option<ImageSource>,
}

impl<S: EventSource> AltoDecoder<S> {
    /// Create a decoder over an event source.
    pub fn new(source: S, reference_sizes: ReferenceSizes) -> Self {
        Self {
            cursor: Cursor::new(source),
            reference_sizes,
            page_index: 0,
            unit: MeasurementUnit::default(),
            image_source: None,
        }
    }

    /// Decode the next `Page`, or `None` at the end of input.
    pub fn next_page(&mut self) -> Result<Option<Page>> {
        while let Some(event) = self.cursor.next()? {
            let XmlEvent::Open(tag) = event else {
                continue;
            };
            match tag.name.as_str() {
                "MeasurementUnit" => {
                    self.unit = MeasurementUnit::parse(&self.cursor.text_content()?);
                }
                "sourceImageInformation" => {
                    self.image_source = read_source_image(&mut self.cursor)?;
                }
                "Page" => {
                    let page = self.decode_page(&tag)?;
                    self.page_index += 1;
                    return Ok(Some(page));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn decode_page(&mut self, tag: &Tag) -> Result<Page> {
        let position = self.cursor.position();
        let attrs = AttrMap::coerce(&tag.attrs, PAGE_NUMERIC);
        let (Some(width), Some(height)) = (attrs.number("WIDTH"), attrs.number("HEIGHT")) else {
            return Err(Error::MissingGeometry {
                element: "Page".to_string(),
                position,
            });
        };

        let reference = self.reference_sizes.resolve(self.page_index, &tag.attrs);
        if !self.unit.is_pixel() && reference.is_none() {
            return Err(Error::MissingReferenceSize {
                unit: self.unit.to_string(),
            });
        }
        let scope = PageScope {
            factor: scale_factor(Size::new(width, height), reference, position),
        };

        let native = BoundingBox::new(
            attrs.number("HPOS").unwrap_or(0.0),
            attrs.number("VPOS").unwrap_or(0.0),
            width,
            height,
        );
        let mut page = Page::new(native.scaled(scope.factor));
        page.id = attrs.text("ID").map(String::from);
        page.physical_number = attrs.number("PHYSICAL_IMG_NR").map(|n| n as u32);
        page.logical_number = attrs.text("PRINTED_IMG_NR").map(String::from);
        page.image_source = self.image_source.take();

        scope.page_children(&mut self.cursor, &mut page, "Page")?;

        page.features = Features::scan(&page);
        log::debug!(
            "{}: decoded ALTO page {} ({} words)",
            position,
            self.page_index,
            page.words().len()
        );
        Ok(page)
    }
}

/// `fileName`, `fileIdentifier` and `documentIdentifier`, with their
/// optional `...Location` qualifier prepended as `location:identifier`.
fn read_source_image<S: EventSource>(cursor: &mut Cursor<S>) -> Result<Option<ImageSource>> {
    let mut source = ImageSource::default();
    cursor.children(|cursor, child| {
        let Child::Element(tag) = child else {
            return Ok(());
        };
        let target = match tag.name.as_str() {
            "fileName" => &mut source.file_name,
            "fileIdentifier" => &mut source.file_id,
            "documentIdentifier" => &mut source.document_id,
            _ => return Ok(()),
        };
        let value = cursor.text_content()?.trim().to_string();
        if value.is_empty() {
            return Ok(());
        }
        let location = tag
            .attrs
            .get(&format!("{}Location", tag.name))
            .filter(|l| !l.is_empty());
        *target = Some(match location {
            Some(location) => format!("{}:{}", location, value),
            None => value,
        });
        Ok(())
    })?;
    Ok((!source.is_empty()).then_some(source))
}

/// Per-page decoding state.
struct PageScope {
    factor: f64,
}

impl PageScope {
    /// Collect the text blocks of a page, looking through container elements.
    fn page_children<S: EventSource>(
        &self,
        cursor: &mut Cursor<S>,
        page: &mut Page,
        parent: &str,
    ) -> Result<()> {
        cursor.children(|cursor, child| {
            let Child::Element(tag) = child else {
                return Ok(());
            };
            match dispatch(cursor.position(), &tag, PAGE_CHILDREN, parent) {
                Some(Element::Container) => self.page_children(cursor, page, &tag.name)?,
                Some(Element::Block) => page.add_block(self.block(cursor, &tag)?),
                _ => {}
            }
            Ok(())
        })
    }

    fn block<S: EventSource>(&self, cursor: &mut Cursor<S>, tag: &Tag) -> Result<Block> {
        let position = cursor.position();
        let partial = AttrMap::coerce(&tag.attrs, BOX_NUMERIC).bbox(&ALTO_BOX);

        let mut polygon = None;
        let mut lines = Vec::new();
        cursor.children(|cursor, child| {
            let Child::Element(tag) = child else {
                return Ok(());
            };
            match dispatch(cursor.position(), &tag, BLOCK_CHILDREN, "TextBlock") {
                Some(Element::Line) => lines.push(self.line(cursor, &tag)?),
                Some(Element::Shape) => polygon = self.shape(cursor)?,
                _ => {}
            }
            Ok(())
        })?;

        // geometry may come from the Shape, which is only known now
        let bbox = resolve_bbox(partial, polygon.as_ref(), self.factor, "TextBlock", position)?;
        let mut block = Block::new(bbox);
        block.polygon = polygon;
        for line in lines {
            block.add_line(line);
        }
        Ok(block)
    }

    fn line<S: EventSource>(&self, cursor: &mut Cursor<S>, tag: &Tag) -> Result<Line> {
        let position = cursor.position();
        let partial = AttrMap::coerce(&tag.attrs, BOX_NUMERIC).bbox(&ALTO_BOX);
        let raw_baseline = tag.attrs.get("BASELINE").map(String::from);

        let mut polygon = None;
        let mut items = Vec::new();
        let mut explicit_spaces = false;
        cursor.children(|cursor, child| {
            let Child::Element(tag) = child else {
                return Ok(());
            };
            match dispatch(cursor.position(), &tag, LINE_CHILDREN, "TextLine") {
                Some(Element::Word) => items.push(LineItem::Word(self.word(cursor, &tag)?)),
                Some(Element::Space) => {
                    items.push(LineItem::space());
                    explicit_spaces = true;
                }
                Some(Element::Shape) => polygon = self.shape(cursor)?,
                _ => {}
            }
            Ok(())
        })?;

        let bbox = resolve_bbox(partial, polygon.as_ref(), self.factor, "TextLine", position)?;
        let mut line = Line::new(bbox);
        line.polygon = polygon;
        line.children = items;
        line.baseline = raw_baseline.and_then(|raw| self.baseline(&raw, &bbox, position));
        if !explicit_spaces {
            line.synthesize_spaces();
        }
        line.trim_trailing_space();
        Ok(line)
    }

    /// `BASELINE` is either a single y coordinate or a point list.
    fn baseline(&self, raw: &str, bbox: &BoundingBox, position: u64) -> Option<Vec<Point>> {
        let raw = raw.trim();
        if let Ok(y) = raw.parse::<f64>() {
            let y = y * self.factor;
            return Some(vec![Point::new(bbox.x, y), Point::new(bbox.right(), y)]);
        }
        match parse_points(raw, self.factor) {
            Ok(points) if points.len() >= 2 => Some(points),
            _ => {
                log::warn!("{}: invalid BASELINE '{}', ignoring", position, raw);
                None
            }
        }
    }

    fn word<S: EventSource>(&self, cursor: &mut Cursor<S>, tag: &Tag) -> Result<Word> {
        let position = cursor.position();
        let attrs = AttrMap::coerce(&tag.attrs, WORD_NUMERIC);

        let mut text = attrs.text("CONTENT").unwrap_or_default().trim().to_string();
        if text.is_empty() {
            return Err(Error::MissingContent {
                element: "String".to_string(),
                position,
            });
        }
        let hyphen_start = attrs.text("SUBS_TYPE") == Some("HypPart1");
        if hyphen_start && text.chars().count() > 1 && text.ends_with(SOFT_HYPHEN) {
            text.pop();
        }

        let mut polygon = None;
        let mut choices = Vec::new();
        cursor.children(|cursor, child| {
            let Child::Element(tag) = child else {
                return Ok(());
            };
            match dispatch(cursor.position(), &tag, WORD_CHILDREN, "String") {
                Some(Element::Shape) => polygon = self.shape(cursor)?,
                Some(Element::Alternative) => {
                    let alternative = cursor.text_content()?;
                    let alternative = alternative.trim();
                    if !alternative.is_empty() {
                        choices.push(Choice::new(alternative));
                    }
                }
                _ => {}
            }
            Ok(())
        })?;

        let bbox = resolve_bbox(
            attrs.bbox(&ALTO_BOX),
            polygon.as_ref(),
            self.factor,
            "String",
            position,
        )?;
        let mut word = Word::new(text, bbox);
        word.polygon = polygon;
        word.hyphen_start = hyphen_start;
        word.confidence = attrs.number("WC");
        word.choices = choices;
        Ok(word)
    }

    /// Polygon of a `Shape`; a malformed one is reported and ignored.
    fn shape<S: EventSource>(&self, cursor: &mut Cursor<S>) -> Result<Option<Polygon>> {
        let mut polygon = None;
        cursor.children(|cursor, child| {
            let Child::Element(tag) = child else {
                return Ok(());
            };
            let position = cursor.position();
            if tag.name != "Polygon" {
                log::debug!("{}: ignoring <{}> shape", position, tag.name);
                return Ok(());
            }
            let Some(points) = tag.attrs.get("POINTS") else {
                log::warn!("{}: Polygon without POINTS, ignoring shape", position);
                return Ok(());
            };
            match parse_points(points, self.factor) {
                Ok(points) if !points.is_empty() => polygon = Some(points),
                Ok(_) => log::warn!("{}: empty POINTS, ignoring shape", position),
                Err(PointsError::OddLength(_)) => log::warn!(
                    "{}: odd number of coordinates in POINTS, ignoring shape",
                    position
                ),
                Err(PointsError::Invalid(token)) => log::warn!(
                    "{}: invalid coordinate '{}' in POINTS, ignoring shape",
                    position,
                    token
                ),
            }
            Ok(())
        })?;
        Ok(polygon)
    }
}
