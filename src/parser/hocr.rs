//! hOCR decoder.
//!
//! hOCR encodes layout through the `class` attribute of ordinary HTML
//! elements (`ocr_page`, `ocr_carea`, `ocr_par`, `ocr_line`, `ocrx_word`)
//! and geometry through `title` properties such as
//! `bbox 0 0 800 600; baseline 0.01 -5; x_wconf 93`.

use super::attrs::{parse_points, resolve_bbox, scale_factor, Attributes, PointsError};
use super::cursor::{Child, Cursor};
use super::events::{EventSource, Tag, XmlEvent};
use super::options::{ReferenceSizes, Size};
use crate::error::Result;
use crate::model::{
    Block, BoundingBox, Checksum, Choice, Features, ImageSource, Line, LineItem, Page, Paragraph,
    PartialBox, Point, Polygon, Resolution, Word,
};

/// Marks a word that continues on the next line.
const SOFT_HYPHEN: char = '\u{ad}';

/// Semantic role of an element, from its `class` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Page,
    Block,
    Paragraph,
    Line,
    Word,
    Alternatives,
}

impl Role {
    fn from_class(class: &str) -> Option<Self> {
        match class {
            "ocr_page" => Some(Role::Page),
            "ocr_carea" | "ocrx_block" => Some(Role::Block),
            "ocr_par" => Some(Role::Paragraph),
            "ocr_line" | "ocrx_line" | "ocr_textfloat" | "ocr_header" | "ocr_caption" => {
                Some(Role::Line)
            }
            "ocrx_word" => Some(Role::Word),
            "alternatives" => Some(Role::Alternatives),
            _ => None,
        }
    }

    fn of(attrs: &Attributes) -> Option<Self> {
        attrs.classes().find_map(Self::from_class)
    }

    fn name(self) -> &'static str {
        match self {
            Role::Page => "ocr_page",
            Role::Block => "ocr_carea",
            Role::Paragraph => "ocr_par",
            Role::Line => "ocr_line",
            Role::Word => "ocrx_word",
            Role::Alternatives => "alternatives",
        }
    }
}

const PAGE_CHILDREN: &[Role] = &[Role::Block, Role::Paragraph, Role::Line];
const BLOCK_CHILDREN: &[Role] = &[Role::Paragraph, Role::Line];
const PARAGRAPH_CHILDREN: &[Role] = &[Role::Line];
const LINE_CHILDREN: &[Role] = &[Role::Word];

/// A decoded element handed back to its parent.
enum Node {
    Block(Block),
    Paragraph(Paragraph),
    Line(Line),
    Word(Word),
}

/// Parsed `title` attribute: semicolon-separated `key value...` clauses.
struct Title<'a> {
    clauses: Vec<(&'a str, &'a str)>,
}

impl<'a> Title<'a> {
    fn parse(raw: &'a str) -> Self {
        fn clause(part: &str) -> Option<(&str, &str)> {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            let (key, value) = part.split_once(char::is_whitespace).unwrap_or((part, ""));
            Some((key, value.trim()))
        }

        let mut clauses = Vec::new();
        let mut start = 0;
        let mut quoted = false;
        for (idx, c) in raw.char_indices() {
            match c {
                '"' => quoted = !quoted,
                ';' if !quoted => {
                    clauses.extend(clause(&raw[start..idx]));
                    start = idx + 1;
                }
                _ => {}
            }
        }
        clauses.extend(clause(&raw[start..]));

        Self { clauses }
    }

    fn of(tag: &'a Tag) -> Self {
        Self::parse(tag.attrs.get("title").unwrap_or_default())
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.clauses
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    fn numbers(&self, key: &str) -> Option<Vec<f64>> {
        self.get(key)?
            .split_whitespace()
            .map(|t| t.parse::<f64>().ok())
            .collect()
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.numbers(key)?.first().copied()
    }

    fn string(&self, key: &str) -> Option<String> {
        let value = self.get(key)?.trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    }

    /// `bbox` clause as (left, top, right, bottom).
    fn corners(&self) -> Option<[f64; 4]> {
        match *self.numbers("bbox")?.as_slice() {
            [x0, y0, x1, y1] => Some([x0, y0, x1, y1]),
            _ => None,
        }
    }

    fn partial_box(&self) -> PartialBox {
        self.corners()
            .map(|[x0, y0, x1, y1]| BoundingBox::from_corners(x0, y0, x1, y1).into())
            .unwrap_or_default()
    }

    fn polygon(&self, factor: f64, position: u64) -> Option<Polygon> {
        match parse_points(self.get("poly")?, factor) {
            Ok(points) => Some(points),
            Err(PointsError::OddLength(points)) => {
                log::warn!(
                    "{}: odd number of coordinates in poly, ignoring the last one",
                    position
                );
                Some(points)
            }
            Err(PointsError::Invalid(token)) => {
                log::warn!("{}: invalid coordinate '{}' in poly", position, token);
                None
            }
        }
    }
}

/// Decodes hOCR pages one at a time from an event source.
pub struct HocrDecoder<S: EventSource> {
    cursor: Cursor<S>,
    reference_sizes: ReferenceSizes,
    page_index: usize,
}

impl<S: EventSource> HocrDecoder<S> {
    /// Create a decoder over an event source.
    pub fn new(source: S, reference_sizes: ReferenceSizes) -> Self {
        Self {
            cursor: Cursor::new(source),
            reference_sizes,
            page_index: 0,
        }
    }

    /// Decode the next `ocr_page`, or `None` at the end of input.
    pub fn next_page(&mut self) -> Result<Option<Page>> {
        while let Some(event) = self.cursor.next()? {
            let XmlEvent::Open(tag) = event else {
                continue;
            };
            if tag.name == "head" {
                log::debug!("{}: skipping <head>", self.cursor.position());
                self.cursor.skip_element()?;
            } else if Role::of(&tag.attrs) == Some(Role::Page) {
                let page = self.decode_page(&tag)?;
                self.page_index += 1;
                return Ok(Some(page));
            }
        }
        Ok(None)
    }

    fn decode_page(&mut self, tag: &Tag) -> Result<Page> {
        let position = self.cursor.position();
        let title = Title::of(tag);

        let native = resolve_bbox(
            title.partial_box(),
            title.polygon(1.0, position).as_ref(),
            1.0,
            Role::Page.name(),
            position,
        )?;
        let reference = self.reference_sizes.resolve(self.page_index, &tag.attrs);
        let scope = PageScope {
            factor: scale_factor(Size::new(native.width, native.height), reference, position),
        };

        let mut page = Page::new(native.scaled(scope.factor));
        page.id = tag.attrs.get("id").map(String::from);
        page.physical_number = title.number("ppageno").map(|n| n as u32);

        self.cursor.children(|cursor, child| {
            if let Child::Element(tag) = child {
                match scope.child(cursor, &tag, PAGE_CHILDREN, Role::Page)? {
                    Some(Node::Block(block)) => page.add_block(block),
                    Some(Node::Paragraph(para)) => page.add_paragraph(para),
                    Some(Node::Line(line)) => page.add_line(line),
                    Some(Node::Word(_)) | None => {}
                }
            }
            Ok(())
        })?;

        page.image_source = image_source(&title);
        page.features = Features::scan(&page);
        log::debug!(
            "{}: decoded hOCR page {} ({} words)",
            position,
            self.page_index,
            page.words().len()
        );
        Ok(page)
    }
}

/// Per-page decoding state.
struct PageScope {
    factor: f64,
}

impl PageScope {
    /// Decode a child element if its role is legal under `parent`; skip it otherwise.
    fn child<S: EventSource>(
        &self,
        cursor: &mut Cursor<S>,
        tag: &Tag,
        legal: &[Role],
        parent: Role,
    ) -> Result<Option<Node>> {
        let position = cursor.position();
        let role = match Role::of(&tag.attrs) {
            Some(role) if legal.contains(&role) => role,
            Some(role) => {
                log::warn!(
                    "{}: unexpected {} inside {}, skipping",
                    position,
                    role.name(),
                    parent.name()
                );
                return Ok(None);
            }
            None => {
                log::warn!(
                    "{}: unexpected <{}> inside {}, skipping",
                    position,
                    tag.name,
                    parent.name()
                );
                return Ok(None);
            }
        };

        match role {
            Role::Block => Ok(Some(Node::Block(self.block(cursor, tag)?))),
            Role::Paragraph => Ok(Some(Node::Paragraph(self.paragraph(cursor, tag)?))),
            Role::Line => Ok(self.line(cursor, tag)?.map(Node::Line)),
            Role::Word => Ok(self.word(cursor, tag)?.map(Node::Word)),
            Role::Page | Role::Alternatives => Ok(None),
        }
    }

    fn block<S: EventSource>(&self, cursor: &mut Cursor<S>, tag: &Tag) -> Result<Block> {
        let position = cursor.position();
        let title = Title::of(tag);
        let polygon = title.polygon(self.factor, position);
        let bbox = resolve_bbox(
            title.partial_box(),
            polygon.as_ref(),
            self.factor,
            Role::Block.name(),
            position,
        )?;

        let mut block = Block::new(bbox);
        block.polygon = polygon;
        cursor.children(|cursor, child| {
            if let Child::Element(tag) = child {
                match self.child(cursor, &tag, BLOCK_CHILDREN, Role::Block)? {
                    Some(Node::Paragraph(para)) => block.add_paragraph(para),
                    Some(Node::Line(line)) => block.add_line(line),
                    Some(Node::Block(_)) | Some(Node::Word(_)) | None => {}
                }
            }
            Ok(())
        })?;
        Ok(block)
    }

    fn paragraph<S: EventSource>(&self, cursor: &mut Cursor<S>, tag: &Tag) -> Result<Paragraph> {
        let position = cursor.position();
        let title = Title::of(tag);
        let polygon = title.polygon(self.factor, position);
        let bbox = title
            .partial_box()
            .complete()
            .map(|b| b.scaled(self.factor))
            .or_else(|| polygon.as_deref().and_then(BoundingBox::from_polygon));

        let mut para = Paragraph::new(bbox);
        para.polygon = polygon;
        cursor.children(|cursor, child| {
            if let Child::Element(tag) = child {
                if let Some(Node::Line(line)) =
                    self.child(cursor, &tag, PARAGRAPH_CHILDREN, Role::Paragraph)?
                {
                    para.add_line(line);
                }
            }
            Ok(())
        })?;
        Ok(para)
    }

    fn line<S: EventSource>(&self, cursor: &mut Cursor<S>, tag: &Tag) -> Result<Option<Line>> {
        let position = cursor.position();
        let title = Title::of(tag);
        let polygon = title.polygon(self.factor, position);
        let Ok(bbox) = resolve_bbox(
            title.partial_box(),
            polygon.as_ref(),
            self.factor,
            Role::Line.name(),
            position,
        ) else {
            log::debug!("{}: line without bbox, skipping", position);
            return Ok(None);
        };

        let mut line = Line::new(bbox);
        line.polygon = polygon;
        line.baseline = title
            .corners()
            .zip(title.numbers("baseline"))
            .and_then(|(corners, params)| baseline(corners, &params, self.factor));

        cursor.children(|cursor, child| {
            match child {
                Child::Text(text) => push_text(&mut line, text),
                Child::Element(tag) => {
                    if let Some(Node::Word(word)) =
                        self.child(cursor, &tag, LINE_CHILDREN, Role::Line)?
                    {
                        push_word(&mut line, word);
                    }
                }
            }
            Ok(())
        })?;

        line.trim_trailing_space();
        normalize_confidence(&mut line);
        Ok(Some(line))
    }

    fn word<S: EventSource>(&self, cursor: &mut Cursor<S>, tag: &Tag) -> Result<Option<Word>> {
        let position = cursor.position();
        let title = Title::of(tag);
        let polygon = title.polygon(self.factor, position);
        let bbox = resolve_bbox(
            title.partial_box(),
            polygon.as_ref(),
            self.factor,
            Role::Word.name(),
            position,
        )?;

        let mut content = WordContent::default();
        read_word_content(cursor, &mut content)?;

        let mut text = content.text.trim().to_string();
        let hyphen_start = text.ends_with(SOFT_HYPHEN);
        if hyphen_start {
            text.pop();
        }
        if text.is_empty() {
            log::debug!("{}: dropping word without text", position);
            return Ok(None);
        }

        let mut word = Word::new(text, bbox);
        word.polygon = polygon;
        word.hyphen_start = hyphen_start;
        word.confidence = title.number("x_wconf");
        word.choices = content.choices;
        Ok(Some(word))
    }
}

#[derive(Default)]
struct WordContent {
    text: String,
    choices: Vec<Choice>,
}

/// Collect the text of a word, descending into inline markup.
fn read_word_content<S: EventSource>(
    cursor: &mut Cursor<S>,
    content: &mut WordContent,
) -> Result<()> {
    cursor.children(|cursor, child| match child {
        Child::Text(text) => {
            content.text.push_str(&text);
            Ok(())
        }
        Child::Element(tag) if Role::of(&tag.attrs) == Some(Role::Alternatives) => {
            read_alternatives(cursor, content)
        }
        Child::Element(_) => read_word_content(cursor, content),
    })
}

/// `<ins>` holds the chosen reading, every `<del>` an alternative.
fn read_alternatives<S: EventSource>(
    cursor: &mut Cursor<S>,
    content: &mut WordContent,
) -> Result<()> {
    let mut canonical: Option<String> = None;
    cursor.children(|cursor, child| {
        let Child::Element(tag) = child else {
            return Ok(());
        };
        match tag.name.as_str() {
            "ins" => {
                let position = cursor.position();
                let text = cursor.text_content()?;
                if canonical.is_some() {
                    log::warn!("{}: more than one <ins> in alternatives, ignoring", position);
                } else {
                    canonical = Some(text);
                }
            }
            "del" => {
                let text = cursor.text_content()?;
                let text = text.trim();
                if !text.is_empty() {
                    content.choices.push(match nlp(&tag) {
                        Some(nlp) => Choice::from_nlp(text, nlp),
                        None => Choice::new(text),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    if let Some(text) = canonical {
        content.text.push_str(&text);
    }
    Ok(())
}

/// Negative log probability from an `nlp` attribute or `title` clause.
fn nlp(tag: &Tag) -> Option<f64> {
    tag.attrs
        .get("nlp")
        .and_then(|v| v.split_whitespace().next()?.parse().ok())
        .or_else(|| Title::of(tag).number("nlp"))
}

/// Convert `baseline slope intercept` (relative to the bottom-left corner)
/// into two points spanning the line.
fn baseline(corners: [f64; 4], params: &[f64], factor: f64) -> Option<Vec<Point>> {
    let [x0, _, x1, y1] = corners;
    let [slope, intercept] = *params else {
        return None;
    };
    let start = Point::new(x0, y1 + intercept);
    let end = Point::new(x1, y1 + intercept + slope * (x1 - x0));
    Some(vec![start.scaled(factor), end.scaled(factor)])
}

/// Whitespace collapses to one space fragment and never starts a line.
fn push_text(line: &mut Line, text: String) {
    if text.trim().is_empty() {
        if line.children.last().is_some_and(|c| !c.is_whitespace()) {
            line.children.push(LineItem::space());
        }
    } else {
        line.add_text(text);
    }
}

/// Append a word, inserting a space if it directly follows another word.
fn push_word(line: &mut Line, word: Word) {
    if let Some(LineItem::Word(prev)) = line.children.last() {
        if !prev.hyphen_start {
            line.children.push(LineItem::space());
        }
    }
    line.add_word(word);
}

/// Confidences above 1 mean the line uses percentages.
// TODO: decide per document instead of per line once mixed-scale samples exist
fn normalize_confidence(line: &mut Line) {
    let percent = line
        .words()
        .iter()
        .any(|w| w.confidence.is_some_and(|c| c > 1.0));
    if percent {
        for word in line.words_mut() {
            if let Some(c) = word.confidence.as_mut() {
                *c /= 100.0;
            }
        }
    }
}

fn image_source(title: &Title<'_>) -> Option<ImageSource> {
    let source = ImageSource {
        file_name: title.string("image"),
        file_id: None,
        document_id: title.string("x_source"),
        checksum: title.string("imagemd5").map(|value| Checksum {
            algorithm: "md5".to_string(),
            value,
        }),
        resolution: title
            .numbers("scan_res")
            .and_then(|r| match *r.as_slice() {
                [x, y] => Some(Resolution { x, y }),
                [xy] => Some(Resolution { x: xy, y: xy }),
                _ => None,
            }),
    };
    (!source.is_empty()).then_some(source)
}
