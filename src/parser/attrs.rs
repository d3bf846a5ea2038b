//! Attribute and geometry utilities shared by both dialect decoders.

use std::borrow::Cow;
use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::options::Size;
use crate::error::{Error, Result};
use crate::model::{BoundingBox, PartialBox, Point, Polygon};

/// Largest difference between the x and y scale factors that is still
/// considered rounding.
const SCALE_TOLERANCE: f64 = 1e-3;

lazy_static! {
    static ref ENTITY_RE: Regex =
        Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|(amp|lt|gt|quot|apos));").unwrap();
}

/// Ordered list of raw attributes of one tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Create an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value of the first attribute with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over (name, value) pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get("class").unwrap_or_default().split_whitespace()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A coerced attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

/// Attributes with known numeric fields parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrMap(HashMap<String, AttrValue>);

impl AttrMap {
    /// Coerce the fields named in `numeric` to numbers; keep everything else as text.
    ///
    /// A numeric field whose value does not parse is left out.
    pub fn coerce(attrs: &Attributes, numeric: &[&str]) -> Self {
        let mut map = HashMap::with_capacity(attrs.len());
        for (name, value) in attrs.iter() {
            if numeric.contains(&name) {
                if let Ok(n) = value.trim().parse::<f64>() {
                    map.insert(name.to_string(), AttrValue::Number(n));
                }
            } else {
                map.insert(name.to_string(), AttrValue::Text(value.to_string()));
            }
        }
        Self(map)
    }

    /// Numeric value of a field.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.0.get(name)? {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }

    /// Text value of a field.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            AttrValue::Text(s) => Some(s),
            AttrValue::Number(_) => None,
        }
    }

    /// Read the four box fields by their dialect-specific names.
    pub fn bbox(&self, fields: &BoxFields) -> PartialBox {
        PartialBox {
            x: self.number(fields.x),
            y: self.number(fields.y),
            width: self.number(fields.width),
            height: self.number(fields.height),
        }
    }
}

/// Attribute names holding the box fields in a dialect.
#[derive(Debug, Clone, Copy)]
pub struct BoxFields {
    pub x: &'static str,
    pub y: &'static str,
    pub width: &'static str,
    pub height: &'static str,
}

/// Why a point list could not be used as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum PointsError {
    /// Odd number of coordinates; holds the best-effort pairing
    OddLength(Polygon),
    /// A token is not a number
    Invalid(String),
}

/// Parse a whitespace/comma-delimited coordinate list into scaled points.
pub fn parse_points(raw: &str, factor: f64) -> std::result::Result<Polygon, PointsError> {
    let mut coords = Vec::new();
    for token in raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        let n = token
            .parse::<f64>()
            .map_err(|_| PointsError::Invalid(token.to_string()))?;
        coords.push(n);
    }

    let points: Polygon = coords
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]).scaled(factor))
        .collect();

    if coords.len() % 2 == 1 {
        Err(PointsError::OddLength(points))
    } else {
        Ok(points)
    }
}

/// Resolve an element's box, deriving it from the polygon if attributes are incomplete.
///
/// `partial` is in native units and gets scaled; `polygon` is expected to be
/// scaled already.
pub fn resolve_bbox(
    partial: PartialBox,
    polygon: Option<&Polygon>,
    factor: f64,
    element: &str,
    position: u64,
) -> Result<BoundingBox> {
    if let Some(bbox) = partial.complete() {
        return Ok(bbox.scaled(factor));
    }
    polygon
        .and_then(|p| BoundingBox::from_polygon(p))
        .ok_or_else(|| Error::MissingGeometry {
            element: element.to_string(),
            position,
        })
}

/// Factor converting native page coordinates to the reference resolution.
///
/// The x factor is authoritative; a diverging y factor is only reported.
/// Without a reference, or when it equals the native size, the factor is
/// exactly 1.
pub fn scale_factor(native: Size, reference: Option<Size>, position: u64) -> f64 {
    let Some(reference) = reference else {
        return 1.0;
    };
    if reference == native || native.width <= 0.0 {
        return 1.0;
    }
    let fx = reference.width / native.width;
    if native.height > 0.0 {
        let fy = reference.height / native.height;
        if (fx - fy).abs() > SCALE_TOLERANCE {
            log::warn!(
                "{}: horizontal scale factor {:.4} differs from vertical {:.4}, using horizontal",
                position,
                fx,
                fy
            );
        }
    }
    fx
}

/// Replace named, decimal and hexadecimal character references.
///
/// Strings without `&` are returned untouched. Unknown or invalid references
/// are kept verbatim.
pub fn resolve_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    ENTITY_RE.replace_all(s, |caps: &Captures| {
        let decoded = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16)
                .ok()
                .and_then(char::from_u32)
        } else if let Some(dec) = caps.get(2) {
            dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
        } else {
            caps.get(3).map(|name| match name.as_str() {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                _ => '\'',
            })
        };
        decoded
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALTO_FIELDS: BoxFields = BoxFields {
        x: "HPOS",
        y: "VPOS",
        width: "WIDTH",
        height: "HEIGHT",
    };

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_coerce_numeric() {
        let a = attrs(&[("HPOS", "10"), ("VPOS", "x"), ("ID", "w1")]);
        let map = AttrMap::coerce(&a, &["HPOS", "VPOS", "WIDTH"]);
        assert_eq!(map.number("HPOS"), Some(10.0));
        assert_eq!(map.number("VPOS"), None);
        assert_eq!(map.number("WIDTH"), None);
        assert_eq!(map.text("ID"), Some("w1"));
        assert_eq!(map.number("ID"), None);
    }

    #[test]
    fn test_bbox_extraction() {
        let a = attrs(&[("HPOS", "1"), ("VPOS", "2"), ("WIDTH", "3"), ("HEIGHT", "4")]);
        let map = AttrMap::coerce(&a, &["HPOS", "VPOS", "WIDTH", "HEIGHT"]);
        assert_eq!(
            map.bbox(&ALTO_FIELDS).complete(),
            Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0))
        );

        let a = attrs(&[("HPOS", "1"), ("VPOS", "2")]);
        let map = AttrMap::coerce(&a, &["HPOS", "VPOS", "WIDTH", "HEIGHT"]);
        assert!(map.bbox(&ALTO_FIELDS).is_incomplete());
    }

    #[test]
    fn test_parse_points() {
        let poly = parse_points("1,2 3,4 5 6", 2.0).unwrap();
        assert_eq!(
            poly,
            vec![
                Point::new(2.0, 4.0),
                Point::new(6.0, 8.0),
                Point::new(10.0, 12.0)
            ]
        );
    }

    #[test]
    fn test_parse_points_malformed() {
        match parse_points("1 2 3", 1.0) {
            Err(PointsError::OddLength(best)) => assert_eq!(best, vec![Point::new(1.0, 2.0)]),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_points("1 two", 1.0),
            Err(PointsError::Invalid(_))
        ));
    }

    #[test]
    fn test_resolve_bbox_from_polygon() {
        let poly = vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)];
        let bbox = resolve_bbox(PartialBox::default(), Some(&poly), 1.0, "String", 0).unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 10.0, 5.0));
    }

    #[test]
    fn test_resolve_bbox_missing() {
        let err = resolve_bbox(PartialBox::default(), None, 1.0, "String", 42).unwrap_err();
        assert!(matches!(err, Error::MissingGeometry { position: 42, .. }));
    }

    #[test]
    fn test_scale_factor() {
        let native = Size::new(800.0, 600.0);
        assert_eq!(scale_factor(native, None, 0), 1.0);
        assert_eq!(scale_factor(native, Some(native), 0), 1.0);
        assert_eq!(scale_factor(native, Some(Size::new(400.0, 300.0)), 0), 0.5);
        // y disagrees: x wins
        assert_eq!(scale_factor(native, Some(Size::new(1600.0, 600.0)), 0), 2.0);
    }

    #[test]
    fn test_resolve_entities() {
        assert_eq!(resolve_entities("plain"), "plain");
        assert_eq!(resolve_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(resolve_entities("&#65;&#x42;&quot;&apos;"), "AB\"'");
        assert_eq!(resolve_entities("&nbsp; &#xZZ;"), "&nbsp; &#xZZ;");
        assert_eq!(resolve_entities("&#x110000;"), "&#x110000;");
    }
}
