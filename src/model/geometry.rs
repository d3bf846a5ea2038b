//! Geometry primitives shared by every layout element.

use serde::{Deserialize, Serialize};

/// A point in pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Multiply both coordinates by `factor`.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Ordered outline of an element that is not axis-aligned.
pub type Polygon = Vec<Point>;

/// Axis-aligned rectangle in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Create a box from its origin and extent.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box from two opposite corners, in either order.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    /// Smallest box containing every point, or `None` for an empty polygon.
    pub fn from_polygon(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::from_corners(min_x, min_y, max_x, max_y))
    }

    /// Multiply every field by `factor`. A factor of exactly 1 is a no-op.
    pub fn scaled(self, factor: f64) -> Self {
        if factor == 1.0 {
            return self;
        }
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A bounding box whose fields may be individually missing.
///
/// Produced by attribute extraction; an incomplete box has to be resolved
/// against a polygon before it can be stored on an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PartialBox {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl PartialBox {
    /// The complete box, if all four fields are present.
    pub fn complete(&self) -> Option<BoundingBox> {
        Some(BoundingBox::new(self.x?, self.y?, self.width?, self.height?))
    }

    /// Check whether any field is missing.
    pub fn is_incomplete(&self) -> bool {
        self.complete().is_none()
    }
}

impl From<BoundingBox> for PartialBox {
    fn from(b: BoundingBox) -> Self {
        Self {
            x: Some(b.x),
            y: Some(b.y),
            width: Some(b.width),
            height: Some(b.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_polygon() {
        let poly = vec![
            Point::new(10.0, 20.0),
            Point::new(50.0, 15.0),
            Point::new(45.0, 60.0),
            Point::new(5.0, 40.0),
        ];
        let bbox = BoundingBox::from_polygon(&poly).unwrap();
        assert_eq!(bbox, BoundingBox::new(5.0, 15.0, 45.0, 45.0));
        assert_eq!(bbox.right(), 50.0);
        assert_eq!(bbox.bottom(), 60.0);
    }

    #[test]
    fn test_from_corners_inverted() {
        let bbox = BoundingBox::from_corners(50.0, 50.0, 10.0, 10.0);
        assert_eq!(bbox, BoundingBox::new(10.0, 10.0, 40.0, 40.0));
        assert_eq!(bbox, BoundingBox::from_corners(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_from_polygon_empty() {
        assert!(BoundingBox::from_polygon(&[]).is_none());
    }

    #[test]
    fn test_scaled_identity() {
        let bbox = BoundingBox::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(bbox.scaled(1.0), bbox);
        assert_eq!(bbox.scaled(2.0), BoundingBox::new(0.2, 0.4, 0.6, 0.8));
    }

    #[test]
    fn test_partial_box() {
        let partial = PartialBox {
            x: Some(1.0),
            y: Some(2.0),
            width: None,
            height: Some(4.0),
        };
        assert!(partial.is_incomplete());
        let full: PartialBox = BoundingBox::new(1.0, 2.0, 3.0, 4.0).into();
        assert_eq!(full.complete(), Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0)));
    }
}
