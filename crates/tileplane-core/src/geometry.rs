use serde::{Deserialize, Serialize};

/// A 2D point, either in device pixels or in model units depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Box anchored at the origin, as used for a `width` x `height` viewport.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(width, height))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// True when the box has no positive area.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Overlapping region of two boxes, if they share positive area.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let clipped = BBox::new(
            Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        );
        (!clipped.is_degenerate()).then_some(clipped)
    }
}
