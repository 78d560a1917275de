use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Uniform-scale affine transform from model space to device pixels:
/// `device = model * k + (x, y)`.
///
/// The tiled world spans `[-0.5, 0.5]` on both axes in model units, so at
/// scale `k` the whole plane is `k` pixels wide and centered on `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    /// Finite components and a strictly positive scale.
    pub fn is_valid(&self) -> bool {
        self.k.is_finite() && self.x.is_finite() && self.y.is_finite() && self.k > 0.0
    }

    pub fn apply(&self, point: &Point) -> Point {
        Point::new(point.x * self.k + self.x, point.y * self.k + self.y)
    }

    pub fn invert(&self, point: &Point) -> Point {
        Point::new(self.invert_x(point.x), self.invert_y(point.y))
    }

    pub fn invert_x(&self, x: f64) -> f64 {
        (x - self.x) / self.k
    }

    pub fn invert_y(&self, y: f64) -> f64 {
        (y - self.y) / self.k
    }

    /// Translate by a delta expressed in model units.
    pub fn translate_by(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.k, self.x + self.k * dx, self.y + self.k * dy)
    }

    /// Same scale, translated so that model point `model` lands on device point `device`.
    pub fn pinned(&self, device: &Point, model: &Point) -> Self {
        Self::new(
            self.k,
            device.x - model.x * self.k,
            device.y - model.y * self.k,
        )
    }
}
