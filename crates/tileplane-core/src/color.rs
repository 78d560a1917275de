use serde::{Deserialize, Serialize};

use crate::hilbert::hilbert_position;
use crate::tile::GridCoordinate;

/// Opaque RGB color for a tile fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TileColor {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_f32_array(&self, opacity: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            opacity,
        ]
    }

    /// CSS hex notation, e.g. `#6e40aa`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// Cubehelix basis.
const A: f64 = -0.14861;
const B: f64 = 1.78277;
const C: f64 = -0.29227;
const D: f64 = -0.90649;
const E: f64 = 1.97294;

/// Cyclical rainbow ramp built on the cubehelix color space.
///
/// `t` outside `[0, 1]` wraps around, so `t` and `t + 1` give the same color.
pub fn interpolate_rainbow(t: f64) -> TileColor {
    let t = if (0.0..=1.0).contains(&t) { t } else { t - t.floor() };
    let ts = (t - 0.5).abs();
    let hue = 360.0 * t - 100.0;
    let saturation = 1.5 - 1.5 * ts;
    let lightness = 0.8 - 0.9 * ts;
    cubehelix_to_rgb(hue, saturation, lightness)
}

fn cubehelix_to_rgb(hue: f64, saturation: f64, lightness: f64) -> TileColor {
    let h = (hue + 120.0).to_radians();
    let a = saturation * lightness * (1.0 - lightness);
    let (sin_h, cos_h) = h.sin_cos();
    TileColor::new(
        channel(lightness + a * (A * cos_h + B * sin_h)),
        channel(lightness + a * (C * cos_h + D * sin_h)),
        channel(lightness + a * (E * cos_h)),
    )
}

fn channel(v: f64) -> u8 {
    (v * 255.0).clamp(0.0, 255.0).round() as u8
}

/// The fill color of a tile: its Hilbert position run through the rainbow ramp.
///
/// Depends only on `(x, y, z)`.
pub fn tile_color(coord: &GridCoordinate) -> TileColor {
    interpolate_rainbow(hilbert_position(coord))
}
