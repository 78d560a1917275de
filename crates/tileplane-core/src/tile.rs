use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TileError;
use crate::geometry::{BBox, Point};

/// Edge length of a tile in model units.
pub const TILE_SIZE: f64 = 256.0;

/// Deepest zoom level a coordinate may carry. Keeps `4^z` inside a `u64`.
pub const MAX_ZOOM: u8 = 30;

/// Largest number of tiles a single resolution may produce.
pub const MAX_TILES: u64 = 1 << 16;

/// A tile index `(x, y)` at zoom level `z`, with `0 <= x, y < 2^z`.
///
/// Construction validates the range, so every value in circulation is a
/// real tile. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[u32; 3]", try_from = "[u32; 3]")]
pub struct GridCoordinate {
    x: u32,
    y: u32,
    z: u8,
}

impl GridCoordinate {
    pub fn new(x: u32, y: u32, z: u8) -> Result<Self, TileError> {
        let in_range = z <= MAX_ZOOM && u64::from(x) < (1u64 << z) && u64::from(y) < (1u64 << z);
        if !in_range {
            return Err(TileError::InvalidCoordinate {
                x,
                y,
                z: u32::from(z),
                max_zoom: MAX_ZOOM,
            });
        }
        Ok(Self { x, y, z })
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn z(&self) -> u8 {
        self.z
    }

    /// Number of tiles along one edge of the grid at this level (`2^z`).
    pub fn side(&self) -> u64 {
        1u64 << self.z
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.x, self.y, self.z)
    }
}

impl From<GridCoordinate> for [u32; 3] {
    fn from(coord: GridCoordinate) -> Self {
        [coord.x, coord.y, u32::from(coord.z)]
    }
}

impl TryFrom<[u32; 3]> for GridCoordinate {
    type Error = TileError;

    fn try_from([x, y, z]: [u32; 3]) -> Result<Self, Self::Error> {
        let level = u8::try_from(z).map_err(|_| TileError::InvalidCoordinate {
            x,
            y,
            z,
            max_zoom: MAX_ZOOM,
        })?;
        Self::new(x, y, level)
    }
}

/// The tiles visible for one transform evaluation.
///
/// All tiles share one zoom level. The affine parameters place tile `(x, y)`
/// at device position `((x + tx) * scale, (y + ty) * scale)` with an edge
/// length of `scale` pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSet {
    pub zoom: u8,
    pub translate: [f64; 2],
    pub scale: f64,
    pub tiles: Vec<GridCoordinate>,
}

impl TileSet {
    pub fn new(zoom: u8, translate: [f64; 2], scale: f64, tiles: Vec<GridCoordinate>) -> Self {
        Self {
            zoom,
            translate,
            scale,
            tiles,
        }
    }

    /// A set with placement parameters but no tiles.
    pub fn empty(zoom: u8, translate: [f64; 2], scale: f64) -> Self {
        Self::new(zoom, translate, scale, Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridCoordinate> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, coord: &GridCoordinate) -> bool {
        self.tiles.contains(coord)
    }

    /// Device position of the tile's top-left corner.
    pub fn position_of(&self, coord: &GridCoordinate) -> Point {
        let [tx, ty] = self.translate;
        Point::new(
            (f64::from(coord.x()) + tx) * self.scale,
            (f64::from(coord.y()) + ty) * self.scale,
        )
    }

    /// Scale factor that maps a `TILE_SIZE` object onto its device footprint.
    pub fn tile_scale(&self) -> f64 {
        self.scale / TILE_SIZE
    }

    /// Device-space footprint of a tile.
    pub fn bounds_of(&self, coord: &GridCoordinate) -> BBox {
        let origin = self.position_of(coord);
        BBox::new(origin, origin.translate(self.scale, self.scale))
    }
}
