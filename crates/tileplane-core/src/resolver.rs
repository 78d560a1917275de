//! Resolution of a zoom transform into the tiles covering a viewport.

use crate::error::TileError;
use crate::geometry::BBox;
use crate::tile::{GridCoordinate, TileSet, MAX_TILES, MAX_ZOOM, TILE_SIZE};
use crate::transform::ZoomTransform;

/// Computes the visible tile set for a viewport extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileResolver {
    /// Device-space rectangle the tiles must cover.
    extent: BBox,
    /// Bias added to the natural zoom level before rounding.
    zoom_delta: f64,
}

impl TileResolver {
    /// Resolver for a `width` x `height` viewport anchored at the origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_extent(BBox::from_size(width, height))
    }

    pub fn with_extent(extent: BBox) -> Self {
        Self {
            extent,
            zoom_delta: 0.0,
        }
    }

    /// Positive values pick a finer level (smaller, more numerous tiles).
    ///
    /// Clamped to `[-MAX_ZOOM, MAX_ZOOM]`; a non-finite delta is treated as zero.
    pub fn with_zoom_delta(mut self, zoom_delta: f64) -> Self {
        let limit = f64::from(MAX_ZOOM);
        self.zoom_delta = if zoom_delta.is_finite() {
            zoom_delta.clamp(-limit, limit)
        } else {
            0.0
        };
        self
    }

    pub fn zoom_delta(&self) -> f64 {
        self.zoom_delta
    }

    pub fn extent(&self) -> BBox {
        self.extent
    }

    pub fn set_extent(&mut self, extent: BBox) {
        self.extent = extent;
    }

    /// Integer zoom level whose tiles are closest to their native 256 px size at scale `k`.
    pub fn zoom_level(&self, k: f64) -> u8 {
        let natural = (k / TILE_SIZE).log2() + self.zoom_delta;
        let rounded = (natural.max(0.0) + 0.5).floor();
        rounded.min(f64::from(MAX_ZOOM)) as u8
    }

    /// Tiles intersecting the extent under `transform`, in row-major order.
    ///
    /// A degenerate extent yields an empty set. Indices are clamped to the
    /// grid; the plane does not wrap.
    pub fn resolve(&self, transform: &ZoomTransform) -> Result<TileSet, TileError> {
        if !transform.is_valid() {
            return Err(TileError::InvalidTransform {
                k: transform.k,
                x: transform.x,
                y: transform.y,
            });
        }

        let z = self.zoom_level(transform.k);
        let side = 1u64 << z;
        let tile_k = transform.k / side as f64;

        // Device position of the world's top-left corner.
        let origin_x = transform.x - transform.k / 2.0;
        let origin_y = transform.y - transform.k / 2.0;
        let translate = [origin_x / tile_k, origin_y / tile_k];

        if self.extent.is_degenerate() {
            log::debug!(
                "Degenerate viewport {}x{}, no tiles resolved",
                self.extent.width(),
                self.extent.height()
            );
            return Ok(TileSet::empty(z, translate, tile_k));
        }

        let (x_min, x_max) = index_span(self.extent.min.x, self.extent.max.x, origin_x, tile_k, side);
        let (y_min, y_max) = index_span(self.extent.min.y, self.extent.max.y, origin_y, tile_k, side);

        let count = u64::from(x_max - x_min)
            .checked_mul(u64::from(y_max - y_min))
            .filter(|count| *count <= MAX_TILES)
            .ok_or_else(|| TileError::TooManyTiles {
                count: u64::from(x_max - x_min).saturating_mul(u64::from(y_max - y_min)),
                zoom: z,
                limit: MAX_TILES,
            })?;

        let mut tiles = Vec::with_capacity(count as usize);
        for y in y_min..y_max {
            for x in x_min..x_max {
                tiles.push(GridCoordinate::new(x, y, z)?);
            }
        }

        Ok(TileSet::new(z, translate, tile_k, tiles))
    }
}

/// Half-open index range `[lo, hi)` of tiles overlapping `[from, to]`, clamped to `[0, side)`.
fn index_span(from: f64, to: f64, origin: f64, tile_k: f64, side: u64) -> (u32, u32) {
    let side = side as f64;
    let lo = ((from - origin) / tile_k).floor().clamp(0.0, side);
    let hi = ((to - origin) / tile_k).ceil().clamp(0.0, side);
    if hi <= lo {
        return (0, 0);
    }
    (lo as u32, hi as u32)
}
