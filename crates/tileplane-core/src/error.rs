use thiserror::Error;

use crate::tile::GridCoordinate;

/// Errors raised by tile resolution and caching.
///
/// All of these indicate a programming or invariant error rather than an
/// expected runtime failure. A zero-sized viewport is not an error: it
/// resolves to an empty tile set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TileError {
    #[error("Invalid grid coordinate {x}/{y}/{z}: index must be below 2^z and z at most {max_zoom}")]
    InvalidCoordinate {
        x: u32,
        y: u32,
        z: u32,
        max_zoom: u8,
    },

    #[error("Invalid zoom transform (k={k}, x={x}, y={y}): components must be finite and k positive")]
    InvalidTransform { k: f64, x: f64, y: f64 },

    #[error("Viewport would need {count} tiles at zoom {zoom}, more than the limit of {limit}")]
    TooManyTiles { count: u64, zoom: u8, limit: u64 },

    #[error("Tile {0} was repositioned but is not in the cache")]
    CacheInconsistency(GridCoordinate),

    #[error("Invalid viewport configuration: {0}")]
    InvalidConfig(String),
}
