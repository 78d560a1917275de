//! # Tileplane Core
//!
//! Pure tile math for the zoomable tiled plane: validated grid coordinates,
//! the zoom transform, Hilbert-curve coloring, and resolution of a transform
//! into the set of tiles covering the viewport.
//!
//! Nothing in this crate touches a scene; see `tileplane-renderer` for the
//! tile object cache and viewport controller.

pub mod color;
pub mod error;
pub mod geometry;
pub mod hilbert;
pub mod resolver;
pub mod tile;
pub mod transform;

pub use color::{interpolate_rainbow, tile_color, TileColor};
pub use error::TileError;
pub use geometry::{BBox, Point};
pub use hilbert::{hilbert_index, hilbert_position};
pub use resolver::TileResolver;
pub use tile::{GridCoordinate, TileSet, MAX_TILES, MAX_ZOOM, TILE_SIZE};
pub use transform::ZoomTransform;
