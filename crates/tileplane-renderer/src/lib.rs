//! # Tileplane Renderer
//!
//! Incremental scene synchronization for the zoomable tiled plane.
//! Gestures update the viewport transform, the resolver turns it into a tile
//! set, and the tile cache reconciles a scene host against that set, reusing
//! every object it has created before.
//!
//! The scene itself sits behind the [`SceneHost`] trait; [`RetainedScene`]
//! keeps it in memory and exports JSON render frames or SVG.

pub mod cache;
pub mod input;
pub mod scene;
pub mod view;
pub mod viewport;

pub use cache::{ReconcileStats, TileCache};
pub use input::{InputEvent, InputSource, WheelDeltaMode};
pub use scene::{RenderFrame, RenderTile, RetainedScene, SceneHost, TileAppearance, TileHandle, TileObject};
pub use view::TileView;
pub use viewport::{ViewportConfig, ViewportController};
