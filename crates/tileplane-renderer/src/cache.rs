//! Tile object cache: keeps one scene object per tile ever seen and
//! reconciles the scene against each new tile set.
//!
//! Entries are never evicted. Revisiting a region costs no object creation,
//! at the price of unbounded growth over very long pan histories; the hide
//! pass scans every entry, so reconciliation is O(tiles + cache size).

use std::collections::HashMap;

use serde::Serialize;
use tileplane_core::{GridCoordinate, TileColor, TileError, TileSet};

use crate::scene::{SceneHost, TileAppearance};

/// What one reconciliation did to the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Objects created for tiles seen for the first time.
    pub created: usize,
    /// Cached objects repositioned for this frame.
    pub reused: usize,
    /// Objects hidden because their tile left the set.
    pub hidden: usize,
}

#[derive(Debug, Clone)]
struct CachedTile<H> {
    handle: H,
    color: TileColor,
    visible: bool,
    /// Generation of the last reconciliation that placed this tile.
    seen: u64,
}

/// Mapping from grid coordinate to its scene object.
#[derive(Debug, Clone)]
pub struct TileCache<H> {
    entries: HashMap<GridCoordinate, CachedTile<H>>,
    generation: u64,
}

impl<H: Copy> Default for TileCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy> TileCache<H> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            generation: 0,
        }
    }

    /// Bring the scene in line with `tiles`: reuse cached objects, create
    /// missing ones, hide the rest.
    ///
    /// A coordinate listed twice is placed twice at the same spot.
    pub fn reconcile<S>(&mut self, tiles: &TileSet, scene: &mut S) -> Result<ReconcileStats, TileError>
    where
        S: SceneHost<Handle = H>,
    {
        self.generation += 1;
        let mut stats = ReconcileStats::default();

        for coord in tiles.iter() {
            match self.entries.get(coord).map(|entry| entry.seen) {
                None => {
                    self.insert_new(coord, tiles, scene);
                    stats.created += 1;
                }
                Some(seen) => {
                    if seen != self.generation {
                        stats.reused += 1;
                    }
                    self.reposition(coord, tiles, scene)?;
                }
            }
        }

        for entry in self.entries.values_mut() {
            if entry.seen != self.generation && entry.visible {
                scene.set_visible(entry.handle, false);
                entry.visible = false;
                stats.hidden += 1;
            }
        }

        Ok(stats)
    }

    /// Show a cached tile and move it to its place in `tiles`.
    pub fn reposition<S>(&mut self, coord: &GridCoordinate, tiles: &TileSet, scene: &mut S) -> Result<(), TileError>
    where
        S: SceneHost<Handle = H>,
    {
        let generation = self.generation;
        let entry = self
            .entries
            .get_mut(coord)
            .ok_or(TileError::CacheInconsistency(*coord))?;

        if !entry.visible {
            scene.set_visible(entry.handle, true);
            entry.visible = true;
        }
        let position = tiles.position_of(coord);
        scene.set_position(entry.handle, position.x, position.y);
        scene.set_scale(entry.handle, tiles.tile_scale());
        entry.seen = generation;
        Ok(())
    }

    fn insert_new<S>(&mut self, coord: &GridCoordinate, tiles: &TileSet, scene: &mut S)
    where
        S: SceneHost<Handle = H>,
    {
        let appearance = TileAppearance::for_tile(coord);
        let handle = scene.create_tile_object(&appearance);
        let position = tiles.position_of(coord);
        scene.set_position(handle, position.x, position.y);
        scene.set_scale(handle, tiles.tile_scale());
        scene.append(handle);

        self.entries.insert(
            *coord,
            CachedTile {
                handle,
                color: appearance.fill,
                visible: true,
                seen: self.generation,
            },
        );
    }

    /// Number of cached tiles, visible or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn visible_count(&self) -> usize {
        self.entries.values().filter(|e| e.visible).count()
    }

    pub fn contains(&self, coord: &GridCoordinate) -> bool {
        self.entries.contains_key(coord)
    }

    pub fn is_visible(&self, coord: &GridCoordinate) -> bool {
        self.entries.get(coord).is_some_and(|e| e.visible)
    }

    /// Color assigned when the tile was first cached.
    pub fn color_of(&self, coord: &GridCoordinate) -> Option<TileColor> {
        self.entries.get(coord).map(|e| e.color)
    }

    pub fn handle_of(&self, coord: &GridCoordinate) -> Option<H> {
        self.entries.get(coord).map(|e| e.handle)
    }

    /// Coordinates of the currently visible tiles, in no particular order.
    pub fn visible_tiles(&self) -> impl Iterator<Item = &GridCoordinate> {
        self.entries
            .iter()
            .filter(|(_, e)| e.visible)
            .map(|(coord, _)| coord)
    }
}
