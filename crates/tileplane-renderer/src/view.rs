use tileplane_core::{TileError, TileResolver, TileSet, ZoomTransform};

use crate::cache::{ReconcileStats, TileCache};
use crate::input::{InputEvent, InputSource};
use crate::scene::{RenderFrame, RetainedScene, SceneHost};
use crate::viewport::{ViewportConfig, ViewportController};

/// A zoomable tiled plane bound to a scene.
///
/// Owns the controller, resolver, cache, and scene. Every transform change
/// is resolved and reconciled synchronously before the call returns.
pub struct TileView<S: SceneHost> {
    controller: ViewportController,
    resolver: TileResolver,
    cache: TileCache<S::Handle>,
    scene: S,
    tiles: TileSet,
}

impl<S: SceneHost> TileView<S> {
    /// Build the view and render the initial transform.
    pub fn new(config: ViewportConfig, scene: S) -> Result<Self, TileError> {
        let controller = ViewportController::new(config)?;
        let resolver = TileResolver::with_extent(controller.extent());
        let tiles = resolver.resolve(&controller.transform())?;

        let mut view = Self {
            controller,
            resolver,
            cache: TileCache::new(),
            scene,
            tiles,
        };
        let stats = view.cache.reconcile(&view.tiles, &mut view.scene)?;
        view.scene.present();

        let t = view.controller.transform();
        log::info!(
            "Tile view {}x{} at scale {} (zoom {}, {} tiles)",
            config.width,
            config.height,
            t.k,
            view.tiles.zoom,
            stats.created
        );
        Ok(view)
    }

    /// Apply one input event; returns the reconciliation it caused, if any.
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<Option<ReconcileStats>, TileError> {
        if let InputEvent::Resize { width, height } = *event {
            return self.resize(width, height).map(Some);
        }
        match self.controller.handle(event) {
            Some(_) => self.redraw().map(Some),
            None => Ok(None),
        }
    }

    /// Entry point for transforms computed by an external gesture library.
    pub fn on_transform_change(&mut self, transform: ZoomTransform) -> Result<Option<ReconcileStats>, TileError> {
        match self.controller.set_transform(transform) {
            Some(_) => self.redraw().map(Some),
            None => Ok(None),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<ReconcileStats, TileError> {
        self.controller.resize(width, height);
        self.scene.resize(f64::from(width), f64::from(height));
        self.redraw()
    }

    /// Process every pending event in delivery order. Returns the number of
    /// frames reconciled.
    pub fn drain<I: InputSource>(&mut self, source: &mut I) -> Result<usize, TileError> {
        let mut frames = 0;
        while let Some(event) = source.next_event() {
            if self.handle_event(&event)?.is_some() {
                frames += 1;
            }
        }
        Ok(frames)
    }

    fn redraw(&mut self) -> Result<ReconcileStats, TileError> {
        self.resolver.set_extent(self.controller.extent());
        let tiles = self.resolver.resolve(&self.controller.transform())?;
        if tiles.zoom != self.tiles.zoom {
            log::debug!("Zoom level {} -> {}", self.tiles.zoom, tiles.zoom);
        }

        let stats = self.cache.reconcile(&tiles, &mut self.scene)?;
        self.scene.present();
        log::trace!(
            "Reconciled {} tiles: {} created, {} reused, {} hidden (cache {})",
            tiles.len(),
            stats.created,
            stats.reused,
            stats.hidden,
            self.cache.len()
        );

        self.tiles = tiles;
        Ok(stats)
    }

    pub fn transform(&self) -> ZoomTransform {
        self.controller.transform()
    }

    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    /// Tile set of the most recent frame.
    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn cache(&self) -> &TileCache<S::Handle> {
        &self.cache
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }
}

impl TileView<RetainedScene> {
    /// Retained view sized to the configured viewport.
    pub fn retained(config: ViewportConfig) -> Result<Self, TileError> {
        let scene = RetainedScene::new(f64::from(config.width), f64::from(config.height));
        Self::new(config, scene)
    }

    /// Snapshot of the current frame for a frontend canvas.
    pub fn render_frame(&self) -> RenderFrame {
        self.scene.to_frame(self.transform(), self.tiles.zoom)
    }
}
