use std::collections::HashSet;
use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use tileplane_core::{tile_color, GridCoordinate, Point, TileColor, ZoomTransform, TILE_SIZE};

/// Fill opacity of every tile rect.
pub const TILE_FILL_OPACITY: f32 = 0.5;

/// Everything a host needs to build the object for one tile.
///
/// Computed once, when the tile is first seen; repositioning never
/// recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileAppearance {
    pub coord: GridCoordinate,
    /// `x/y/z` label drawn in the tile's corner.
    pub label: String,
    pub fill: TileColor,
    pub fill_opacity: f32,
    pub stroke: TileColor,
}

impl TileAppearance {
    pub fn for_tile(coord: &GridCoordinate) -> Self {
        Self {
            coord: *coord,
            label: coord.to_string(),
            fill: tile_color(coord),
            fill_opacity: TILE_FILL_OPACITY,
            stroke: TileColor::BLACK,
        }
    }
}

/// The render surface the tile cache writes into.
///
/// Objects are `TILE_SIZE` units square; `set_scale` maps them onto their
/// device footprint. Newly created objects start visible and are not drawn
/// until appended.
pub trait SceneHost {
    type Handle: Copy + fmt::Debug;

    fn create_tile_object(&mut self, appearance: &TileAppearance) -> Self::Handle;
    fn set_position(&mut self, handle: Self::Handle, x: f64, y: f64);
    fn set_scale(&mut self, handle: Self::Handle, scale: f64);
    fn set_visible(&mut self, handle: Self::Handle, visible: bool);
    /// Add the object to the end of the draw order.
    fn append(&mut self, handle: Self::Handle);

    /// Called once the frame's reconciliation is complete.
    fn present(&mut self) {}

    /// The viewport changed size.
    fn resize(&mut self, _width: f64, _height: f64) {}
}

/// Handle of an object inside a [`RetainedScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileHandle(pub usize);

/// A retained tile object with its current placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileObject {
    pub appearance: TileAppearance,
    pub position: Point,
    pub scale: f64,
    pub visible: bool,
}

impl TileObject {
    /// Edge length in device pixels.
    pub fn size(&self) -> f64 {
        TILE_SIZE * self.scale
    }
}

/// In-memory scene graph: objects in creation order plus a draw list.
#[derive(Debug, Clone, Default)]
pub struct RetainedScene {
    width: f64,
    height: f64,
    objects: Vec<TileObject>,
    draw_order: Vec<TileHandle>,
    /// Handles already in `draw_order`.
    drawn: HashSet<TileHandle>,
    frames_presented: u64,
}

impl RetainedScene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn object(&self, handle: TileHandle) -> Option<&TileObject> {
        self.objects.get(handle.0)
    }

    /// Number of objects ever created.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn draw_order(&self) -> &[TileHandle] {
        &self.draw_order
    }

    /// Visible objects, back to front.
    pub fn visible_objects(&self) -> impl Iterator<Item = &TileObject> {
        self.draw_order
            .iter()
            .filter_map(|h| self.objects.get(h.0))
            .filter(|o| o.visible)
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Snapshot of the visible tiles for a frontend canvas.
    pub fn to_frame(&self, transform: ZoomTransform, zoom: u8) -> RenderFrame {
        RenderFrame {
            width: self.width,
            height: self.height,
            transform,
            zoom,
            tiles: self
                .visible_objects()
                .map(|o| RenderTile {
                    label: o.appearance.label.clone(),
                    color: o.appearance.fill.to_f32_array(o.appearance.fill_opacity),
                    position: [o.position.x, o.position.y],
                    size: o.size(),
                })
                .collect(),
        }
    }

    /// Standalone SVG document of the visible tiles.
    pub fn to_svg(&self) -> Result<String, fmt::Error> {
        let mut svg = String::new();
        writeln!(
            svg,
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
            w = self.width,
            h = self.height
        )?;
        writeln!(svg, r#"<g pointer-events="none" font-family="sans-serif" font-size="16">"#)?;
        for o in self.visible_objects() {
            let a = &o.appearance;
            writeln!(
                svg,
                r#"<g transform="translate({x},{y}) scale({s})"><rect width="{size}" height="{size}" fill="{fill}" fill-opacity="{opacity}" stroke="{stroke}"/><text x="0.4em" y="1.2em">{label}</text></g>"#,
                x = o.position.x,
                y = o.position.y,
                s = o.scale,
                size = TILE_SIZE,
                fill = a.fill.to_hex(),
                opacity = a.fill_opacity,
                stroke = a.stroke.to_hex(),
                label = a.label,
            )?;
        }
        writeln!(svg, "</g>")?;
        writeln!(svg, "</svg>")?;
        Ok(svg)
    }
}

impl SceneHost for RetainedScene {
    type Handle = TileHandle;

    fn create_tile_object(&mut self, appearance: &TileAppearance) -> TileHandle {
        self.objects.push(TileObject {
            appearance: appearance.clone(),
            position: Point::new(0.0, 0.0),
            scale: 1.0,
            visible: true,
        });
        TileHandle(self.objects.len() - 1)
    }

    fn set_position(&mut self, handle: TileHandle, x: f64, y: f64) {
        if let Some(object) = self.objects.get_mut(handle.0) {
            object.position = Point::new(x, y);
        }
    }

    fn set_scale(&mut self, handle: TileHandle, scale: f64) {
        if let Some(object) = self.objects.get_mut(handle.0) {
            object.scale = scale;
        }
    }

    fn set_visible(&mut self, handle: TileHandle, visible: bool) {
        if let Some(object) = self.objects.get_mut(handle.0) {
            object.visible = visible;
        }
    }

    fn append(&mut self, handle: TileHandle) {
        if handle.0 < self.objects.len() && self.drawn.insert(handle) {
            self.draw_order.push(handle);
        }
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

/// One visible tile, ready to be drawn by the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderTile {
    pub label: String,
    pub color: [f32; 4], // RGBA
    /// Top-left corner in device pixels.
    pub position: [f64; 2],
    /// Edge length in device pixels.
    pub size: f64,
}

/// Complete render frame data sent to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub width: f64,
    pub height: f64,
    pub transform: ZoomTransform,
    pub zoom: u8,
    pub tiles: Vec<RenderTile>,
}

impl RenderFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: u32, y: u32, z: u8) -> GridCoordinate {
        GridCoordinate::new(x, y, z).unwrap()
    }

    #[test]
    fn test_appearance_for_tile() {
        let appearance = TileAppearance::for_tile(&coord(0, 0, 0));
        assert_eq!(appearance.label, "0/0/0");
        assert_eq!(appearance.fill, TileColor::new(110, 64, 170));
        assert_eq!(appearance.stroke, TileColor::BLACK);
    }

    #[test]
    fn test_draw_order_follows_append() {
        let mut scene = RetainedScene::new(100.0, 100.0);
        let a = scene.create_tile_object(&TileAppearance::for_tile(&coord(0, 0, 1)));
        let b = scene.create_tile_object(&TileAppearance::for_tile(&coord(1, 0, 1)));
        scene.append(b);
        scene.append(a);
        scene.append(b);
        assert_eq!(scene.draw_order(), &[b, a]);
    }

    #[test]
    fn test_append_ignores_unknown_and_repeated_handles() {
        let mut scene = RetainedScene::new(100.0, 100.0);
        let handles: Vec<TileHandle> = (0..64)
            .map(|x| scene.create_tile_object(&TileAppearance::for_tile(&coord(x, 0, 6))))
            .collect();
        for handle in handles.iter().rev().chain(handles.iter()) {
            scene.append(*handle);
        }
        scene.append(TileHandle(64));

        assert_eq!(scene.draw_order().len(), 64);
        assert_eq!(scene.draw_order()[0], TileHandle(63));
        assert_eq!(scene.draw_order()[63], TileHandle(0));
    }

    #[test]
    fn test_hidden_objects_not_rendered() {
        let mut scene = RetainedScene::new(512.0, 512.0);
        let a = scene.create_tile_object(&TileAppearance::for_tile(&coord(0, 0, 1)));
        let b = scene.create_tile_object(&TileAppearance::for_tile(&coord(1, 0, 1)));
        scene.append(a);
        scene.append(b);
        scene.set_position(b, 256.0, 0.0);
        scene.set_scale(b, 0.5);
        scene.set_visible(a, false);

        let frame = scene.to_frame(ZoomTransform::new(512.0, 256.0, 256.0), 1);
        assert_eq!(frame.tiles.len(), 1);
        assert_eq!(frame.tiles[0].label, "1/0/1");
        assert_eq!(frame.tiles[0].position, [256.0, 0.0]);
        assert!((frame.tiles[0].size - 128.0).abs() < 1e-10);
    }

    #[test]
    fn test_svg_export() {
        let mut scene = RetainedScene::new(256.0, 256.0);
        let h = scene.create_tile_object(&TileAppearance::for_tile(&coord(0, 0, 0)));
        scene.append(h);

        let svg = scene.to_svg().unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r##"fill="#6e40aa""##));
        assert!(svg.contains(">0/0/0</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_present_counts_frames() {
        let mut scene = RetainedScene::new(1.0, 1.0);
        scene.present();
        scene.present();
        assert_eq!(scene.frames_presented(), 2);
    }
}
