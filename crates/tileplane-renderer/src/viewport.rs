use serde::{Deserialize, Serialize};
use tileplane_core::{BBox, Point, TileError, ZoomTransform};

use crate::input::InputEvent;

/// Recognized viewport options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Allowed range of the transform scale `k`.
    pub scale_extent: [f64; 2],
    /// Model-space rectangle the viewport must stay within: `[[x0, y0], [x1, y1]]`.
    /// `None` leaves panning unbounded.
    pub translate_extent: Option<[[f64; 2]; 2]>,
    /// Scale of the initial transform.
    pub initial_scale: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 500,
            scale_extent: [f64::from(1u32 << 8), f64::from(1u32 << 22)],
            translate_extent: None,
            initial_scale: f64::from(1u32 << 10),
        }
    }
}

impl ViewportConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_translate_extent(mut self, min: [f64; 2], max: [f64; 2]) -> Self {
        self.translate_extent = Some([min, max]);
        self
    }

    pub fn validate(&self) -> Result<(), TileError> {
        if self.width == 0 || self.height == 0 {
            return Err(TileError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        let [min_k, max_k] = self.scale_extent;
        if !(min_k.is_finite() && max_k.is_finite() && min_k > 0.0 && min_k <= max_k) {
            return Err(TileError::InvalidConfig(format!(
                "scale extent [{min_k}, {max_k}] must be positive, finite and ordered"
            )));
        }
        if !(self.initial_scale.is_finite() && self.initial_scale > 0.0) {
            return Err(TileError::InvalidConfig(format!(
                "initial scale {} must be positive and finite",
                self.initial_scale
            )));
        }
        if let Some([[x0, y0], [x1, y1]]) = self.translate_extent {
            let finite = [x0, y0, x1, y1].iter().all(|v| v.is_finite());
            if !finite || x0 > x1 || y0 > y1 {
                return Err(TileError::InvalidConfig(format!(
                    "translate extent [[{x0}, {y0}], [{x1}, {y1}]] must be finite and ordered"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    /// Pointer held down; `grab` is the model point under it at press time.
    Dragging { grab: Point },
}

/// Owns the zoom transform and turns gestures into transform updates.
///
/// Every mutating method returns the new transform when it changed and
/// `None` otherwise, so callers redraw exactly once per change.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    width: f64,
    height: f64,
    transform: ZoomTransform,
    gesture: Gesture,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Result<Self, TileError> {
        config.validate()?;
        let mut controller = Self {
            config,
            width: f64::from(config.width),
            height: f64::from(config.height),
            transform: ZoomTransform::IDENTITY,
            gesture: Gesture::Idle,
        };
        controller.transform = controller.fit(controller.initial_transform());
        Ok(controller)
    }

    /// Origin centered in the viewport at the configured starting scale.
    pub fn initial_transform(&self) -> ZoomTransform {
        ZoomTransform::new(
            self.config.initial_scale,
            f64::from(self.config.width >> 1),
            f64::from(self.config.height >> 1),
        )
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Device-space rectangle of the viewport.
    pub fn extent(&self) -> BBox {
        BBox::from_size(self.width, self.height)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Apply one input event.
    ///
    /// `Resize` always reports the (possibly unchanged) transform since the
    /// visible extent moved.
    pub fn handle(&mut self, event: &InputEvent) -> Option<ZoomTransform> {
        match *event {
            InputEvent::PointerDown { x, y } => {
                let grab = self.transform.invert(&Point::new(x, y));
                self.gesture = Gesture::Dragging { grab };
                None
            }
            InputEvent::PointerMove { x, y } => match self.gesture {
                Gesture::Dragging { grab } => {
                    let moved = self.transform.pinned(&Point::new(x, y), &grab);
                    self.commit(moved)
                }
                Gesture::Idle => None,
            },
            InputEvent::PointerUp => {
                self.gesture = Gesture::Idle;
                None
            }
            InputEvent::Wheel {
                x,
                y,
                delta_y,
                delta_mode,
                ctrl_key,
            } => {
                let boost = if ctrl_key { 10.0 } else { 1.0 };
                let exponent = -delta_y * delta_mode.zoom_rate() * boost;
                self.zoom_at(Point::new(x, y), exponent.exp2())
            }
            InputEvent::Pinch { x, y, scale } => self.zoom_at(Point::new(x, y), scale),
            InputEvent::DoubleClick { x, y, shift_key } => {
                let factor = if shift_key { 0.5 } else { 2.0 };
                self.zoom_at(Point::new(x, y), factor)
            }
            InputEvent::Resize { width, height } => {
                self.resize(width, height);
                Some(self.transform)
            }
            InputEvent::Transform { k, x, y } => self.set_transform(ZoomTransform::new(k, x, y)),
        }
    }

    /// Accept a transform computed elsewhere. Invalid transforms are dropped
    /// and the current one kept.
    pub fn set_transform(&mut self, transform: ZoomTransform) -> Option<ZoomTransform> {
        // Validate before clamping, which would turn an infinite scale into a finite one.
        if !transform.is_valid() {
            return self.commit(transform);
        }
        self.commit(ZoomTransform::new(self.clamp_scale(transform.k), transform.x, transform.y))
    }

    /// Pan by a delta in device pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Option<ZoomTransform> {
        let t = self.transform;
        self.commit(t.translate_by(dx / t.k, dy / t.k))
    }

    /// Multiply the scale by `factor`, keeping the model point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> Option<ZoomTransform> {
        self.scale_to(anchor, self.transform.k * factor)
    }

    /// Set the scale to `k` (clamped), keeping the model point under `anchor` fixed.
    pub fn scale_to(&mut self, anchor: Point, k: f64) -> Option<ZoomTransform> {
        if !anchor.is_finite() {
            log::warn!("Ignoring zoom around non-finite anchor ({}, {})", anchor.x, anchor.y);
            return None;
        }
        let model = self.transform.invert(&anchor);
        let scaled = ZoomTransform::new(self.clamp_scale(k), self.transform.x, self.transform.y);
        self.commit(scaled.pinned(&anchor, &model))
    }

    /// Change the viewport size. Zero sizes are allowed and resolve to no tiles.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::info!("Viewport resized to {}x{}", width, height);
        self.width = f64::from(width);
        self.height = f64::from(height);
        self.transform = self.fit(self.transform);
    }

    fn commit(&mut self, candidate: ZoomTransform) -> Option<ZoomTransform> {
        if !candidate.is_valid() {
            log::warn!(
                "Rejecting invalid transform (k={}, x={}, y={}), keeping previous",
                candidate.k,
                candidate.x,
                candidate.y
            );
            return None;
        }
        let next = self.fit(candidate);
        if next == self.transform {
            return None;
        }
        self.transform = next;
        Some(next)
    }

    fn clamp_scale(&self, k: f64) -> f64 {
        let [min_k, max_k] = self.config.scale_extent;
        // NaN falls through so that commit() rejects it.
        if k.is_nan() {
            k
        } else {
            k.clamp(min_k, max_k)
        }
    }

    /// Clamp the scale and keep the viewport inside the translate extent.
    fn fit(&self, transform: ZoomTransform) -> ZoomTransform {
        let t = ZoomTransform::new(self.clamp_scale(transform.k), transform.x, transform.y);
        let Some([[x0, y0], [x1, y1]]) = self.config.translate_extent else {
            return t;
        };

        let dx0 = t.invert_x(0.0) - x0;
        let dx1 = t.invert_x(self.width) - x1;
        let dy0 = t.invert_y(0.0) - y0;
        let dy1 = t.invert_y(self.height) - y1;
        t.translate_by(constrain_axis(dx0, dx1), constrain_axis(dy0, dy1))
    }
}

/// Model-space shift along one axis: centre the extent when it is narrower
/// than the viewport, otherwise pull the nearer overhanging edge back in.
fn constrain_axis(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else if d0 < 0.0 {
        d0
    } else {
        d1.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::WheelDeltaMode;

    fn controller(width: u32, height: u32) -> ViewportController {
        ViewportController::new(ViewportConfig::new(width, height)).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_initial_transform_centers_origin() {
        let vp = controller(800, 800);
        assert_eq!(vp.transform(), ZoomTransform::new(1024.0, 400.0, 400.0));

        let odd = controller(801, 599);
        assert_eq!(odd.transform(), ZoomTransform::new(1024.0, 400.0, 299.0));
    }

    #[test]
    fn test_scale_clamped_to_extent() {
        let mut vp = controller(800, 800);
        let t = vp.zoom_at(Point::new(400.0, 400.0), 1e12).unwrap();
        assert_close(t.k, f64::from(1u32 << 22));
        assert!(vp.zoom_at(Point::new(400.0, 400.0), 2.0).is_none());

        let t = vp.zoom_at(Point::new(400.0, 400.0), 1e-12).unwrap();
        assert_close(t.k, 256.0);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut vp = controller(800, 600);
        let anchor = Point::new(123.0, 456.0);
        let before = vp.transform().invert(&anchor);
        let t = vp.zoom_at(anchor, 3.0).unwrap();
        let after = t.invert(&anchor);
        assert_close(t.k, 3072.0);
        assert_close(before.x, after.x);
        assert_close(before.y, after.y);
    }

    #[test]
    fn test_drag_pans_with_pointer() {
        let mut vp = controller(800, 800);
        assert!(vp.handle(&InputEvent::PointerDown { x: 100.0, y: 100.0 }).is_none());
        assert!(vp.is_dragging());

        let t = vp.handle(&InputEvent::PointerMove { x: 150.0, y: 120.0 }).unwrap();
        assert_close(t.x, 450.0);
        assert_close(t.y, 420.0);

        let t = vp.handle(&InputEvent::PointerMove { x: 90.0, y: 100.0 }).unwrap();
        assert_close(t.x, 390.0);
        assert_close(t.y, 400.0);

        vp.handle(&InputEvent::PointerUp);
        assert!(!vp.is_dragging());
        assert!(vp.handle(&InputEvent::PointerMove { x: 0.0, y: 0.0 }).is_none());
    }

    #[test]
    fn test_wheel_zoom_rate() {
        let mut vp = controller(800, 800);
        let wheel = InputEvent::Wheel {
            x: 400.0,
            y: 400.0,
            delta_y: -500.0,
            delta_mode: WheelDeltaMode::Pixel,
            ctrl_key: false,
        };
        let t = vp.handle(&wheel).unwrap();
        assert_close(t.k, 2048.0);
        assert_close(t.x, 400.0);

        let lines = InputEvent::Wheel {
            x: 400.0,
            y: 400.0,
            delta_y: 2.0,
            delta_mode: WheelDeltaMode::Line,
            ctrl_key: true,
        };
        let t = vp.handle(&lines).unwrap();
        assert_close(t.k, 1024.0);
    }

    #[test]
    fn test_double_click_and_pinch() {
        let mut vp = controller(800, 800);
        let t = vp
            .handle(&InputEvent::DoubleClick { x: 400.0, y: 400.0, shift_key: false })
            .unwrap();
        assert_close(t.k, 2048.0);
        let t = vp
            .handle(&InputEvent::DoubleClick { x: 400.0, y: 400.0, shift_key: true })
            .unwrap();
        assert_close(t.k, 1024.0);
        let t = vp
            .handle(&InputEvent::Pinch { x: 400.0, y: 400.0, scale: 1.5 })
            .unwrap();
        assert_close(t.k, 1536.0);
    }

    #[test]
    fn test_invalid_transform_keeps_previous() {
        let mut vp = controller(800, 800);
        let before = vp.transform();
        assert!(vp.set_transform(ZoomTransform::new(f64::NAN, 0.0, 0.0)).is_none());
        assert!(vp.set_transform(ZoomTransform::new(2048.0, f64::INFINITY, 0.0)).is_none());
        assert!(vp.set_transform(ZoomTransform::new(f64::INFINITY, 0.0, 0.0)).is_none());
        assert!(vp.pan_by(f64::NAN, 0.0).is_none());
        assert!(vp.zoom_at(Point::new(f64::NAN, 0.0), 2.0).is_none());
        assert_eq!(vp.transform(), before);
    }

    #[test]
    fn test_external_transform_is_clamped() {
        let mut vp = controller(800, 800);
        let t = vp.set_transform(ZoomTransform::new(10.0, 1.0, 2.0)).unwrap();
        assert_eq!(t, ZoomTransform::new(256.0, 1.0, 2.0));
        assert!(vp.set_transform(t).is_none());
    }

    #[test]
    fn test_translate_extent_bounds_panning() {
        let config = ViewportConfig::new(800, 800).with_translate_extent([-0.5, -0.5], [0.5, 0.5]);
        let mut vp = ViewportController::new(config).unwrap();

        let t = vp.pan_by(1000.0, 0.0).unwrap();
        assert_close(t.x, 512.0);
        assert_close(t.y, 400.0);

        // World narrower than the viewport stays centred.
        let t = vp.set_transform(ZoomTransform::new(256.0, 0.0, 0.0)).unwrap();
        assert_close(t.x, 400.0);
        assert_close(t.y, 400.0);
    }

    #[test]
    fn test_resize_refits() {
        let config = ViewportConfig::new(800, 800).with_translate_extent([-0.5, -0.5], [0.5, 0.5]);
        let mut vp = ViewportController::new(config).unwrap();
        vp.set_transform(ZoomTransform::new(256.0, 0.0, 0.0));

        // World narrower than the viewport: centred. World taller than the
        // viewport: its top edge is pulled up to the viewport's.
        let t = vp.handle(&InputEvent::Resize { width: 400, height: 200 }).unwrap();
        assert_close(t.x, 200.0);
        assert_close(t.y, 128.0);
        assert_eq!(vp.extent(), BBox::from_size(400.0, 200.0));
    }

    #[test]
    fn test_config_validation() {
        assert!(ViewportConfig::default().validate().is_ok());
        assert!(ViewportConfig::new(0, 10).validate().is_err());

        let inverted = ViewportConfig {
            scale_extent: [1024.0, 256.0],
            ..ViewportConfig::default()
        };
        assert!(inverted.validate().is_err());

        let bad_extent = ViewportConfig::default().with_translate_extent([1.0, 0.0], [0.0, 1.0]);
        assert!(matches!(
            ViewportController::new(bad_extent),
            Err(TileError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_json_defaults() {
        let config: ViewportConfig = serde_json::from_str(r#"{"width": 800, "height": 600}"#).unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.scale_extent, [256.0, 4194304.0]);
        assert_eq!(config.initial_scale, 1024.0);
        assert!(config.translate_extent.is_none());
    }
}
