use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Unit of a wheel event's `delta_y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    /// Zoom exponent contributed by one unit of wheel delta.
    pub fn zoom_rate(self) -> f64 {
        match self {
            WheelDeltaMode::Pixel => 0.002,
            WheelDeltaMode::Line => 0.05,
            WheelDeltaMode::Page => 1.0,
        }
    }
}

/// A user gesture or an externally computed transform, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp,
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
        #[serde(default)]
        delta_mode: WheelDeltaMode,
        #[serde(default)]
        ctrl_key: bool,
    },
    /// Two-finger pinch; `scale` is the spread ratio since the previous pinch event.
    Pinch {
        x: f64,
        y: f64,
        scale: f64,
    },
    DoubleClick {
        x: f64,
        y: f64,
        #[serde(default)]
        shift_key: bool,
    },
    Resize {
        width: u32,
        height: u32,
    },
    /// Transform produced by an external gesture library.
    Transform {
        k: f64,
        x: f64,
        y: f64,
    },
}

/// Supplier of input events, drained in delivery order.
pub trait InputSource {
    fn next_event(&mut self) -> Option<InputEvent>;
}

impl InputSource for VecDeque<InputEvent> {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_script_json() {
        let script = r#"[
            {"type": "pointer_down", "x": 10, "y": 20},
            {"type": "wheel", "x": 5, "y": 5, "delta_y": -120},
            {"type": "wheel", "x": 5, "y": 5, "delta_y": 3, "delta_mode": "line", "ctrl_key": true},
            {"type": "pointer_up"},
            {"type": "transform", "k": 2048, "x": 0, "y": 0}
        ]"#;
        let events: Vec<InputEvent> = serde_json::from_str(script).unwrap();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], InputEvent::PointerDown { x: 10.0, y: 20.0 });
        assert_eq!(
            events[1],
            InputEvent::Wheel {
                x: 5.0,
                y: 5.0,
                delta_y: -120.0,
                delta_mode: WheelDeltaMode::Pixel,
                ctrl_key: false,
            }
        );
        assert!(matches!(
            events[2],
            InputEvent::Wheel { delta_mode: WheelDeltaMode::Line, ctrl_key: true, .. }
        ));
        assert_eq!(events[3], InputEvent::PointerUp);
    }

    #[test]
    fn test_queue_drains_in_order() {
        let mut queue = VecDeque::from([
            InputEvent::PointerDown { x: 0.0, y: 0.0 },
            InputEvent::PointerUp,
        ]);
        assert_eq!(queue.next_event(), Some(InputEvent::PointerDown { x: 0.0, y: 0.0 }));
        assert_eq!(queue.next_event(), Some(InputEvent::PointerUp));
        assert_eq!(queue.next_event(), None);
    }
}
