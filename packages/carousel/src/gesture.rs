//! Swipe and drag recognition.
//!
//! [`GestureTracker`] is a small synchronous state machine: it owns the
//! stroke in progress, takes one [`PointerEvent`] at a time and decides
//! whether the stroke just completed as a navigation. Touch and mouse input
//! share the same threshold and direction rules.

use serde::{Deserialize, Serialize};

/// Horizontal travel a stroke must strictly exceed to navigate.
pub const SWIPE_THRESHOLD_PX: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

/// Pointer input observed on a carousel viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    TouchStart { x: f64, y: f64, touches: usize },
    TouchMove { x: f64, y: f64, touches: usize },
    TouchEnd,
    TouchCancel,
    MouseDown { x: f64, y: f64, button: MouseButton },
    MouseMove { x: f64, y: f64 },
    MouseUp { x: f64, y: f64 },
    MouseLeave,
}

/// Direction for a completed stroke, if it qualifies as a swipe.
///
/// Swiping left (negative `dx`) reveals the next items.
pub fn classify(dx: f64, dy: f64) -> Option<Direction> {
    if dx.abs() > SWIPE_THRESHOLD_PX && dx.abs() > dy.abs() {
        Some(if dx < 0.0 {
            Direction::Next
        } else {
            Direction::Prev
        })
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pointer {
    Touch,
    Mouse,
}

#[derive(Debug, Clone, Copy)]
struct Stroke {
    pointer: Pointer,
    start_x: f64,
    start_y: f64,
    dx: f64,
    dy: f64,
}

#[derive(Debug, Default)]
pub struct GestureTracker {
    stroke: Option<Stroke>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event; returns the navigation a finished stroke produced.
    pub fn decide(&mut self, event: &PointerEvent) -> Option<Direction> {
        match *event {
            PointerEvent::TouchStart { x, y, touches } => {
                if touches == 1 {
                    self.begin(Pointer::Touch, x, y);
                } else {
                    self.reset();
                }
                None
            }
            PointerEvent::TouchMove { x, y, touches } => {
                if touches == 1 {
                    self.track(Pointer::Touch, x, y);
                } else {
                    // pinch or multi-finger scroll
                    self.reset();
                }
                None
            }
            PointerEvent::TouchEnd => self.finish(Pointer::Touch),
            PointerEvent::TouchCancel => {
                self.abandon(Pointer::Touch);
                None
            }
            PointerEvent::MouseDown { x, y, button } => {
                if button == MouseButton::Primary {
                    self.begin(Pointer::Mouse, x, y);
                }
                None
            }
            PointerEvent::MouseMove { x, y } => {
                self.track(Pointer::Mouse, x, y);
                None
            }
            PointerEvent::MouseUp { x, y } => {
                self.track(Pointer::Mouse, x, y);
                self.finish(Pointer::Mouse)
            }
            PointerEvent::MouseLeave => {
                self.abandon(Pointer::Mouse);
                None
            }
        }
    }

    /// True while a primary-button mouse drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(
            self.stroke,
            Some(Stroke {
                pointer: Pointer::Mouse,
                ..
            })
        )
    }

    pub fn is_tracking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Displacement of the stroke in progress, `(0, 0)` when idle.
    pub fn displacement(&self) -> (f64, f64) {
        self.stroke.map_or((0.0, 0.0), |s| (s.dx, s.dy))
    }

    pub fn reset(&mut self) {
        self.stroke = None;
    }

    fn begin(&mut self, pointer: Pointer, x: f64, y: f64) {
        self.stroke = Some(Stroke {
            pointer,
            start_x: x,
            start_y: y,
            dx: 0.0,
            dy: 0.0,
        });
    }

    fn track(&mut self, pointer: Pointer, x: f64, y: f64) {
        if let Some(stroke) = self.stroke.as_mut().filter(|s| s.pointer == pointer) {
            stroke.dx = x - stroke.start_x;
            stroke.dy = y - stroke.start_y;
        }
    }

    fn finish(&mut self, pointer: Pointer) -> Option<Direction> {
        let stroke = self.stroke.filter(|s| s.pointer == pointer)?;
        self.stroke = None;
        classify(stroke.dx, stroke.dy)
    }

    fn abandon(&mut self, pointer: Pointer) {
        if self.stroke.is_some_and(|s| s.pointer == pointer) {
            self.stroke = None;
        }
    }
}
