//! Input events for the handwriting canvas.

use serde::{Deserialize, Serialize};

use crate::stroke::Point;

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single-pointer touch event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// X position in canvas coordinates.
    pub x: f32,
    /// Y position in canvas coordinates.
    pub y: f32,
    /// Timestamp in milliseconds since the session started.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            phase,
            x,
            y,
            timestamp_ms,
        }
    }

    /// Finger down at a point.
    #[must_use]
    pub fn start(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(TouchPhase::Start, x, y, timestamp_ms)
    }

    /// Finger dragged to a point.
    #[must_use]
    pub fn moved(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(TouchPhase::Move, x, y, timestamp_ms)
    }

    /// Finger lifted at a point.
    #[must_use]
    pub fn end(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(TouchPhase::End, x, y, timestamp_ms)
    }

    /// The touch location as a stroke point.
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y, self.timestamp_ms)
    }
}

/// Notifications emitted by the stroke canvas to its subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEvent {
    /// A stroke was finalized into the drawing (touch ended).
    StrokeEnded {
        /// Number of finalized strokes now in the drawing.
        strokes: usize,
    },
}
