//! Stroke and drawing model.

use serde::{Deserialize, Serialize};

/// A sampled touch location with its timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position in canvas coordinates.
    pub x: f32,
    /// Y position in canvas coordinates.
    pub y: f32,
    /// Timestamp in milliseconds since the session started.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self { x, y, timestamp_ms }
    }
}

/// One continuous touch-down-to-touch-up path.
///
/// Strokes are only mutable while the canvas holds them in progress; once
/// pushed into a [`Drawing`] they are never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Start a stroke at `origin`.
    #[must_use]
    pub fn new(origin: Point) -> Self {
        Self {
            points: vec![origin],
        }
    }

    /// Build a stroke from a point list. Returns `None` when `points` is empty.
    #[must_use]
    pub fn from_points(points: Vec<Point>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { points })
        }
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Points in capture order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of sampled points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the stroke has no points (only possible for deserialized input).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether every point sits on the same location (renders as a dot).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let Some(first) = self.points.first() else {
            return true;
        };
        self.points
            .iter()
            .all(|p| (p.x - first.x).abs() < f32::EPSILON && (p.y - first.y).abs() < f32::EPSILON)
    }

    /// Duration between the first and last sample.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.timestamp_ms.saturating_sub(first.timestamp_ms),
            _ => 0,
        }
    }
}

/// The strokes currently on the canvas, in the order they were drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    strokes: Vec<Stroke>,
}

impl Drawing {
    /// Create an empty drawing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub(crate) fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Finalized strokes in drawing order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Number of strokes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Whether the drawing has no strokes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

impl FromIterator<Stroke> for Drawing {
    fn from_iter<I: IntoIterator<Item = Stroke>>(iter: I) -> Self {
        Self {
            strokes: iter.into_iter().collect(),
        }
    }
}
