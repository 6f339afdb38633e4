//! Stroke capture surface.
//!
//! ```text
//! touch start ──► begin_stroke ──► extend_stroke* ──► end_stroke ──► Drawing
//!                                                          │
//!                                                          └──► CanvasEvent::StrokeEnded ──► subscriber
//! ```

use tokio::sync::mpsc;

use crate::error::{InkError, InkResult};
use crate::event::{CanvasEvent, TouchEvent, TouchPhase};
use crate::raster::{self, RasterConfig, RasterImage};
use crate::stroke::{Drawing, Point, Stroke};

/// Accumulates touch input into strokes and renders them on demand.
#[derive(Debug)]
pub struct StrokeCanvas {
    width: f32,
    height: f32,
    raster: RasterConfig,
    drawing: Drawing,
    current: Option<Stroke>,
    subscriber: Option<mpsc::UnboundedSender<CanvasEvent>>,
    epoch: u64,
}

impl StrokeCanvas {
    /// Create an empty canvas with the given surface size.
    #[must_use]
    pub fn new(width: f32, height: f32, raster: RasterConfig) -> Self {
        Self {
            width,
            height,
            raster,
            drawing: Drawing::new(),
            current: None,
            subscriber: None,
            epoch: 0,
        }
    }

    /// Register the single observer of touch-end notifications.
    ///
    /// A previous subscriber is replaced and its receiver closes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<CanvasEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriber = Some(tx);
        rx
    }

    /// Start a new stroke at `point`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a stroke is already in progress.
    pub fn begin_stroke(&mut self, point: Point) -> InkResult<()> {
        if self.current.is_some() {
            return Err(InkError::InvalidState(
                "begin_stroke while a stroke is in progress".to_string(),
            ));
        }
        self.current = Some(Stroke::new(point));
        Ok(())
    }

    /// Append `point` to the in-progress stroke.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no stroke is in progress.
    pub fn extend_stroke(&mut self, point: Point) -> InkResult<()> {
        let stroke = self.current.as_mut().ok_or_else(|| {
            InkError::InvalidState("extend_stroke without begin_stroke".to_string())
        })?;
        stroke.push(point);
        Ok(())
    }

    /// Finalize the in-progress stroke and notify the subscriber.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no stroke is in progress.
    pub fn end_stroke(&mut self) -> InkResult<()> {
        let stroke = self.current.take().ok_or_else(|| {
            InkError::InvalidState("end_stroke without begin_stroke".to_string())
        })?;
        self.drawing.push(stroke);
        self.notify(CanvasEvent::StrokeEnded {
            strokes: self.drawing.len(),
        });
        Ok(())
    }

    /// Discard the in-progress stroke without notifying. No-op when idle.
    pub fn cancel_stroke(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("Stroke cancelled");
        }
    }

    /// Feed a raw touch event through the stroke lifecycle.
    ///
    /// An `End` event carrying a new location appends it before finalizing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the phase does not fit the lifecycle.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> InkResult<()> {
        match event.phase {
            TouchPhase::Start => self.begin_stroke(event.point()),
            TouchPhase::Move => self.extend_stroke(event.point()),
            TouchPhase::End => {
                let point = event.point();
                if let Some(stroke) = self.current.as_mut() {
                    let moved = stroke
                        .points()
                        .last()
                        .is_some_and(|last| {
                            (last.x - point.x).abs() > f32::EPSILON
                                || (last.y - point.y).abs() > f32::EPSILON
                        });
                    if moved {
                        stroke.push(point);
                    }
                }
                self.end_stroke()
            }
            TouchPhase::Cancel => {
                self.cancel_stroke();
                Ok(())
            }
        }
    }

    /// Render finalized strokes into a fresh image.
    ///
    /// The in-progress stroke is not included.
    ///
    /// # Errors
    ///
    /// Returns an error if the raster configuration is unusable.
    pub fn render(&self) -> InkResult<RasterImage> {
        raster::rasterize(
            self.drawing.strokes(),
            self.width,
            self.height,
            &self.raster,
        )
    }

    /// Discard all strokes, including one in progress.
    pub fn reset(&mut self) {
        self.drawing.clear();
        self.current = None;
        self.epoch += 1;
        tracing::debug!(epoch = self.epoch, "Canvas reset");
    }

    /// The finalized strokes.
    #[must_use]
    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    /// Whether the drawing has no finalized strokes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drawing.is_empty()
    }

    /// Whether a stroke is currently being drawn.
    #[must_use]
    pub fn stroke_in_progress(&self) -> bool {
        self.current.is_some()
    }

    /// Number of resets performed so far.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Surface size in canvas coordinates.
    #[must_use]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Raster settings used by [`render`](Self::render).
    #[must_use]
    pub fn raster_config(&self) -> &RasterConfig {
        &self.raster
    }

    fn notify(&mut self, event: CanvasEvent) {
        let delivered = self.subscriber.as_ref().map(|tx| tx.send(event).is_ok());
        if delivered == Some(false) {
            tracing::debug!("Canvas subscriber dropped");
            self.subscriber = None;
        }
    }
}

impl Default for StrokeCanvas {
    fn default() -> Self {
        Self::new(400.0, 400.0, RasterConfig::default())
    }
}
