//! Interaction state machine.
//!
//! ```text
//!            begin_stroke                 end_stroke
//!   Idle ───────────────► StrokeInProgress ──────────► Idle ──(auto_evaluate)──┐
//!    ▲  │                                                                       │
//!    │  └──── evaluate ───────────────────────────────────────────► Evaluating ◄┘
//!    │                                                                  │
//!    │        select / clear_canvas                                     ▼
//!    └─────────────────────────────────────────────────────────── ResultsShown
//! ```
//!
//! At most one evaluation is in flight. Triggers arriving while `Evaluating`
//! are dropped, not queued.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::canvas::StrokeCanvas;
use crate::config::{SessionConfig, SessionFlags};
use crate::error::{InkError, InkResult};
use crate::event::{CanvasEvent, TouchEvent, TouchPhase};
use crate::presenter::{Candidate, ResultPresenter, Selection};
use crate::raster::RasterImage;
use crate::recognition::ClassifierSlot;
use crate::session::{Evaluation, RecognitionSession};
use crate::stroke::Point;
use crate::text::{ClipboardSink, TextBuffer};

/// Interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    /// Ready for a new stroke or a manual evaluation.
    Idle,
    /// A stroke is being drawn.
    StrokeInProgress,
    /// A classification is running.
    Evaluating,
    /// Candidates from the last evaluation are on display.
    ResultsShown,
}

/// A state transition, as delivered to state subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// State before the transition.
    pub from: InteractionState,
    /// State after the transition.
    pub to: InteractionState,
}

/// A pending evaluation: a snapshot of the drawing plus the classifier.
///
/// Run it anywhere (it blocks) and hand the result to
/// [`InteractionController::complete_evaluation`].
#[derive(Debug)]
#[must_use = "an evaluation ticket must be run and completed"]
pub struct EvaluationTicket {
    image: Option<RasterImage>,
    classifier: ClassifierSlot,
    epoch: u64,
}

impl EvaluationTicket {
    /// Canvas epoch the snapshot was taken at.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The rendered snapshot, if recognition is available.
    #[must_use]
    pub fn image(&self) -> Option<&RasterImage> {
        self.image.as_ref()
    }

    /// Classify the snapshot.
    #[must_use]
    pub fn run(self) -> Evaluation {
        match &self.image {
            Some(image) => RecognitionSession::classify_snapshot(image, &self.classifier, self.epoch),
            None => Evaluation::empty(self.epoch),
        }
    }
}

/// Coordinates the canvas, the classifier, the candidates and the text buffer.
#[derive(Debug)]
pub struct InteractionController {
    flags: SessionFlags,
    canvas: StrokeCanvas,
    canvas_events: mpsc::UnboundedReceiver<CanvasEvent>,
    classifier: ClassifierSlot,
    presenter: ResultPresenter,
    buffer: TextBuffer,
    state: InteractionState,
    state_tx: Option<mpsc::UnboundedSender<StateChange>>,
    last_evaluation: Option<Evaluation>,
}

impl InteractionController {
    /// Create a controller with a fresh canvas.
    #[must_use]
    pub fn new(config: &SessionConfig, classifier: ClassifierSlot) -> Self {
        let canvas = StrokeCanvas::new(config.canvas_width, config.canvas_height, config.raster);
        Self::with_canvas(canvas, config.flags, classifier)
    }

    /// Create a controller around an existing canvas. Takes over the
    /// canvas's touch-end subscription.
    #[must_use]
    pub fn with_canvas(
        mut canvas: StrokeCanvas,
        flags: SessionFlags,
        classifier: ClassifierSlot,
    ) -> Self {
        let canvas_events = canvas.subscribe();
        if !classifier.is_ready() {
            tracing::warn!("Starting session without a classifier; evaluations will be empty");
        }
        Self {
            flags,
            canvas,
            canvas_events,
            classifier,
            presenter: ResultPresenter::new(),
            buffer: TextBuffer::new(),
            state: InteractionState::Idle,
            state_tx: None,
            last_evaluation: None,
        }
    }

    /// Receive every subsequent state transition. Replaces a previous subscriber.
    pub fn subscribe_state(&mut self) -> mpsc::UnboundedReceiver<StateChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state_tx = Some(tx);
        rx
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Current flags.
    #[must_use]
    pub fn flags(&self) -> SessionFlags {
        self.flags
    }

    /// Toggle auto-evaluate. Applies from the next stroke end.
    pub fn set_auto_evaluate(&mut self, enabled: bool) {
        self.flags.auto_evaluate = enabled;
    }

    /// Toggle auto-clear. Applies from the next selection.
    pub fn set_auto_clear(&mut self, enabled: bool) {
        self.flags.auto_clear = enabled;
    }

    /// The stroke canvas.
    #[must_use]
    pub fn canvas(&self) -> &StrokeCanvas {
        &self.canvas
    }

    /// The committed text.
    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Currently selectable candidates.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        self.presenter.candidates()
    }

    /// The classifier capability.
    #[must_use]
    pub fn classifier(&self) -> &ClassifierSlot {
        &self.classifier
    }

    /// The most recently completed (and accepted) evaluation.
    #[must_use]
    pub fn last_evaluation(&self) -> Option<&Evaluation> {
        self.last_evaluation.as_ref()
    }

    /// Start a stroke at `point`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if a stroke is already in progress.
    pub fn begin_stroke(&mut self, point: Point) -> InkResult<()> {
        self.canvas.begin_stroke(point)?;
        if self.state != InteractionState::Evaluating {
            self.transition(InteractionState::StrokeInProgress);
        }
        Ok(())
    }

    /// Extend the in-progress stroke.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no stroke is in progress.
    pub fn extend_stroke(&mut self, point: Point) -> InkResult<()> {
        self.canvas.extend_stroke(point)
    }

    /// Finish the in-progress stroke.
    ///
    /// Returns a ticket when auto-evaluate fired.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no stroke is in progress.
    pub fn end_stroke(&mut self) -> InkResult<Option<EvaluationTicket>> {
        self.canvas.end_stroke()?;
        Ok(self.drain_canvas_events())
    }

    /// Feed a raw touch event.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the phase does not fit the stroke lifecycle.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> InkResult<Option<EvaluationTicket>> {
        match event.phase {
            TouchPhase::Start => self.begin_stroke(event.point()).map(|()| None),
            TouchPhase::Move => self.extend_stroke(event.point()).map(|()| None),
            TouchPhase::End => {
                self.canvas.handle_touch(event)?;
                Ok(self.drain_canvas_events())
            }
            TouchPhase::Cancel => {
                self.canvas.cancel_stroke();
                if self.state == InteractionState::StrokeInProgress {
                    self.transition(InteractionState::Idle);
                }
                Ok(None)
            }
        }
    }

    /// Manual evaluate trigger.
    ///
    /// Returns `None` when the trigger is ignored (a stroke or another
    /// evaluation is in progress).
    pub fn request_evaluation(&mut self) -> Option<EvaluationTicket> {
        match self.state {
            InteractionState::Evaluating => {
                tracing::debug!("Evaluation already in flight; trigger ignored");
                None
            }
            InteractionState::StrokeInProgress => {
                tracing::debug!("Stroke in progress; trigger ignored");
                None
            }
            InteractionState::Idle | InteractionState::ResultsShown => {
                let epoch = self.canvas.epoch();
                let image = if self.classifier.is_ready() {
                    match self.canvas.render() {
                        Ok(image) => Some(image),
                        Err(e) => {
                            tracing::warn!("Failed to render canvas: {e}");
                            None
                        }
                    }
                } else {
                    None
                };
                self.transition(InteractionState::Evaluating);
                Some(EvaluationTicket {
                    image,
                    classifier: self.classifier.clone(),
                    epoch,
                })
            }
        }
    }

    /// Accept the outcome of a ticket and present its results.
    ///
    /// Results describing a drawing that has since been cleared are dropped.
    pub fn complete_evaluation(&mut self, evaluation: Evaluation) -> &[Candidate] {
        if self.state != InteractionState::Evaluating {
            tracing::warn!(state = ?self.state, "Evaluation completed outside Evaluating; ignored");
            return self.presenter.candidates();
        }

        let next = if evaluation.epoch == self.canvas.epoch() {
            tracing::debug!(
                results = evaluation.results.len(),
                elapsed_ms = evaluation.elapsed.as_millis(),
                "Presenting results"
            );
            self.presenter.present(&evaluation.results);
            self.last_evaluation = Some(evaluation);
            InteractionState::ResultsShown
        } else {
            tracing::debug!(
                snapshot_epoch = evaluation.epoch,
                canvas_epoch = self.canvas.epoch(),
                "Canvas cleared during evaluation; results dropped"
            );
            InteractionState::Idle
        };

        if self.canvas.stroke_in_progress() {
            self.transition(InteractionState::StrokeInProgress);
        } else {
            self.transition(next);
        }
        self.presenter.candidates()
    }

    /// Give up on the in-flight evaluation (e.g. the worker panicked).
    pub fn abandon_evaluation(&mut self) {
        if self.state != InteractionState::Evaluating {
            return;
        }
        tracing::warn!("Evaluation abandoned");
        if self.canvas.stroke_in_progress() {
            self.transition(InteractionState::StrokeInProgress);
        } else {
            self.transition(InteractionState::Idle);
        }
    }

    /// Run a ticket inline and complete it.
    pub fn run_ticket(&mut self, ticket: EvaluationTicket) -> &[Candidate] {
        let evaluation = ticket.run();
        self.complete_evaluation(evaluation)
    }

    /// Manual evaluate, run synchronously.
    pub fn evaluate(&mut self) -> &[Candidate] {
        match self.request_evaluation() {
            Some(ticket) => self.run_ticket(ticket),
            None => self.presenter.candidates(),
        }
    }

    /// Commit a candidate to the text buffer.
    ///
    /// # Errors
    ///
    /// Returns `StaleCandidate` if the candidate set has been replaced.
    pub fn select(&mut self, candidate: &Candidate) -> InkResult<Selection> {
        let selection = self.presenter.select(
            candidate,
            &mut self.buffer,
            self.flags,
            Some(&mut self.canvas),
        )?;
        if selection.cleared_canvas {
            self.presenter.clear();
        }
        if self.state != InteractionState::Evaluating {
            if self.canvas.stroke_in_progress() {
                self.transition(InteractionState::StrokeInProgress);
            } else {
                self.transition(InteractionState::Idle);
            }
        }
        Ok(selection)
    }

    /// Commit the current candidate at `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if there is no such candidate.
    pub fn select_index(&mut self, index: usize) -> InkResult<Selection> {
        let candidate = self
            .presenter
            .candidate(index)
            .cloned()
            .ok_or_else(|| InkError::InvalidState(format!("no candidate at index {index}")))?;
        self.select(&candidate)
    }

    /// Clear the canvas and drop the candidates.
    pub fn clear_canvas(&mut self) {
        self.canvas.reset();
        self.presenter.clear();
        if self.state != InteractionState::Evaluating {
            self.transition(InteractionState::Idle);
        }
    }

    /// Empty the text buffer.
    pub fn clear_text(&mut self) {
        self.buffer.clear();
    }

    /// Export the text buffer. Returns whether anything was copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects the text.
    pub fn copy_text(&self, sink: &mut dyn ClipboardSink) -> InkResult<bool> {
        self.buffer.copy_to(sink)
    }

    fn drain_canvas_events(&mut self) -> Option<EvaluationTicket> {
        let mut ticket = None;
        while let Ok(event) = self.canvas_events.try_recv() {
            match event {
                CanvasEvent::StrokeEnded { strokes } => {
                    if let Some(t) = self.on_touch_end(strokes) {
                        ticket = Some(t);
                    }
                }
            }
        }
        ticket
    }

    fn on_touch_end(&mut self, strokes: usize) -> Option<EvaluationTicket> {
        tracing::debug!(strokes, "Stroke ended");
        if self.state == InteractionState::Evaluating {
            tracing::debug!("Stroke ended during evaluation; trigger coalesced");
            return None;
        }
        self.transition(InteractionState::Idle);
        if self.flags.auto_evaluate {
            self.request_evaluation()
        } else {
            None
        }
    }

    fn transition(&mut self, to: InteractionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(?from, ?to, "State transition");
        let delivered = self
            .state_tx
            .as_ref()
            .map(|tx| tx.send(StateChange { from, to }).is_ok());
        if delivered == Some(false) {
            self.state_tx = None;
        }
    }
}
