//! Async driver: serializes user actions through the controller and runs
//! classification on a blocking worker.
//!
//! ```text
//! script ──► mpsc ──► driver loop ──► InteractionController
//!                        ▲    │ ticket
//!                        │    ▼
//!                 Evaluation ◄── spawn_blocking(ticket.run())
//! ```
//!
//! Only one evaluation is in flight; the controller ignores triggers that
//! arrive meanwhile.

use std::path::{Path, PathBuf};

use kanji_core::{
    Candidate, ClipboardSink, Evaluation, EvaluationTicket, InteractionController, RasterImage,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::script::Action;
use crate::PadError;

/// Queue depth between the action source and the driver loop.
const ACTION_QUEUE: usize = 64;

/// Summary of a replayed script.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Final text buffer.
    pub text: String,
    /// Candidates on display at the end.
    pub candidates: Vec<Candidate>,
    /// Evaluations that ran to completion.
    pub evaluations: usize,
    /// Actions rejected as invalid for the current state.
    pub rejected: usize,
}

/// Replays actions against a controller.
pub struct Driver<'a> {
    controller: &'a mut InteractionController,
    clipboard: &'a mut dyn ClipboardSink,
    dump_dir: Option<PathBuf>,
    in_flight: Option<JoinHandle<Evaluation>>,
    evaluations: usize,
    rejected: usize,
}

impl<'a> Driver<'a> {
    /// Create a driver.
    #[must_use]
    pub fn new(
        controller: &'a mut InteractionController,
        clipboard: &'a mut dyn ClipboardSink,
    ) -> Self {
        Self {
            controller,
            clipboard,
            dump_dir: None,
            in_flight: None,
            evaluations: 0,
            rejected: 0,
        }
    }

    /// Write every evaluated snapshot as a PNG into `dir`.
    #[must_use]
    pub fn with_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dump_dir = dir;
        self
    }

    /// Replay `actions` to completion.
    ///
    /// An evaluation still in flight when replay stops, normally or on
    /// error, is awaited and completed before returning.
    ///
    /// # Errors
    ///
    /// Returns an error on clipboard or snapshot dump failures. Lifecycle
    /// violations are logged and counted, not returned.
    pub async fn run(mut self, actions: Vec<Action>) -> Result<Outcome, PadError> {
        let (tx, rx) = mpsc::channel(ACTION_QUEUE);
        let feeder = tokio::spawn(async move {
            for action in actions {
                if tx.send(action).await.is_err() {
                    break;
                }
            }
        });

        let replayed = self.replay(rx).await;
        self.settle().await;
        if let Err(e) = feeder.await {
            tracing::warn!("Action feeder failed: {e}");
        }
        replayed?;

        Ok(Outcome {
            text: self.controller.buffer().to_string(),
            candidates: self.controller.candidates().to_vec(),
            evaluations: self.evaluations,
            rejected: self.rejected,
        })
    }

    async fn replay(&mut self, mut rx: mpsc::Receiver<Action>) -> Result<(), PadError> {
        loop {
            tokio::select! {
                biased;
                joined = wait(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.finish(joined);
                }
                action = rx.recv() => {
                    let Some(action) = action else { return Ok(()) };
                    if action.needs_results() {
                        self.settle().await;
                    }
                    if let Some(ticket) = self.apply(action)? {
                        self.spawn(ticket)?;
                    }
                }
            }
        }
    }

    fn apply(&mut self, action: Action) -> Result<Option<EvaluationTicket>, PadError> {
        let ctl = &mut *self.controller;
        let result = match action {
            Action::Touch(event) => ctl.handle_touch(&event),
            Action::Evaluate => Ok(ctl.request_evaluation()),
            Action::Select { index } => ctl.select_index(index).map(|selection| {
                tracing::info!(label = %selection.label, "Candidate selected");
                None
            }),
            Action::ClearCanvas => {
                ctl.clear_canvas();
                Ok(None)
            }
            Action::ClearText => {
                ctl.clear_text();
                Ok(None)
            }
            Action::Copy => {
                let copied = ctl.copy_text(self.clipboard)?;
                if !copied {
                    tracing::debug!("Nothing to copy");
                }
                Ok(None)
            }
            Action::SetAutoEvaluate { enabled } => {
                ctl.set_auto_evaluate(enabled);
                Ok(None)
            }
            Action::SetAutoClear { enabled } => {
                ctl.set_auto_clear(enabled);
                Ok(None)
            }
            Action::Wait | Action::Stroke { .. } => Ok(None),
        };

        match result {
            Ok(ticket) => Ok(ticket),
            Err(e) if e.is_guarded() => {
                tracing::warn!("Action rejected: {e}");
                self.rejected += 1;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Start the ticket on a blocking worker. The ticket always runs; a
    /// failed snapshot dump is reported afterwards.
    fn spawn(&mut self, ticket: EvaluationTicket) -> Result<(), PadError> {
        let dumped = match (&self.dump_dir, ticket.image()) {
            (Some(dir), Some(image)) => {
                let path = dir.join(format!("eval-{:03}.png", self.evaluations + 1));
                dump_snapshot(&path, image)
            }
            _ => Ok(()),
        };
        self.in_flight = Some(tokio::task::spawn_blocking(move || ticket.run()));
        dumped
    }

    async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            let joined = handle.await;
            self.finish(joined);
        }
    }

    fn finish(&mut self, joined: Result<Evaluation, JoinError>) {
        match joined {
            Ok(evaluation) => {
                self.evaluations += 1;
                let candidates = self.controller.complete_evaluation(evaluation);
                tracing::debug!(candidates = candidates.len(), "Evaluation landed");
            }
            Err(e) => {
                tracing::error!("Classifier worker failed: {e}");
                self.controller.abandon_evaluation();
            }
        }
    }
}

fn dump_snapshot(path: &Path, image: &RasterImage) -> Result<(), PadError> {
    let png = image.encode_png()?;
    std::fs::write(path, png).map_err(|source| PadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Snapshot written");
    Ok(())
}

async fn wait(handle: &mut Option<JoinHandle<Evaluation>>) -> Result<Evaluation, JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
