//! # Kanji Pad Core
//!
//! Handwriting-to-candidate pipeline: capture strokes, rasterize them,
//! classify the image, and commit the chosen glyph.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               InteractionController                 │
//! │  Idle ▸ StrokeInProgress ▸ Evaluating ▸ ResultsShown│
//! ├──────────────┬──────────────────┬───────────────────┤
//! │ StrokeCanvas │ RecognitionSession│ ResultPresenter  │
//! │ - Strokes    │ - Snapshot render │ - Candidates     │
//! │ - Raster     │ - Classifier call │ - TextBuffer     │
//! │ - Touch end ─┼─► channel         │ - Auto-clear     │
//! └──────────────┴──────────────────┴───────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod presenter;
pub mod raster;
pub mod recognition;
pub mod session;
pub mod stroke;
pub mod text;

pub use canvas::StrokeCanvas;
pub use config::{SessionConfig, SessionFlags};
pub use controller::{EvaluationTicket, InteractionController, InteractionState, StateChange};
pub use error::{InkError, InkResult};
pub use event::{CanvasEvent, TouchEvent, TouchPhase};
pub use presenter::{Candidate, ResultPresenter, Selection};
pub use raster::{RasterConfig, RasterImage};
pub use recognition::{rank, Classifier, ClassifierSlot, Recognition, TopK};
pub use session::{Evaluation, RecognitionSession};
pub use stroke::{Drawing, Point, Stroke};
pub use text::{ClipboardSink, TextBuffer, CLIP_LABEL};

/// Kanji Pad core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
