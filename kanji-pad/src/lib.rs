//! # Kanji Pad
//!
//! Headless host for the handwriting recognition pipeline. Replays a JSON
//! script of touch events and user actions through an
//! [`InteractionController`](kanji_core::InteractionController), running
//! classification on a blocking worker.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p kanji-pad -- script.json --model assets/kanji_model.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `PadConfig` - Session, model and output settings derived from `CliArgs`
//! - `Driver` - Async loop feeding actions to the controller
//! - `FileClipboard` / `StdoutClipboard` - Clipboard sinks

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod clipboard;
mod driver;
mod script;

pub use clipboard::{FileClipboard, StdoutClipboard};
pub use driver::{Driver, Outcome};
pub use script::{load_script, parse_script, Action};

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use kanji_core::{InkError, RasterConfig, SessionConfig, SessionFlags};
use kanji_model::{ClassifierConfig, ModelAssets, DEFAULT_MODEL_PATH};
use thiserror::Error;

/// Errors raised by the host.
#[derive(Debug, Error)]
pub enum PadError {
    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The script is not valid JSON or names an unknown action.
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),

    /// The pipeline reported an error.
    #[error(transparent)]
    Ink(#[from] InkError),
}

/// Command-line arguments for kanji-pad.
#[derive(Debug, Clone, Parser)]
#[command(name = "kanji-pad")]
#[command(about = "Replay handwriting scripts through the kanji recognizer")]
#[command(version)]
pub struct CliArgs {
    /// JSON action script to replay
    pub script: PathBuf,

    /// Model file (JSON dense layer)
    #[arg(long, env = "KANJI_MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Label file, one label per line; overrides labels embedded in the model
    #[arg(long, env = "KANJI_LABELS")]
    pub labels: Option<PathBuf>,

    /// Number of candidates to show
    #[arg(long, default_value = "10")]
    pub top_k: usize,

    /// Classify whenever a stroke ends
    #[arg(long, action = ArgAction::Set, default_value = "true")]
    pub auto_evaluate: bool,

    /// Clear the canvas after a candidate is selected
    #[arg(long, action = ArgAction::Set, default_value = "true")]
    pub auto_clear: bool,

    /// Touch surface size in canvas coordinates
    #[arg(long, default_value = "400")]
    pub canvas_size: f32,

    /// Classifier input raster size in pixels
    #[arg(long, default_value = "64")]
    pub raster_size: u32,

    /// Stroke width in raster pixels
    #[arg(long, default_value = "4.0")]
    pub stroke_width: f32,

    /// Write copied text to this file instead of stdout
    #[arg(long)]
    pub clipboard: Option<PathBuf>,

    /// Write every evaluated snapshot as a PNG into this directory
    #[arg(long)]
    pub dump_raster: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

/// Host configuration.
#[derive(Debug, Clone)]
pub struct PadConfig {
    /// Session settings.
    pub session: SessionConfig,
    /// Model asset locations.
    pub assets: ModelAssets,
    /// Classifier settings.
    pub classifier: ClassifierConfig,
    /// Script to replay.
    pub script: PathBuf,
    /// Clipboard file; stdout when unset.
    pub clipboard: Option<PathBuf>,
    /// Snapshot dump directory.
    pub dump_raster: Option<PathBuf>,
    /// Emit JSON output.
    pub json: bool,
}

impl From<CliArgs> for PadConfig {
    fn from(args: CliArgs) -> Self {
        let assets = match args.labels {
            Some(labels) => ModelAssets::new(args.model).with_labels(labels),
            None => ModelAssets::new(args.model),
        };
        Self {
            session: SessionConfig {
                flags: SessionFlags {
                    auto_evaluate: args.auto_evaluate,
                    auto_clear: args.auto_clear,
                },
                canvas_width: args.canvas_size,
                canvas_height: args.canvas_size,
                raster: RasterConfig {
                    width: args.raster_size,
                    height: args.raster_size,
                    stroke_width: args.stroke_width,
                    ..RasterConfig::default()
                },
            },
            assets,
            classifier: ClassifierConfig { top_k: args.top_k },
            script: args.script,
            clipboard: args.clipboard,
            dump_raster: args.dump_raster,
            json: args.json,
        }
    }
}
