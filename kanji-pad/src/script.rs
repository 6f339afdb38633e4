//! Replayable interaction scripts.
//!
//! A script is a JSON array of actions, replayed in order:
//!
//! ```json
//! [
//!   { "action": "stroke", "points": [[100, 40], [100, 360]] },
//!   { "action": "touch", "phase": "start", "x": 40, "y": 200 },
//!   { "action": "touch", "phase": "end", "x": 360, "y": 200 },
//!   { "action": "select", "index": 0 },
//!   { "action": "copy" }
//! ]
//! ```

use std::path::Path;

use kanji_core::{TouchEvent, TouchPhase};
use serde::{Deserialize, Serialize};

use crate::PadError;

/// Time between synthesized touch samples of a `stroke` action.
const SAMPLE_INTERVAL_MS: u64 = 16;

/// One user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Raw touch event.
    Touch(TouchEvent),
    /// A whole stroke, expanded into start/move/end touches.
    Stroke {
        /// Points in canvas coordinates.
        points: Vec<[f32; 2]>,
    },
    /// Manual evaluate trigger.
    Evaluate,
    /// Wait for the in-flight evaluation, if any.
    Wait,
    /// Select the candidate at `index`.
    Select {
        /// Candidate rank (0 = best).
        index: usize,
    },
    /// Clear the canvas and candidates.
    ClearCanvas,
    /// Clear the text buffer.
    ClearText,
    /// Copy the text buffer to the clipboard.
    Copy,
    /// Toggle auto-evaluate.
    SetAutoEvaluate {
        /// New value.
        enabled: bool,
    },
    /// Toggle auto-clear.
    SetAutoClear {
        /// New value.
        enabled: bool,
    },
}

impl Action {
    /// Whether the action reads evaluation results, so a pending evaluation
    /// must land first.
    #[must_use]
    pub fn needs_results(&self) -> bool {
        matches!(self, Self::Wait | Self::Select { .. })
    }
}

/// Parse a script from JSON, expanding `stroke` actions into touches.
///
/// # Errors
///
/// Returns an error if the JSON is malformed.
pub fn parse_script(json: &str) -> Result<Vec<Action>, PadError> {
    let actions: Vec<Action> = serde_json::from_str(json)?;
    let mut expanded = Vec::with_capacity(actions.len());
    let mut clock = 0;
    for action in actions {
        match action {
            Action::Stroke { points } => {
                if points.is_empty() {
                    continue;
                }
                let last = points.len().saturating_sub(1);
                for (i, [x, y]) in points.into_iter().enumerate() {
                    let phase = match i {
                        0 => TouchPhase::Start,
                        _ if i == last => TouchPhase::End,
                        _ => TouchPhase::Move,
                    };
                    expanded.push(Action::Touch(TouchEvent::new(phase, x, y, clock)));
                    clock += SAMPLE_INTERVAL_MS;
                }
                // A single-point stroke still needs its touch end.
                if last == 0 {
                    if let Some(Action::Touch(start)) = expanded.last().cloned() {
                        expanded.push(Action::Touch(TouchEvent::new(
                            TouchPhase::End,
                            start.x,
                            start.y,
                            clock,
                        )));
                    }
                }
            }
            Action::Touch(event) => {
                clock = clock.max(event.timestamp_ms);
                expanded.push(Action::Touch(event));
            }
            other => expanded.push(other),
        }
    }
    Ok(expanded)
}

/// Read and parse a script file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_script(path: &Path) -> Result<Vec<Action>, PadError> {
    let json = std::fs::read_to_string(path).map_err(|source| PadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&json)
}
