//! Turning ranked results into selectable candidates.

use serde::{Deserialize, Serialize};

use crate::canvas::StrokeCanvas;
use crate::config::SessionFlags;
use crate::error::{InkError, InkResult};
use crate::recognition::Recognition;
use crate::text::TextBuffer;

/// A selectable candidate glyph.
///
/// `generation` identifies the result set the candidate came from; a
/// candidate from a replaced set can no longer be selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Result set this candidate belongs to.
    pub generation: u64,
    /// Rank within the result set (0 = best).
    pub index: usize,
    /// Glyph label appended on selection.
    pub label: String,
    /// Classifier confidence.
    pub confidence: f32,
}

/// What a selection did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Text appended to the buffer.
    pub label: String,
    /// Whether the canvas was reset.
    pub cleared_canvas: bool,
}

/// Holds the current candidate set.
#[derive(Debug, Default)]
pub struct ResultPresenter {
    generation: u64,
    candidates: Vec<Candidate>,
}

impl ResultPresenter {
    /// Create a presenter with no candidates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the candidate set with `results`, preserving their order.
    pub fn present(&mut self, results: &[Recognition]) -> &[Candidate] {
        self.generation += 1;
        let generation = self.generation;
        self.candidates = results
            .iter()
            .enumerate()
            .map(|(index, r)| Candidate {
                generation,
                index,
                label: r.label.clone(),
                confidence: r.confidence,
            })
            .collect();
        &self.candidates
    }

    /// Drop all candidates. Previously presented candidates become stale.
    pub fn clear(&mut self) {
        if !self.candidates.is_empty() {
            self.generation += 1;
            self.candidates.clear();
        }
    }

    /// The current candidates, best first.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The current candidate at `index`.
    #[must_use]
    pub fn candidate(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    /// Whether `candidate` belongs to the current set.
    #[must_use]
    pub fn is_current(&self, candidate: &Candidate) -> bool {
        candidate.generation == self.generation
            && self
                .candidates
                .get(candidate.index)
                .is_some_and(|c| c.label == candidate.label)
    }

    /// Commit `candidate` to `buffer`, resetting `canvas` when auto-clear is on.
    ///
    /// # Errors
    ///
    /// Returns `StaleCandidate` if the candidate set has been replaced.
    pub fn select(
        &self,
        candidate: &Candidate,
        buffer: &mut TextBuffer,
        flags: SessionFlags,
        canvas: Option<&mut StrokeCanvas>,
    ) -> InkResult<Selection> {
        if !self.is_current(candidate) {
            return Err(InkError::StaleCandidate(format!(
                "'{}' from result set {} (current {})",
                candidate.label, candidate.generation, self.generation
            )));
        }

        buffer.append(&candidate.label);

        let cleared_canvas = match canvas {
            Some(canvas) if flags.auto_clear => {
                canvas.reset();
                true
            }
            _ => false,
        };

        Ok(Selection {
            label: candidate.label.clone(),
            cleared_canvas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Point;

    fn results() -> Vec<Recognition> {
        vec![Recognition::new("本", 0.9), Recognition::new("木", 0.4)]
    }

    fn drawn_canvas() -> StrokeCanvas {
        let mut canvas = StrokeCanvas::default();
        canvas.begin_stroke(Point::new(1.0, 1.0, 0)).expect("begin");
        canvas.end_stroke().expect("end");
        canvas
    }

    fn flags(auto_clear: bool) -> SessionFlags {
        SessionFlags {
            auto_evaluate: true,
            auto_clear,
        }
    }

    #[test]
    fn test_present_preserves_order() {
        let mut presenter = ResultPresenter::new();
        let candidates = presenter.present(&results());
        let labels: Vec<_> = candidates.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["本", "木"]);
        assert_eq!(candidates[1].index, 1);
    }

    #[test]
    fn test_select_appends_label() {
        let mut presenter = ResultPresenter::new();
        presenter.present(&results());
        let candidate = presenter.candidate(1).cloned().expect("candidate");
        let mut buffer = TextBuffer::new();
        buffer.append("大");
        let before = buffer.len();

        let selection = presenter
            .select(&candidate, &mut buffer, flags(false), None)
            .expect("select");

        assert_eq!(selection.label, "木");
        assert_eq!(buffer.len(), before + candidate.label.chars().count());
        assert_eq!(buffer.as_str(), "大木");
    }

    #[test]
    fn test_auto_clear_resets_canvas() {
        let mut presenter = ResultPresenter::new();
        presenter.present(&results());
        let candidate = presenter.candidate(0).cloned().expect("candidate");
        let mut canvas = drawn_canvas();
        let mut buffer = TextBuffer::new();

        let selection = presenter
            .select(&candidate, &mut buffer, flags(true), Some(&mut canvas))
            .expect("select");

        assert!(selection.cleared_canvas);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_without_auto_clear_canvas_is_unchanged() {
        let mut presenter = ResultPresenter::new();
        presenter.present(&results());
        let candidate = presenter.candidate(0).cloned().expect("candidate");
        let mut canvas = drawn_canvas();
        let before = canvas.drawing().clone();
        let mut buffer = TextBuffer::new();

        let selection = presenter
            .select(&candidate, &mut buffer, flags(false), Some(&mut canvas))
            .expect("select");

        assert!(!selection.cleared_canvas);
        assert_eq!(canvas.drawing(), &before);
    }

    #[test]
    fn test_replaced_candidates_are_stale() {
        let mut presenter = ResultPresenter::new();
        presenter.present(&results());
        let old = presenter.candidate(0).cloned().expect("candidate");
        presenter.present(&[Recognition::new("本", 0.7)]);

        let mut buffer = TextBuffer::new();
        let err = presenter
            .select(&old, &mut buffer, flags(false), None)
            .unwrap_err();

        assert!(matches!(err, InkError::StaleCandidate(_)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear_makes_candidates_stale() {
        let mut presenter = ResultPresenter::new();
        presenter.present(&results());
        let old = presenter.candidate(0).cloned().expect("candidate");
        presenter.clear();
        assert!(presenter.candidates().is_empty());
        assert!(!presenter.is_current(&old));
    }
}
