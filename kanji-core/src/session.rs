//! One recognition pass: render, classify, time.

use std::time::{Duration, Instant};

use crate::canvas::StrokeCanvas;
use crate::raster::RasterImage;
use crate::recognition::{rank, ClassifierSlot, Recognition};

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// Ranked results, best first.
    pub results: Vec<Recognition>,
    /// Wall-clock time spent in the classifier.
    pub elapsed: Duration,
    /// Canvas epoch the evaluated image was rendered from.
    pub epoch: u64,
}

impl Evaluation {
    /// An empty result set (degraded path).
    #[must_use]
    pub fn empty(epoch: u64) -> Self {
        Self {
            results: Vec::new(),
            elapsed: Duration::ZERO,
            epoch,
        }
    }
}

/// Runs evaluations against a canvas and a classifier capability.
///
/// Missing collaborators degrade to an empty result set instead of failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecognitionSession;

impl RecognitionSession {
    /// Render `canvas` and classify it.
    #[must_use]
    pub fn evaluate(canvas: Option<&StrokeCanvas>, classifier: &ClassifierSlot) -> Evaluation {
        let Some(canvas) = canvas else {
            tracing::debug!("No canvas attached, skipping evaluation");
            return Evaluation::empty(0);
        };
        let epoch = canvas.epoch();
        if !classifier.is_ready() {
            tracing::debug!("Classifier unavailable, skipping evaluation");
            return Evaluation::empty(epoch);
        }
        match canvas.render() {
            Ok(image) => Self::classify_snapshot(&image, classifier, epoch),
            Err(e) => {
                tracing::warn!("Failed to render canvas: {e}");
                Evaluation::empty(epoch)
            }
        }
    }

    /// Classify an already rendered snapshot. Blocks for the duration of the
    /// classifier call.
    #[must_use]
    pub fn classify_snapshot(
        image: &RasterImage,
        classifier: &ClassifierSlot,
        epoch: u64,
    ) -> Evaluation {
        let Some(classifier) = classifier.get() else {
            return Evaluation::empty(epoch);
        };

        let start = Instant::now();
        let raw = classifier.classify(image);
        let elapsed = start.elapsed();
        tracing::info!("Inference took {} ms.", elapsed.as_millis());

        let k = classifier.top_k();
        let results = rank(raw, k);

        Evaluation {
            results,
            elapsed,
            epoch,
        }
    }
}
