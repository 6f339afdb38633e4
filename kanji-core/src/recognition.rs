//! Classifier outputs, ranking, and the classifier capability.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::raster::RasterImage;

/// A single classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    /// Glyph label.
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub confidence: f32,
}

impl Recognition {
    /// Create a new recognition. Confidence is clamped into `[0, 1]`.
    #[must_use]
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Keeps the best `max` recognitions, sorted by descending confidence.
///
/// A label filed twice keeps only its higher score. Ties keep filing order.
#[derive(Debug)]
pub struct TopK {
    max: usize,
    items: Vec<Recognition>,
}

impl TopK {
    /// Create a collector holding at most `max` items.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            max,
            items: Vec::with_capacity(max),
        }
    }

    /// Offer a recognition to the collector. Confidence is clamped into
    /// `[0, 1]`.
    pub fn file(&mut self, mut candidate: Recognition) {
        if self.max == 0 || candidate.confidence.is_nan() {
            return;
        }
        candidate.confidence = candidate.confidence.clamp(0.0, 1.0);
        // Full and not better than the current minimum.
        if self.items.len() == self.max
            && self
                .items
                .last()
                .is_some_and(|min| candidate.confidence <= min.confidence)
        {
            return;
        }
        if let Some(ix) = self.items.iter().position(|r| r.label == candidate.label) {
            if candidate.confidence <= self.items[ix].confidence {
                return;
            }
            self.items.remove(ix);
        }
        let ix = self
            .items
            .iter()
            .position(|r| r.confidence < candidate.confidence)
            .unwrap_or(self.items.len());
        self.items.insert(ix, candidate);
        self.items.truncate(self.max);
    }

    /// The collected recognitions, best first.
    #[must_use]
    pub fn into_vec(self) -> Vec<Recognition> {
        self.items
    }
}

/// Sort `results` by descending confidence and keep at most `k`.
#[must_use]
pub fn rank(results: impl IntoIterator<Item = Recognition>, k: usize) -> Vec<Recognition> {
    let mut top = TopK::new(k);
    for r in results {
        top.file(r);
    }
    top.into_vec()
}

/// Whether `results` satisfies the result-set contract: length at most `k`,
/// confidences non-increasing.
#[must_use]
pub fn is_ranked(results: &[Recognition], k: usize) -> bool {
    results.len() <= k
        && results
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence)
}

/// An image classifier: raster in, ranked labels out.
///
/// Implementations must be deterministic for a given model and input, and
/// return at most [`top_k`](Self::top_k) results sorted by descending
/// confidence. `classify` may block for a long time.
pub trait Classifier: Send + Sync {
    /// Maximum number of results returned by [`classify`](Self::classify).
    fn top_k(&self) -> usize;

    /// Classify a rendered drawing.
    fn classify(&self, image: &RasterImage) -> Vec<Recognition>;
}

/// The classifier capability of a session: either loaded or permanently
/// unavailable.
///
/// A failed load is never retried; every consumer branches on this type
/// instead of checking for a missing classifier.
#[derive(Clone)]
pub enum ClassifierSlot {
    /// A loaded classifier.
    Ready(Arc<dyn Classifier>),
    /// Loading failed; recognition is disabled for the session.
    Unavailable {
        /// Why the classifier could not be loaded.
        reason: String,
    },
}

impl ClassifierSlot {
    /// Wrap a loaded classifier.
    #[must_use]
    pub fn ready(classifier: impl Classifier + 'static) -> Self {
        Self::Ready(Arc::new(classifier))
    }

    /// Mark recognition as unavailable.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Convert a load attempt into a slot, logging a failure.
    #[must_use]
    pub fn from_load<C, E>(result: Result<C, E>) -> Self
    where
        C: Classifier + 'static,
        E: fmt::Display,
    {
        match result {
            Ok(classifier) => Self::ready(classifier),
            Err(e) => {
                tracing::warn!("Recognition disabled for this session: {e}");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// The classifier, if loaded.
    #[must_use]
    pub fn get(&self) -> Option<&Arc<dyn Classifier>> {
        match self {
            Self::Ready(classifier) => Some(classifier),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether a classifier is loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl fmt::Debug for ClassifierSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(classifier) => f
                .debug_struct("Ready")
                .field("top_k", &classifier.top_k())
                .finish(),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}
