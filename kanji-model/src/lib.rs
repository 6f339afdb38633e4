//! # Kanji Pad Model
//!
//! On-device glyph classifier. Consumes a bundled model asset and ranks
//! candidate labels for a rendered drawing.
//!
//! ```text
//! RasterImage ──► resize + normalize ──► dense layer ──► softmax ──► top-K
//! ```
//!
//! Loading is one-shot and fails closed: [`load_classifier`] returns an
//! unavailable [`kanji_core::ClassifierSlot`] when the assets are unusable.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod asset;
pub mod classifier;
pub mod error;
pub mod network;

pub use asset::{parse_labels, ModelAssets, ModelFile, DEFAULT_MODEL_PATH};
pub use classifier::{load_classifier, ClassifierConfig, GlyphClassifier};
pub use error::{ModelError, ModelResult};
pub use network::DenseNetwork;
