//! The on-device glyph classifier.

use image::imageops::{self, FilterType};
use image::GrayImage;
use kanji_core::{Classifier, ClassifierSlot, RasterImage, Recognition, TopK};
use serde::{Deserialize, Serialize};

use crate::asset::ModelAssets;
use crate::error::ModelResult;
use crate::network::DenseNetwork;

/// Classifier settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Maximum number of results per classification.
    pub top_k: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { top_k: 10 }
    }
}

/// Classifies rendered drawings with a [`DenseNetwork`].
#[derive(Debug)]
pub struct GlyphClassifier {
    network: DenseNetwork,
    config: ClassifierConfig,
}

impl GlyphClassifier {
    /// Load the model assets. One-shot; a failure is final for the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the assets cannot be read, parsed, or validated.
    pub fn initialize(assets: &ModelAssets, config: ClassifierConfig) -> ModelResult<Self> {
        let network = DenseNetwork::from_file(assets.load()?)?;
        let (w, h) = network.input_size();
        tracing::info!(
            classes = network.classes(),
            input = %format!("{w}x{h}"),
            top_k = config.top_k,
            "Classifier initialized"
        );
        Ok(Self::new(network, config))
    }

    /// Wrap an already built network.
    #[must_use]
    pub fn new(network: DenseNetwork, config: ClassifierConfig) -> Self {
        Self { network, config }
    }

    /// The underlying network.
    #[must_use]
    pub fn network(&self) -> &DenseNetwork {
        &self.network
    }

    /// Convert a raster into network input: resized to the model's input
    /// size, ink intensity relative to the background in `[0, 1]`.
    #[must_use]
    pub fn preprocess(&self, image: &RasterImage) -> Vec<f32> {
        let (w, h) = self.network.input_size();
        let background = f32::from(image.background());
        let normalize = |p: u8| (f32::from(p) - background).abs() / 255.0;

        if (image.width(), image.height()) == (w, h) {
            return image.pixels().iter().copied().map(normalize).collect();
        }

        match GrayImage::from_raw(image.width(), image.height(), image.pixels().to_vec()) {
            Some(gray) => imageops::resize(&gray, w, h, FilterType::Triangle)
                .into_raw()
                .into_iter()
                .map(normalize)
                .collect(),
            None => {
                tracing::warn!("Raster buffer does not match its dimensions; using blank input");
                vec![0.0; (w as usize) * (h as usize)]
            }
        }
    }
}

impl Classifier for GlyphClassifier {
    fn top_k(&self) -> usize {
        self.config.top_k
    }

    fn classify(&self, image: &RasterImage) -> Vec<Recognition> {
        let input = self.preprocess(image);
        let probabilities = self.network.forward(&input);

        let mut top = TopK::new(self.config.top_k);
        for (class, p) in probabilities.into_iter().enumerate() {
            if let Some(label) = self.network.label(class) {
                top.file(Recognition::new(label, p));
            }
        }
        top.into_vec()
    }
}

/// Load the classifier, degrading to an unavailable slot on failure.
#[must_use]
pub fn load_classifier(assets: &ModelAssets, config: ClassifierConfig) -> ClassifierSlot {
    ClassifierSlot::from_load(GlyphClassifier::initialize(assets, config))
}
