//! Bundled model assets: serialized network plus label resource.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Default model asset name.
pub const DEFAULT_MODEL_PATH: &str = "assets/kanji_model.json";

/// Locations of the model resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAssets {
    /// Serialized network.
    pub model: PathBuf,
    /// Optional label resource, one label per line. Overrides inline labels.
    pub labels: Option<PathBuf>,
}

impl ModelAssets {
    /// Assets with inline labels.
    #[must_use]
    pub fn new(model: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            labels: None,
        }
    }

    /// Attach a label resource.
    #[must_use]
    pub fn with_labels(mut self, labels: impl Into<PathBuf>) -> Self {
        self.labels = Some(labels.into());
        self
    }

    /// Read and parse the model, resolving its labels.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, or no labels exist.
    pub fn load(&self) -> ModelResult<ModelFile> {
        let json = read(&self.model)?;
        let mut file: ModelFile = serde_json::from_str(&json)?;
        if let Some(path) = &self.labels {
            file.labels = parse_labels(&read(path)?);
        }
        if file.labels.is_empty() {
            return Err(ModelError::MissingLabels);
        }
        tracing::debug!(
            model = %self.model.display(),
            classes = file.labels.len(),
            "Model asset read"
        );
        Ok(file)
    }
}

impl Default for ModelAssets {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

/// On-disk model format: one dense layer over the normalized input image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Input image width the network expects.
    pub input_width: u32,
    /// Input image height the network expects.
    pub input_height: u32,
    /// One row of `input_width * input_height` weights per class.
    pub weights: Vec<Vec<f32>>,
    /// One bias per class.
    pub bias: Vec<f32>,
    /// Class labels, in class order.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Parse a label resource: one label per line, surrounding whitespace and
/// blank lines ignored.
#[must_use]
pub fn parse_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn read(path: &Path) -> ModelResult<String> {
    fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}
