//! Dense classification network.

use crate::asset::ModelFile;
use crate::error::{ModelError, ModelResult};

/// A single fully-connected layer followed by softmax.
#[derive(Debug, Clone)]
pub struct DenseNetwork {
    input_width: u32,
    input_height: u32,
    /// Row-major `classes x inputs`.
    weights: Vec<f32>,
    bias: Vec<f32>,
    labels: Vec<String>,
}

impl DenseNetwork {
    /// Validate a model file and build the network.
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions disagree.
    pub fn from_file(file: ModelFile) -> ModelResult<Self> {
        let inputs = (file.input_width as usize) * (file.input_height as usize);
        if inputs == 0 {
            return Err(ModelError::Shape(format!(
                "input size {}x{} is empty",
                file.input_width, file.input_height
            )));
        }
        let classes = file.weights.len();
        if classes == 0 {
            return Err(ModelError::Shape("model has no output classes".to_string()));
        }
        if file.bias.len() != classes {
            return Err(ModelError::Shape(format!(
                "{} biases for {classes} classes",
                file.bias.len()
            )));
        }
        if let Some((class, row)) = file
            .weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != inputs)
        {
            return Err(ModelError::Shape(format!(
                "class {class} has {} weights, expected {inputs}",
                row.len()
            )));
        }
        if file.labels.len() != classes {
            return Err(ModelError::LabelMismatch {
                labels: file.labels.len(),
                classes,
            });
        }

        Ok(Self {
            input_width: file.input_width,
            input_height: file.input_height,
            weights: file.weights.into_iter().flatten().collect(),
            bias: file.bias,
            labels: file.labels,
        })
    }

    /// Expected input size `(width, height)`.
    #[must_use]
    pub fn input_size(&self) -> (u32, u32) {
        (self.input_width, self.input_height)
    }

    /// Number of output classes.
    #[must_use]
    pub fn classes(&self) -> usize {
        self.labels.len()
    }

    /// Label of class `index`.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Class probabilities for a normalized input vector.
    ///
    /// `input` must hold `width * height` values; shorter inputs are
    /// zero-padded, longer ones truncated.
    #[must_use]
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        let inputs = (self.input_width as usize) * (self.input_height as usize);
        let logits: Vec<f32> = self
            .weights
            .chunks_exact(inputs)
            .zip(&self.bias)
            .map(|(row, bias)| {
                row.iter()
                    .zip(input.iter().chain(std::iter::repeat(&0.0)))
                    .map(|(w, x)| w * x)
                    .sum::<f32>()
                    + bias
            })
            .collect();
        softmax(&logits)
    }
}

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}
