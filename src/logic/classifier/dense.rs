//! Dense network classifier loaded from a JSON weight export.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "normalization": { "min_vals": [..9], "max_vals": [..9] },
//!   "layers": [
//!     { "weights": [[..out] ..in], "bias": [..out], "activation": "relu" },
//!     { "weights": [[..3] ..], "bias": [..3], "activation": "softmax" }
//!   ]
//! }
//! ```
//!
//! Weights are stored input-major, as Keras `Dense.get_weights()` returns them.

use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, FEATURE_COUNT};
use crate::models::RiskLevel;
use super::{Classifier, ClassifyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

/// Min/max scaling applied before the first layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub min_vals: Vec<f32>,
    pub max_vals: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct LayerArtifact {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    #[serde(default = "default_activation")]
    activation: Activation,
}

fn default_activation() -> Activation {
    Activation::Linear
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    #[serde(default)]
    normalization: Option<NormalizationParams>,
    layers: Vec<LayerArtifact>,
}

#[derive(Debug)]
struct Layer {
    weights: Array2<f32>,
    bias: Array1<f32>,
    activation: Activation,
}

#[derive(Debug)]
pub struct DenseClassifier {
    name: String,
    normalization: Option<NormalizationParams>,
    layers: Vec<Layer>,
}

impl DenseClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let path = path.as_ref();
        tracing::info!("Loading dense model from: {}", path.display());

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ClassifyError::Artifact(format!("{}: {}", path.display(), e)))?;

        let mut classifier = Self::from_json(&raw)?;
        classifier.name = path.display().to_string();

        tracing::info!("Dense model loaded ({} layers)", classifier.layers.len());
        Ok(classifier)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClassifyError> {
        let artifact: ModelArtifact =
            serde_json::from_str(raw).map_err(|e| ClassifyError::Artifact(e.to_string()))?;

        if artifact.layers.is_empty() {
            return Err(ClassifyError::Artifact("model has no layers".to_string()));
        }

        if let Some(norm) = &artifact.normalization {
            if norm.min_vals.len() != FEATURE_COUNT || norm.max_vals.len() != FEATURE_COUNT {
                return Err(ClassifyError::Artifact(format!(
                    "normalization expects {} features",
                    FEATURE_COUNT
                )));
            }
        }

        let mut layers = Vec::with_capacity(artifact.layers.len());
        let mut expected_inputs = FEATURE_COUNT;

        for (i, layer) in artifact.layers.into_iter().enumerate() {
            let rows = layer.weights.len();
            let cols = layer.weights.first().map(Vec::len).unwrap_or(0);

            if rows != expected_inputs {
                return Err(ClassifyError::Artifact(format!(
                    "layer {} takes {} inputs, expected {}",
                    i, rows, expected_inputs
                )));
            }
            if cols == 0 || layer.weights.iter().any(|row| row.len() != cols) {
                return Err(ClassifyError::Artifact(format!("layer {} has ragged weights", i)));
            }
            if layer.bias.len() != cols {
                return Err(ClassifyError::Artifact(format!(
                    "layer {} bias has {} entries, expected {}",
                    i,
                    layer.bias.len(),
                    cols
                )));
            }

            let flat: Vec<f32> = layer.weights.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((rows, cols), flat)
                .map_err(|e| ClassifyError::Artifact(format!("layer {}: {}", i, e)))?;

            layers.push(Layer {
                weights,
                bias: Array1::from(layer.bias),
                activation: layer.activation,
            });
            expected_inputs = cols;
        }

        if expected_inputs != RiskLevel::ALL.len() {
            return Err(ClassifyError::Artifact(format!(
                "model emits {} scores, expected {}",
                expected_inputs,
                RiskLevel::ALL.len()
            )));
        }

        Ok(Self {
            name: "<memory>".to_string(),
            normalization: artifact.normalization,
            layers,
        })
    }

    fn normalize(&self, features: &FeatureVector) -> Array1<f32> {
        let mut input = Array1::from(features.as_slice().to_vec());
        if let Some(norm) = &self.normalization {
            for (i, value) in input.iter_mut().enumerate() {
                let range = (norm.max_vals[i] - norm.min_vals[i]).max(1e-8);
                *value = (*value - norm.min_vals[i]) / range;
            }
        }
        input
    }
}

fn activate(values: &mut Array1<f32>, activation: Activation) {
    match activation {
        Activation::Linear => {}
        Activation::Relu => values.mapv_inplace(|v| v.max(0.0)),
        Activation::Sigmoid => values.mapv_inplace(|v| 1.0 / (1.0 + (-v).exp())),
        Activation::Tanh => values.mapv_inplace(f32::tanh),
        Activation::Softmax => {
            let max = values.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            values.mapv_inplace(|v| (v - max).exp());
            let sum = values.sum();
            if sum > 0.0 {
                values.mapv_inplace(|v| v / sum);
            }
        }
    }
}

impl Classifier for DenseClassifier {
    fn scores(&self, features: &FeatureVector) -> Result<Vec<f32>, ClassifyError> {
        let mut activations = self.normalize(features);

        for layer in &self.layers {
            let mut next = activations.dot(&layer.weights) + &layer.bias;
            activate(&mut next, layer.activation);
            activations = next;
        }

        if activations.iter().any(|v| !v.is_finite()) {
            return Err(ClassifyError::Inference("non-finite score".to_string()));
        }

        Ok(activations.to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
