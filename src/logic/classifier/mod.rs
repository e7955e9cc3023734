//! Classifier Module - flood risk inference
//!
//! The pipeline only needs scores per risk level; the backend is picked
//! from the artifact extension at startup.

pub mod dense;
#[cfg(feature = "onnx")]
pub mod onnx;

use std::path::Path;
use std::time::Duration;

use crate::models::RiskLevel;
use super::features::FeatureVector;

pub use dense::DenseClassifier;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("unknown {field} category: {value:?}")]
    UnknownCategory { field: &'static str, value: String },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("classifier output index {0} has no risk level")]
    OutOfRange(usize),

    #[error("classifier returned no scores")]
    EmptyOutput,

    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid model artifact: {0}")]
    Artifact(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// A loaded, immutable model. Shared across requests behind an `Arc`.
pub trait Classifier: Send + Sync {
    /// One score per classifier output position
    fn scores(&self, features: &FeatureVector) -> Result<Vec<f32>, ClassifyError>;

    fn name(&self) -> &str;

    /// Output position with the highest score
    fn predict_index(&self, features: &FeatureVector) -> Result<usize, ClassifyError> {
        argmax(&self.scores(features)?).ok_or(ClassifyError::EmptyOutput)
    }

    fn predict(&self, features: &FeatureVector) -> Result<RiskLevel, ClassifyError> {
        let index = self.predict_index(features)?;
        RiskLevel::from_index(index).ok_or(ClassifyError::OutOfRange(index))
    }
}

/// First maximum wins on ties. NaN scores never win.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if score <= b => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

/// Load a classifier artifact: `.json` dense export, or `.onnx` with the `onnx` feature.
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Box<dyn Classifier>, ClassifyError> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    match extension {
        "json" => Ok(Box::new(DenseClassifier::load(path)?)),
        #[cfg(feature = "onnx")]
        "onnx" => Ok(Box::new(OnnxClassifier::load(path)?)),
        other => Err(ClassifyError::Artifact(format!(
            "unsupported model format {:?} for {}",
            other,
            path.display()
        ))),
    }
}
