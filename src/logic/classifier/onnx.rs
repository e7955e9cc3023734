//! ONNX Runtime classifier
//!
//! Input tensor `[1, FEATURE_COUNT]` f32, first output holds one score per risk level.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use crate::logic::features::{FeatureVector, FEATURE_COUNT};
use super::{Classifier, ClassifyError};

pub struct OnnxClassifier {
    name: String,
    output_name: String,
    // Session::run needs exclusive access
    session: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let path = path.as_ref();
        tracing::info!("Loading ONNX model from: {}", path.display());

        if !path.exists() {
            return Err(ClassifyError::Artifact(format!("Model not found: {}", path.display())));
        }

        let session = Session::builder()
            .map_err(|e| ClassifyError::Artifact(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifyError::Artifact(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| ClassifyError::Artifact(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ClassifyError::Artifact("No output defined".to_string()))?;

        tracing::info!("ONNX model loaded successfully");

        Ok(Self {
            name: path.display().to_string(),
            output_name,
            session: Mutex::new(session),
        })
    }
}

impl Classifier for OnnxClassifier {
    fn scores(&self, features: &FeatureVector) -> Result<Vec<f32>, ClassifyError> {
        let input = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.as_slice().to_vec())
            .map_err(|e| ClassifyError::Inference(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input)
            .map_err(|e| ClassifyError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifyError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or(ClassifyError::EmptyOutput)?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifyError::Inference(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
