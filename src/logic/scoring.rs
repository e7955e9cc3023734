//! Observation -> classification, shared by ingest and forecast lookups

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::models::{ClassificationResult, Observation};
use super::classifier::{Classifier, ClassifyError};
use super::clock::Clock;
use super::features::FeatureVector;

#[derive(Clone)]
pub struct Scorer {
    classifier: Arc<dyn Classifier>,
    clock: Arc<dyn Clock>,
    classify_timeout: Duration,
}

impl Scorer {
    pub fn new(classifier: Arc<dyn Classifier>, clock: Arc<dyn Clock>, classify_timeout: Duration) -> Self {
        Self { classifier, clock, classify_timeout }
    }

    /// Classify one observation. The result is untagged and stamped with
    /// the classification time.
    pub async fn classify(&self, observation: &Observation) -> Result<ClassificationResult, ClassifyError> {
        let features = FeatureVector::from_observation(observation)?;

        let classifier = Arc::clone(&self.classifier);
        let task = tokio::task::spawn_blocking(move || classifier.predict(&features));

        let risk_level = timeout(self.classify_timeout, task)
            .await
            .map_err(|_| ClassifyError::Timeout(self.classify_timeout))?
            .map_err(|e| ClassifyError::Inference(format!("Task failed: {}", e)))??;

        Ok(ClassificationResult::from_observation(observation, risk_level, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::testing::{observation, t0, FixedClassifier, ManualClock, PanickyClassifier, SlowClassifier};
    use crate::models::RiskLevel;

    fn scorer(classifier: Arc<dyn Classifier>) -> Scorer {
        Scorer::new(classifier, Arc::new(ManualClock::at(t0())), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_copies_readings_and_stamps_classification_time() {
        let scorer = Scorer::new(
            Arc::new(FixedClassifier::new(2)),
            Arc::new(ManualClock::at(t0() + chrono::Duration::minutes(5))),
            Duration::from_millis(200),
        );
        let obs = observation("light rain", "rain");

        let result = scorer.classify(&obs).await.unwrap();
        assert_eq!(result.risk_level, RiskLevel::Alert);
        assert_eq!(result.description, "light rain");
        assert_eq!(result.pressure, 1010.0);
        assert_eq!(result.timestamp, t0() + chrono::Duration::minutes(5));
        assert!(result.city.is_none() && result.location.is_none());
    }

    #[tokio::test]
    async fn test_unknown_category_never_reaches_model() {
        let classifier = Arc::new(FixedClassifier::new(0));
        let scorer = scorer(classifier.clone());

        let err = scorer.classify(&observation("thunderstorm", "Clear")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::UnknownCategory { .. }));
        assert_eq!(classifier.calls(), 0);
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let scorer = scorer(Arc::new(SlowClassifier(Duration::from_secs(1))));
        let err = scorer.classify(&observation("clear sky", "Clear")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_model_panic_is_an_inference_error() {
        let scorer = scorer(Arc::new(PanickyClassifier));
        let mut obs = observation("clear sky", "Clear");
        obs.temperature = 45.0;

        let err = scorer.classify(&obs).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Inference(_)));
    }
}
