//! Read path: stored classifications and on-demand forecasts

use std::sync::Arc;
use std::time::Duration;

use crate::models::{forecast_collection, ClassificationResult, StreamKey};
use super::classifier::ClassifyError;
use super::scoring::Scorer;
use super::store::{bounded, StoreError, TimeSeriesStore};

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

pub struct QueryService {
    store: Arc<dyn TimeSeriesStore>,
    scorer: Scorer,
    store_timeout: Duration,
}

impl QueryService {
    pub fn new(store: Arc<dyn TimeSeriesStore>, scorer: Scorer, store_timeout: Duration) -> Self {
        Self { store, scorer, store_timeout }
    }

    /// Newest stored record of a `predict_*` stream, unmodified
    pub async fn latest(&self, stream: &str) -> Result<ClassificationResult, QueryError> {
        bounded(self.store_timeout, self.store.latest_result(stream))
            .await?
            .ok_or_else(|| QueryError::NotFound(format!("No prediction data available in {}.", stream)))
    }

    pub async fn latest_for(&self, key: &StreamKey) -> Result<ClassificationResult, QueryError> {
        self.latest(&key.output_stream()).await
    }

    /// Classify the newest `forecast_<slug>` observation. Nothing is stored.
    pub async fn forecast(&self, slug: &str) -> Result<ClassificationResult, QueryError> {
        let collection = forecast_collection(slug);
        let observation = bounded(self.store_timeout, self.store.latest_observation(&collection))
            .await?
            .ok_or_else(|| {
                QueryError::NotFound(format!(
                    "No forecast data available for tomorrow at location {}.",
                    slug
                ))
            })?;

        let mut result = self.scorer.classify(&observation).await?;
        StreamKey::Location(slug.to_string()).tag(&mut result);
        Ok(result)
    }
}
