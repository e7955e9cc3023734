//! Time-series storage
//!
//! Collections are append-only and ordered by `timestamp`. The core only
//! ever needs the newest record of a collection and a plain append.

pub mod memory;
pub mod pg;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::models::{ClassificationResult, Observation};

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Newest observation of a source or forecast collection
    async fn latest_observation(&self, collection: &str) -> Result<Option<Observation>, StoreError>;

    /// Newest classification result of a `predict_*` stream
    async fn latest_result(&self, stream: &str) -> Result<Option<ClassificationResult>, StoreError>;

    async fn insert_result(&self, stream: &str, result: &ClassificationResult) -> Result<(), StoreError>;
}

/// Bound a store call; an elapsed timer becomes `StoreError::Timeout`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
