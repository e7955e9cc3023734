//! PostgreSQL store

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{ClassificationResult, Observation};
use super::{StoreError, TimeSeriesStore};

/// Collections live in two tables keyed by a `collection` column:
/// `observations` for raw and forecast readings, `predictions` for results.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSeriesStore for PgStore {
    async fn latest_observation(&self, collection: &str) -> Result<Option<Observation>, StoreError> {
        Ok(Observation::latest(&self.pool, collection).await?)
    }

    async fn latest_result(&self, stream: &str) -> Result<Option<ClassificationResult>, StoreError> {
        Ok(ClassificationResult::latest(&self.pool, stream).await?)
    }

    async fn insert_result(&self, stream: &str, result: &ClassificationResult) -> Result<(), StoreError> {
        result.insert(&self.pool, stream).await?;
        Ok(())
    }
}
