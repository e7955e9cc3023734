//! In-memory store for local runs and tests

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::models::{ClassificationResult, Observation};
use super::{StoreError, TimeSeriesStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    observations: RwLock<HashMap<String, Vec<Observation>>>,
    results: RwLock<HashMap<String, Vec<ClassificationResult>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stand-in for the crawler writing a reading
    pub fn push_observation(&self, collection: &str, observation: Observation) {
        self.observations
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(observation);
    }

    pub fn result_count(&self, stream: &str) -> usize {
        self.results.read().get(stream).map(Vec::len).unwrap_or(0)
    }

    /// All results of a stream, in insertion order
    pub fn results(&self, stream: &str) -> Vec<ClassificationResult> {
        self.results.read().get(stream).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryStore {
    async fn latest_observation(&self, collection: &str) -> Result<Option<Observation>, StoreError> {
        Ok(self
            .observations
            .read()
            .get(collection)
            .and_then(|obs| obs.iter().max_by_key(|o| o.timestamp))
            .cloned())
    }

    async fn latest_result(&self, stream: &str) -> Result<Option<ClassificationResult>, StoreError> {
        Ok(self
            .results
            .read()
            .get(stream)
            .and_then(|results| results.iter().max_by_key(|r| r.timestamp))
            .cloned())
    }

    async fn insert_result(&self, stream: &str, result: &ClassificationResult) -> Result<(), StoreError> {
        self.results
            .write()
            .entry(stream.to_string())
            .or_default()
            .push(result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use crate::logic::testing::{observation, result_at};

    #[tokio::test]
    async fn test_latest_is_by_timestamp_not_insertion() {
        let store = MemoryStore::new();
        let t0 = Utc.with_ymd_and_hms(2024, 11, 2, 8, 0, 0).unwrap();

        let mut newer = observation("light rain", "rain");
        newer.timestamp = t0 + Duration::hours(1);
        let mut older = observation("clear sky", "Clear");
        older.timestamp = t0;

        store.push_observation("cendana", newer.clone());
        store.push_observation("cendana", older);

        let latest = store.latest_observation("cendana").await.unwrap().unwrap();
        assert_eq!(latest, newer);
    }

    #[tokio::test]
    async fn test_empty_collections() {
        let store = MemoryStore::new();
        assert!(store.latest_observation("cendana").await.unwrap().is_none());
        assert!(store.latest_result("predict_cendana").await.unwrap().is_none());
        assert_eq!(store.result_count("predict_cendana"), 0);
    }

    #[tokio::test]
    async fn test_streams_are_independent() {
        let store = MemoryStore::new();
        let t0 = Utc.with_ymd_and_hms(2024, 11, 2, 8, 0, 0).unwrap();

        store.insert_result("predict_a", &result_at(t0)).await.unwrap();
        store.insert_result("predict_a", &result_at(t0 + Duration::hours(1))).await.unwrap();

        assert_eq!(store.result_count("predict_a"), 2);
        assert_eq!(store.result_count("predict_b"), 0);
        let latest = store.latest_result("predict_a").await.unwrap().unwrap();
        assert_eq!(latest.timestamp, t0 + Duration::hours(1));
    }
}
