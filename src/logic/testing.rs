//! Test doubles shared by the logic tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::models::{ClassificationResult, Observation, RiskLevel};
use super::classifier::{Classifier, ClassifyError};
use super::clock::Clock;
use super::features::FeatureVector;
use super::store::{MemoryStore, StoreError, TimeSeriesStore};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 2, 8, 0, 0).unwrap()
}

/// 30 C, 70 %, 1010 hPa, 5 m/s from 180 deg, no rain, 40 % cloud
pub fn observation(description: &str, condition_type: &str) -> Observation {
    Observation {
        temperature: 30.0,
        humidity: 70.0,
        pressure: 1010.0,
        wind_speed: 5.0,
        wind_direction: 180.0,
        rain: 0.0,
        cloudiness: 40.0,
        description: description.to_string(),
        condition_type: condition_type.to_string(),
        timestamp: t0(),
    }
}

pub fn result_at(timestamp: DateTime<Utc>) -> ClassificationResult {
    ClassificationResult::from_observation(&observation("clear sky", "Clear"), RiskLevel::Safe, timestamp)
}

// ============================================================================
// CLOCK
// ============================================================================

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

// ============================================================================
// CLASSIFIERS
// ============================================================================

/// Always votes for one output position; counts calls
pub struct FixedClassifier {
    index: usize,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(index: usize) -> Self {
        Self { index, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for FixedClassifier {
    fn scores(&self, _features: &FeatureVector) -> Result<Vec<f32>, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut scores = vec![0.0; self.index + 1];
        scores[self.index] = 1.0;
        Ok(scores)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Sleeps on the blocking pool before answering
pub struct SlowClassifier(pub Duration);

impl Classifier for SlowClassifier {
    fn scores(&self, _features: &FeatureVector) -> Result<Vec<f32>, ClassifyError> {
        std::thread::sleep(self.0);
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Panics when the observation is hotter than 40 C
pub struct PanickyClassifier;

impl Classifier for PanickyClassifier {
    fn scores(&self, features: &FeatureVector) -> Result<Vec<f32>, ClassifyError> {
        if features.values[0] > 40.0 {
            panic!("model blew up");
        }
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn name(&self) -> &str {
        "panicky"
    }
}

// ============================================================================
// STORES
// ============================================================================

/// Panics on every result read
pub struct PanickyStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl TimeSeriesStore for PanickyStore {
    async fn latest_observation(&self, collection: &str) -> Result<Option<Observation>, StoreError> {
        self.inner.latest_observation(collection).await
    }

    async fn latest_result(&self, _stream: &str) -> Result<Option<ClassificationResult>, StoreError> {
        panic!("driver bug");
    }

    async fn insert_result(&self, stream: &str, result: &ClassificationResult) -> Result<(), StoreError> {
        self.inner.insert_result(stream, result).await
    }
}

/// Every call fails
pub struct DownStore;

#[async_trait]
impl TimeSeriesStore for DownStore {
    async fn latest_observation(&self, _collection: &str) -> Result<Option<Observation>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn latest_result(&self, _stream: &str) -> Result<Option<ClassificationResult>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn insert_result(&self, _stream: &str, _result: &ClassificationResult) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Memory store whose result reads fail for one stream and lag for all others.
///
/// The lag comes after the snapshot is taken, so a delayed reader returns
/// state that may already be stale.
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub broken_stream: Option<String>,
    pub read_delay: Duration,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            broken_stream: None,
            read_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl TimeSeriesStore for FlakyStore {
    async fn latest_observation(&self, collection: &str) -> Result<Option<Observation>, StoreError> {
        self.inner.latest_observation(collection).await
    }

    async fn latest_result(&self, stream: &str) -> Result<Option<ClassificationResult>, StoreError> {
        if self.broken_stream.as_deref() == Some(stream) {
            return Err(StoreError::Unavailable("read failed".to_string()));
        }
        let snapshot = self.inner.latest_result(stream).await;
        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        snapshot
    }

    async fn insert_result(&self, stream: &str, result: &ClassificationResult) -> Result<(), StoreError> {
        self.inner.insert_result(stream, result).await
    }
}
