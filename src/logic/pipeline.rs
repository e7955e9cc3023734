//! Ingest Pipeline - one classification pass over every stream
//!
//! Each stream runs as its own task: fetch the newest observation, classify
//! it, tag it, and hand it to the dedup writer. A failure in one stream is
//! recorded as that stream's outcome and never aborts the others.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::models::StreamKey;
use super::classifier::ClassifyError;
use super::dedup::{DedupWriter, StoreDecision};
use super::scoring::Scorer;
use super::store::{bounded, StoreError, TimeSeriesStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Stored,
    Skipped,
    NoData,
    ClassifyError,
    StoreError,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::ClassifyError | Outcome::StoreError)
    }
}

impl From<StoreDecision> for Outcome {
    fn from(decision: StoreDecision) -> Self {
        match decision {
            StoreDecision::Stored => Outcome::Stored,
            StoreDecision::Skipped => Outcome::Skipped,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("no observation in {0}")]
    NoData(String),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IngestError {
    pub fn outcome(&self) -> Outcome {
        match self {
            IngestError::NoData(_) => Outcome::NoData,
            IngestError::Classify(_) => Outcome::ClassifyError,
            IngestError::Store(_) => Outcome::StoreError,
        }
    }
}

/// Per-stream outcomes of one batch, keyed by stream name
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: BTreeMap<String, Outcome>,
    pub success: bool,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failure()).count()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }
}

pub struct IngestPipeline {
    store: Arc<dyn TimeSeriesStore>,
    scorer: Scorer,
    writer: DedupWriter,
    streams: Vec<StreamKey>,
    store_timeout: Duration,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn TimeSeriesStore>,
        scorer: Scorer,
        writer: DedupWriter,
        streams: Vec<StreamKey>,
        store_timeout: Duration,
    ) -> Self {
        Self { store, scorer, writer, streams, store_timeout }
    }

    pub fn streams(&self) -> &[StreamKey] {
        &self.streams
    }

    /// Run every stream once and collect the outcomes.
    pub async fn run_once(self: &Arc<Self>) -> BatchReport {
        let handles: Vec<_> = self
            .streams
            .iter()
            .cloned()
            .map(|key| {
                let pipeline = Arc::clone(self);
                let task_key = key.clone();
                let handle = tokio::spawn(async move { pipeline.process(&task_key).await });
                (key, handle)
            })
            .collect();

        let mut outcomes = BTreeMap::new();
        for (key, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                // classifier panics are caught inside the scorer, so a task
                // that dies here died in the store or dedup path
                Err(e) if e.is_panic() => {
                    tracing::error!("Ingest task for {} panicked in the store path: {}", key, e);
                    Outcome::StoreError
                }
                Err(e) => {
                    tracing::error!("Ingest task for {} was cancelled: {}", key, e);
                    Outcome::StoreError
                }
            };
            outcomes.insert(key.name().to_string(), outcome);
        }

        let success = !outcomes.values().any(Outcome::is_failure);
        let report = BatchReport { outcomes, success };

        tracing::info!(
            "Ingest batch done: {} stored, {} skipped, {} without data, {} failed",
            report.count(Outcome::Stored),
            report.count(Outcome::Skipped),
            report.count(Outcome::NoData),
            report.failures()
        );

        report
    }

    async fn process(&self, key: &StreamKey) -> Outcome {
        match self.ingest(key).await {
            Ok(decision) => decision.into(),
            Err(e) => {
                match &e {
                    IngestError::NoData(_) => tracing::warn!("No data found for {}", key),
                    _ => tracing::error!("Ingest failed for {}: {}", key, e),
                }
                e.outcome()
            }
        }
    }

    /// Classify the newest observation of one stream and maybe store it.
    pub async fn ingest(&self, key: &StreamKey) -> Result<StoreDecision, IngestError> {
        let collection = key.source_collection();
        let observation = bounded(self.store_timeout, self.store.latest_observation(collection))
            .await?
            .ok_or_else(|| IngestError::NoData(collection.to_string()))?;

        let mut result = self.scorer.classify(&observation).await?;
        key.tag(&mut result);

        Ok(self.writer.maybe_store(&key.output_stream(), &result).await?)
    }
}
