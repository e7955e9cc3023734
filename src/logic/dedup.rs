//! Dedup Writer - minimum spacing between stored results of a stream
//!
//! A candidate is appended when the stream is empty or when the newest
//! stored record is at least `min_interval` old, measured against the clock
//! at evaluation time (not the candidate's own timestamp).
//!
//! The read-then-append sequence runs under a per-stream async lock, so
//! overlapping batches inside this process cannot both pass the check.
//! Writers in other processes are not excluded: two instances sharing one
//! database may each append inside the same interval window.
//!
//! A timed-out append is reported as `StoreError::Timeout` even when the
//! database committed the row before the deadline fired. The next batch then
//! sees that row and skips.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::models::ClassificationResult;
use super::clock::Clock;
use super::store::{bounded, StoreError, TimeSeriesStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreDecision {
    Stored,
    Skipped,
}

pub struct DedupWriter {
    store: Arc<dyn TimeSeriesStore>,
    clock: Arc<dyn Clock>,
    min_interval: chrono::Duration,
    store_timeout: Duration,
    stream_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DedupWriter {
    pub fn new(
        store: Arc<dyn TimeSeriesStore>,
        clock: Arc<dyn Clock>,
        min_interval: chrono::Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            min_interval,
            store_timeout,
            stream_locks: Mutex::new(HashMap::new()),
        }
    }

    fn stream_lock(&self, stream: &str) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.stream_locks.lock().entry(stream.to_string()).or_default())
    }

    /// Append `candidate` to `stream` unless the last stored record is too recent.
    ///
    /// A failed or timed-out read returns the error without writing.
    pub async fn maybe_store(
        &self,
        stream: &str,
        candidate: &ClassificationResult,
    ) -> Result<StoreDecision, StoreError> {
        let lock = self.stream_lock(stream);
        let _guard = lock.lock().await;

        let last = bounded(self.store_timeout, self.store.latest_result(stream)).await?;

        match last {
            None => {
                tracing::info!("No previous data found in {}. Storing new data.", stream);
            }
            Some(last) => {
                let elapsed = self.clock.now() - last.timestamp;
                if elapsed < self.min_interval {
                    tracing::debug!(
                        "Data not stored for {} ({}s since last record, need {}s)",
                        stream,
                        elapsed.num_seconds(),
                        self.min_interval.num_seconds()
                    );
                    return Ok(StoreDecision::Skipped);
                }
                tracing::info!("Storing new data in {} (risk level {})", stream, candidate.risk_level);
            }
        }

        bounded(self.store_timeout, self.store.insert_result(stream, candidate)).await?;
        Ok(StoreDecision::Stored)
    }
}
