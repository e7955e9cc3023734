//! Core logic: classification, deduplicated storage, ingest and lookups

pub mod classifier;
pub mod clock;
pub mod dedup;
pub mod features;
pub mod pipeline;
pub mod query;
pub mod scoring;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use classifier::{load_classifier, Classifier, ClassifyError};
pub use clock::{Clock, SystemClock};
pub use dedup::DedupWriter;
pub use pipeline::{BatchReport, IngestPipeline};
pub use query::{QueryError, QueryService};
pub use scoring::Scorer;
pub use store::{MemoryStore, PgStore, StoreError, TimeSeriesStore};
