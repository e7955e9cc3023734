//! Flood Risk Prediction Server
//!
//! Classifies the latest weather observation of each monitored location in
//! Samarinda and keeps a spaced-out history of the results.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FLOOD PREDICT                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐ │
//! │  │  HTTP     │  │ Ingest        │  │  Query / Forecast   │ │
//! │  │  (Axum)   │─▶│ Pipeline      │  │  (read only)        │ │
//! │  └───────────┘  │  └─ Dedup     │  └──────────┬──────────┘ │
//! │                 │     Writer    │             │            │
//! │                 └───────┬───────┘             │            │
//! │            Classifier ◀─┤                     │            │
//! │                         ▼                     ▼            │
//! │                ┌──────────────────────────────────┐        │
//! │                │ PostgreSQL (observations,        │        │
//! │                │             predictions)         │        │
//! │                └──────────────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod constants;
mod db;
mod models;
mod handlers;
mod logic;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{Router, routing::get};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StoreBackend};
use crate::logic::{
    Classifier, Clock, DedupWriter, IngestPipeline, MemoryStore, PgStore, QueryService, Scorer,
    SystemClock, TimeSeriesStore,
};
use crate::models::StreamKey;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "flood_predict=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Flood Predict Server starting...");
    tracing::info!(
        "Write interval: {} minutes, {} streams",
        config.min_write_interval_minutes,
        StreamKey::all().len()
    );

    let store: Arc<dyn TimeSeriesStore> = match config.store_backend {
        StoreBackend::Postgres => {
            tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

            let pool = db::create_pool(&config.database_url)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;

            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory if config.is_production() => {
            anyhow::bail!("STORE_BACKEND=memory is not allowed in production");
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, history is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let classifier: Arc<dyn Classifier> = logic::load_classifier(&config.model_path)
        .with_context(|| format!("Failed to load model {}", config.model_path))?
        .into();
    tracing::info!("Classifier loaded: {} ({})", classifier.name(), config.model_path);

    let state = AppState::new(config.clone(), store, classifier, Arc::new(SystemClock));

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IngestPipeline>,
    pub query: Arc<QueryService>,
    pub config: Config,
}

impl AppState {
    /// Wire the core services around one store, classifier and clock
    pub fn new(
        config: Config,
        store: Arc<dyn TimeSeriesStore>,
        classifier: Arc<dyn Classifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let scorer = Scorer::new(classifier, Arc::clone(&clock), config.classify_timeout());
        let writer = DedupWriter::new(
            Arc::clone(&store),
            clock,
            config.min_write_interval(),
            config.store_timeout(),
        );

        let pipeline = IngestPipeline::new(
            Arc::clone(&store),
            scorer.clone(),
            writer,
            StreamKey::all(),
            config.store_timeout(),
        );
        let query = QueryService::new(store, scorer, config.store_timeout());

        Self {
            pipeline: Arc::new(pipeline),
            query: Arc::new(query),
            config,
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::ingest::trigger))
        .route("/health", get(handlers::health::check))
        .route("/samarinda", get(handlers::predictions::general))
        .route("/tomorrow/:location", get(handlers::predictions::tomorrow))
        .route("/:location", get(handlers::predictions::location))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
