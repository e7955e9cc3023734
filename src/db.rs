//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create tables if not exist
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Raw readings: one collection per location slug, `weather_data` for the
-- city aggregate, `forecast_<slug>` for next-day forecasts. Written by the crawler.
CREATE TABLE IF NOT EXISTS observations (
    id BIGSERIAL PRIMARY KEY,
    collection VARCHAR(128) NOT NULL,
    city VARCHAR(128),
    temperature DOUBLE PRECISION NOT NULL,
    humidity DOUBLE PRECISION NOT NULL,
    pressure DOUBLE PRECISION NOT NULL,
    wind_speed DOUBLE PRECISION NOT NULL,
    wind_direction DOUBLE PRECISION NOT NULL DEFAULT 0,
    rain DOUBLE PRECISION NOT NULL DEFAULT 0,
    cloudiness DOUBLE PRECISION NOT NULL DEFAULT 0,
    description VARCHAR(64) NOT NULL,
    condition_type VARCHAR(32) NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL
);

-- Classification history: `predict_general` and `predict_<slug>`
CREATE TABLE IF NOT EXISTS predictions (
    id BIGSERIAL PRIMARY KEY,
    collection VARCHAR(128) NOT NULL,
    temperature DOUBLE PRECISION NOT NULL,
    humidity DOUBLE PRECISION NOT NULL,
    pressure DOUBLE PRECISION NOT NULL,
    wind_speed DOUBLE PRECISION NOT NULL,
    wind_direction DOUBLE PRECISION NOT NULL,
    rain DOUBLE PRECISION NOT NULL,
    cloudiness DOUBLE PRECISION NOT NULL,
    description VARCHAR(64) NOT NULL,
    condition_type VARCHAR(32) NOT NULL,
    risk_level VARCHAR(16) NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL,
    city VARCHAR(128),
    location VARCHAR(128)
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_observations_latest ON observations(collection, timestamp DESC);
CREATE INDEX IF NOT EXISTS idx_predictions_latest ON predictions(collection, timestamp DESC);
"#;
