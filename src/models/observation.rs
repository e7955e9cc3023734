//! Observation model - raw weather readings written by the crawler

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use chrono::{DateTime, Utc};

/// One weather reading from a source or forecast collection.
///
/// `description` and `condition_type` are kept as raw strings; they are
/// validated against the trained categories when the feature vector is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Observation {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub rain: f64,
    pub cloudiness: f64,
    pub description: String,
    pub condition_type: String,
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    /// Most recent observation of a collection
    pub async fn latest(pool: &PgPool, collection: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Observation>(
            r#"
            SELECT temperature, humidity, pressure, wind_speed, wind_direction,
                   rain, cloudiness, description, condition_type, timestamp
            FROM observations
            WHERE collection = $1
            ORDER BY timestamp DESC
            LIMIT 1
            "#
        )
        .bind(collection)
        .fetch_optional(pool)
        .await
    }
}
