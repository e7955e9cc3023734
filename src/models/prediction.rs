//! Classification result model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};
use chrono::{DateTime, Utc};

use super::Observation;

/// Flood risk levels, ordered by classifier output position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Aman")]
    Safe,
    #[serde(rename = "Bahaya")]
    Danger,
    #[serde(rename = "Waspada")]
    Alert,
}

impl RiskLevel {
    /// Index i of this array is classifier output i
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Safe, RiskLevel::Danger, RiskLevel::Alert];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Aman",
            RiskLevel::Danger => "Bahaya",
            RiskLevel::Alert => "Waspada",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown risk level: {0}")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownRiskLevel(s.to_string()))
    }
}

/// A classified observation as stored in a `predict_*` stream.
///
/// `timestamp` is the classification time, not the observation time.
/// Exactly one of `city` / `location` is set for stored records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub rain: f64,
    pub cloudiness: f64,
    pub description: String,
    pub condition_type: String,
    pub risk_level: RiskLevel,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ClassificationResult {
    /// Copy the observation's readings through, untagged
    pub fn from_observation(
        observation: &Observation,
        risk_level: RiskLevel,
        classified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            temperature: observation.temperature,
            humidity: observation.humidity,
            pressure: observation.pressure,
            wind_speed: observation.wind_speed,
            wind_direction: observation.wind_direction,
            rain: observation.rain,
            cloudiness: observation.cloudiness,
            description: observation.description.clone(),
            condition_type: observation.condition_type.clone(),
            risk_level,
            timestamp: classified_at,
            city: None,
            location: None,
        }
    }

    pub async fn latest(pool: &PgPool, stream: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ClassificationResult>(
            r#"
            SELECT temperature, humidity, pressure, wind_speed, wind_direction,
                   rain, cloudiness, description, condition_type, risk_level,
                   timestamp, city, location
            FROM predictions
            WHERE collection = $1
            ORDER BY timestamp DESC
            LIMIT 1
            "#
        )
        .bind(stream)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(&self, pool: &PgPool, stream: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO predictions (collection, temperature, humidity, pressure, wind_speed,
                wind_direction, rain, cloudiness, description, condition_type, risk_level,
                timestamp, city, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#
        )
        .bind(stream)
        .bind(self.temperature)
        .bind(self.humidity)
        .bind(self.pressure)
        .bind(self.wind_speed)
        .bind(self.wind_direction)
        .bind(self.rain)
        .bind(self.cloudiness)
        .bind(&self.description)
        .bind(&self.condition_type)
        .bind(self.risk_level.as_str())
        .bind(self.timestamp)
        .bind(&self.city)
        .bind(&self.location)
        .execute(pool)
        .await?;
        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for ClassificationResult {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let risk_level: String = row.try_get("risk_level")?;
        let risk_level = risk_level.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "risk_level".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            temperature: row.try_get("temperature")?,
            humidity: row.try_get("humidity")?,
            pressure: row.try_get("pressure")?,
            wind_speed: row.try_get("wind_speed")?,
            wind_direction: row.try_get("wind_direction")?,
            rain: row.try_get("rain")?,
            cloudiness: row.try_get("cloudiness")?,
            description: row.try_get("description")?,
            condition_type: row.try_get("condition_type")?,
            risk_level,
            timestamp: row.try_get("timestamp")?,
            city: row.try_get("city")?,
            location: row.try_get("location")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_index_mapping() {
        assert_eq!(RiskLevel::from_index(0), Some(RiskLevel::Safe));
        assert_eq!(RiskLevel::from_index(1), Some(RiskLevel::Danger));
        assert_eq!(RiskLevel::from_index(2), Some(RiskLevel::Alert));
        assert_eq!(RiskLevel::from_index(3), None);
    }

    #[test]
    fn test_risk_level_wire_names() {
        assert_eq!(serde_json::to_value(RiskLevel::Safe).unwrap(), "Aman");
        assert_eq!("Waspada".parse::<RiskLevel>().unwrap(), RiskLevel::Alert);
        assert!("Safe".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn test_result_serializes_flat_with_single_tag() {
        let result = ClassificationResult {
            temperature: 30.0,
            humidity: 70.0,
            pressure: 1010.0,
            wind_speed: 5.0,
            wind_direction: 180.0,
            rain: 0.0,
            cloudiness: 40.0,
            description: "clear sky".to_string(),
            condition_type: "Clear".to_string(),
            risk_level: RiskLevel::Safe,
            timestamp: Utc::now(),
            city: None,
            location: Some("cendana".to_string()),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["risk_level"], "Aman");
        assert_eq!(json["location"], "cendana");
        assert!(json.get("city").is_none());
    }
}
