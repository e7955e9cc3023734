//! Feature Vector - classifier input built from one observation
//!
//! The layout below is the input contract of the trained model. Changing
//! the order of `FEATURE_LAYOUT` or of either category list requires a
//! retrained model.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Observation;
use super::classifier::ClassifyError;

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    "temperature",
    "humidity",
    "pressure",
    "wind_speed",
    "wind_direction",
    "rain",
    "cloudiness",
    "description",     // ordinal of WeatherDescription
    "condition_type",  // ordinal of ConditionType
];

/// Total number of features
pub const FEATURE_COUNT: usize = FEATURE_LAYOUT.len();

// ============================================================================
// CATEGORIES
// ============================================================================

/// Weather descriptions seen during training, in ordinal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherDescription {
    BrokenClouds,
    ScatteredClouds,
    FewClouds,
    OvercastClouds,
    LightRain,
    ClearSky,
    ModerateRain,
}

impl WeatherDescription {
    pub const ALL: [WeatherDescription; 7] = [
        WeatherDescription::BrokenClouds,
        WeatherDescription::ScatteredClouds,
        WeatherDescription::FewClouds,
        WeatherDescription::OvercastClouds,
        WeatherDescription::LightRain,
        WeatherDescription::ClearSky,
        WeatherDescription::ModerateRain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherDescription::BrokenClouds => "broken clouds",
            WeatherDescription::ScatteredClouds => "scattered clouds",
            WeatherDescription::FewClouds => "few clouds",
            WeatherDescription::OvercastClouds => "overcast clouds",
            WeatherDescription::LightRain => "light rain",
            WeatherDescription::ClearSky => "clear sky",
            WeatherDescription::ModerateRain => "moderate rain",
        }
    }

    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl FromStr for WeatherDescription {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ClassifyError::UnknownCategory {
                field: "description",
                value: s.to_string(),
            })
    }
}

/// Condition categories seen during training, in ordinal order.
///
/// The crawler lowercases `rain` and keeps the provider's casing otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionType {
    Clouds,
    Rain,
    Clear,
}

impl ConditionType {
    pub const ALL: [ConditionType; 3] = [ConditionType::Clouds, ConditionType::Rain, ConditionType::Clear];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::Clouds => "Clouds",
            ConditionType::Rain => "rain",
            ConditionType::Clear => "Clear",
        }
    }

    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl FromStr for ConditionType {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ClassifyError::UnknownCategory {
                field: "condition_type",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build the model input for an observation.
    ///
    /// Fails with `UnknownCategory` when either category is outside the
    /// trained enumeration.
    pub fn from_observation(obs: &Observation) -> Result<Self, ClassifyError> {
        let description: WeatherDescription = obs.description.parse()?;
        let condition: ConditionType = obs.condition_type.parse()?;

        Ok(Self::from_values([
            obs.temperature as f32,
            obs.humidity as f32,
            obs.pressure as f32,
            obs.wind_speed as f32,
            obs.wind_direction as f32,
            obs.rain as f32,
            obs.cloudiness as f32,
            description.ordinal() as f32,
            condition.ordinal() as f32,
        ]))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
