//! Stream keys - mapping between a monitored stream and its collections

use std::fmt;

use crate::constants::{
    AGGREGATE_CITY, FORECAST_PREFIX, GENERAL_SOURCE, GENERAL_STREAM, LOCATIONS, PREDICT_PREFIX,
};
use super::ClassificationResult;

/// One independently deduplicated stream: the city aggregate or a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKey {
    General,
    Location(String),
}

impl StreamKey {
    /// The aggregate stream followed by every configured location
    pub fn all() -> Vec<StreamKey> {
        std::iter::once(StreamKey::General)
            .chain(LOCATIONS.iter().map(|slug| StreamKey::Location(slug.to_string())))
            .collect()
    }

    pub fn name(&self) -> &str {
        match self {
            StreamKey::General => GENERAL_STREAM,
            StreamKey::Location(slug) => slug,
        }
    }

    /// Collection holding the raw observations
    pub fn source_collection(&self) -> &str {
        match self {
            StreamKey::General => GENERAL_SOURCE,
            StreamKey::Location(slug) => slug,
        }
    }

    /// `predict_<name>`
    pub fn output_stream(&self) -> String {
        format!("{}{}", PREDICT_PREFIX, self.name())
    }

    /// Attach the identifying tag for this stream
    pub fn tag(&self, result: &mut ClassificationResult) {
        match self {
            StreamKey::General => result.city = Some(AGGREGATE_CITY.to_string()),
            StreamKey::Location(slug) => result.location = Some(slug.clone()),
        }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `forecast_<slug>`
pub fn forecast_collection(slug: &str) -> String {
    format!("{}{}", FORECAST_PREFIX, slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        let general = StreamKey::General;
        assert_eq!(general.source_collection(), "weather_data");
        assert_eq!(general.output_stream(), "predict_general");

        let loc = StreamKey::Location("antasari".to_string());
        assert_eq!(loc.source_collection(), "antasari");
        assert_eq!(loc.output_stream(), "predict_antasari");
        assert_eq!(forecast_collection("antasari"), "forecast_antasari");
    }

    #[test]
    fn test_all_streams_start_with_general() {
        let all = StreamKey::all();
        assert_eq!(all.len(), LOCATIONS.len() + 1);
        assert_eq!(all[0], StreamKey::General);
    }
}
