//! Fixed deployment constants

/// Monitored locations in Samarinda. Each slug names its raw observation
/// collection, its `forecast_<slug>` collection and its `predict_<slug>` stream.
pub const LOCATIONS: [&str; 17] = [
    "slamet-riyadi",
    "antasari",
    "simpang-agus-salim",
    "mugirejo",
    "simpang-lembuswana",
    "kapten-sudjono",
    "brigjend-katamso",
    "gatot-subroto",
    "cendana",
    "di-panjaitan",
    "damanhuri",
    "pertigaan-pramuka-perjuangan",
    "padat-karya-sempaja-simpang-wanyi",
    "simpang-sempaja",
    "ir-h-juanda",
    "tengkawang",
    "sukorejo",
];

/// City tag attached to the aggregate stream
pub const AGGREGATE_CITY: &str = "Samarinda";

/// Stream name of the city-wide aggregate
pub const GENERAL_STREAM: &str = "general";

/// Raw collection feeding the aggregate stream
pub const GENERAL_SOURCE: &str = "weather_data";

/// Prefix of every classification output stream
pub const PREDICT_PREFIX: &str = "predict_";

/// Prefix of the externally populated forecast collections
pub const FORECAST_PREFIX: &str = "forecast_";

/// Minimum spacing between two stored results of one stream
pub const DEFAULT_MIN_WRITE_INTERVAL_MINUTES: i64 = 30;

pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_CLASSIFY_TIMEOUT_MS: u64 = 2_000;

pub fn is_known_location(slug: &str) -> bool {
    LOCATIONS.contains(&slug)
}
