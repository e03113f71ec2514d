/// Core data types for the SSM radiation and UV monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O, only types and the error taxonomy every fetch
/// and derivation step reports through.

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Unit reported by the radiation metric (converted from µSv/h).
pub const UNIT_NANOSIEVERT_PER_HOUR: &str = "nSv/h";

/// Unit reported by the UV index metric.
pub const UNIT_UV_INDEX: &str = "UV";

/// Unit reported by the safe sun time metric.
pub const UNIT_MINUTES: &str = "minutes";

// ---------------------------------------------------------------------------
// Radiation
// ---------------------------------------------------------------------------

/// One `[timestamp, value]` pair from the radiation history endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationSample {
    pub timestamp_ms: i64,
    /// Dose rate in µSv/h, as published.
    pub microsieverts_per_hour: f64,
}

/// A time-bounded history for one station.
///
/// A reading with an empty `samples` list is not valid for derivation;
/// the radiation metric marks itself unavailable instead.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub station_id: String,
    pub window_start_ms: i64,
    pub window_end_ms: i64,
    pub samples: Vec<RadiationSample>,
}

/// Derived dose-rate figures, all in nSv/h rounded to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RadiationSummary {
    pub latest: i64,
    pub min: i64,
    pub max: i64,
    pub avg: i64,
    pub sample_count: usize,
}

// ---------------------------------------------------------------------------
// UV index
// ---------------------------------------------------------------------------

/// The day curve published for a UV location.
#[derive(Debug, Clone, PartialEq)]
pub struct UvReading {
    pub location_id: String,
    /// Hourly values, index 0 = 00:00 local time. 24 entries when complete.
    pub hourly_curve: Vec<f64>,
    pub max_value: f64,
    /// Raw `YYYY-MM-DDTHH:MM:SS` string as published.
    pub max_time: String,
    /// Tomorrow's maximum, when the response carries a second day.
    pub max_tomorrow: Option<f64>,
}

/// UV risk levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UvRiskLevel {
    None,
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvRiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            UvRiskLevel::None => "none",
            UvRiskLevel::Low => "low",
            UvRiskLevel::Moderate => "moderate",
            UvRiskLevel::High => "high",
            UvRiskLevel::VeryHigh => "very_high",
            UvRiskLevel::Extreme => "extreme",
        }
    }
}

impl std::fmt::Display for UvRiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the exported hourly forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyUv {
    pub hour: u32,
    pub uv_index: f64,
}

/// Everything the UV index metric derives from one reading.
///
/// This is also the read surface the safe sun time metric polls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UvIndexAttributes {
    pub current_uv: Option<f64>,
    pub max_uv_today: f64,
    /// `HH:MM`, or `None` when the published time could not be parsed.
    pub max_uv_time: Option<String>,
    pub max_uv_tomorrow: Option<f64>,
    pub risk_level: UvRiskLevel,
    pub hourly_forecast: Vec<HourlyUv>,
}

// ---------------------------------------------------------------------------
// Safe sun time
// ---------------------------------------------------------------------------

/// Fitzpatrick skin type, sent to the authority as `skintypeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SkinType {
    Type1,
    Type2,
    Type3,
    Type4,
    Type5,
    Type6,
}

impl SkinType {
    pub const ALL: [SkinType; 6] = [
        SkinType::Type1,
        SkinType::Type2,
        SkinType::Type3,
        SkinType::Type4,
        SkinType::Type5,
        SkinType::Type6,
    ];

    /// Numeric id used by the authority API (1-6).
    pub fn id(self) -> u8 {
        match self {
            SkinType::Type1 => 1,
            SkinType::Type2 => 2,
            SkinType::Type3 => 3,
            SkinType::Type4 => 4,
            SkinType::Type5 => 5,
            SkinType::Type6 => 6,
        }
    }

    /// Parses the configuration value ("1".."6").
    pub fn from_id(id: &str) -> Result<SkinType, SsmError> {
        let n: u8 = id
            .trim()
            .parse()
            .map_err(|_| SsmError::InvalidSkinType(id.to_string()))?;
        SkinType::ALL
            .into_iter()
            .find(|s| s.id() == n)
            .ok_or_else(|| SsmError::InvalidSkinType(id.to_string()))
    }
}

/// The three exposure conditions the authority computes safe time for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadeCategory {
    DirectSun,
    PartialShade,
    FullShade,
}

impl ShadeCategory {
    pub const ALL: [ShadeCategory; 3] = [
        ShadeCategory::DirectSun,
        ShadeCategory::PartialShade,
        ShadeCategory::FullShade,
    ];

    /// Lower-case phrase the authority uses in `shadowDescription`.
    pub fn phrase(self) -> &'static str {
        match self {
            ShadeCategory::DirectSun => "direkt solljus",
            ShadeCategory::PartialShade => "lite skugga",
            ShadeCategory::FullShade => "mycket skugga",
        }
    }
}

/// Safe exposure minutes per shade category. Unmatched categories stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SafeTimes {
    pub direct_sun: Option<f64>,
    pub partial_shade: Option<f64>,
    pub full_shade: Option<f64>,
}

impl SafeTimes {
    pub fn get(&self, category: ShadeCategory) -> Option<f64> {
        match category {
            ShadeCategory::DirectSun => self.direct_sun,
            ShadeCategory::PartialShade => self.partial_shade,
            ShadeCategory::FullShade => self.full_shade,
        }
    }

    pub fn slot_mut(&mut self, category: ShadeCategory) -> &mut Option<f64> {
        match category {
            ShadeCategory::DirectSun => &mut self.direct_sun,
            ShadeCategory::PartialShade => &mut self.partial_shade,
            ShadeCategory::FullShade => &mut self.full_shade,
        }
    }

    pub fn is_empty(&self) -> bool {
        ShadeCategory::ALL.iter().all(|c| self.get(*c).is_none())
    }
}

/// Primary safe times plus the refinement computed from the UV index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SafeTimeResult {
    pub primary: SafeTimes,
    /// All `None` when the refinement was skipped or failed this cycle.
    pub refined: SafeTimes,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or deriving SSM data.
///
/// A dependency that is not ready yet is not an error; the retry loop
/// reports it as `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SsmError {
    /// Timeout, DNS failure, connection reset.
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
    /// Non-200 HTTP response.
    #[error("HTTP error {status} from {url}")]
    HttpStatus { url: String, status: u16, body: String },
    /// The response body did not have the expected shape.
    #[error("Parse error: {message}")]
    Parse { message: String, body: String },
    /// A well-formed response without any usable values.
    #[error("No data available for {0}")]
    NoData(String),
    #[error("Unknown radiation station id: {0}")]
    UnknownStation(String),
    #[error("Unknown UV location id: {0}")]
    UnknownLocation(String),
    #[error("Invalid skin type: {0}")]
    InvalidSkinType(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl SsmError {
    /// Builds a parse error, keeping the raw body for diagnostics.
    pub fn parse(message: impl Into<String>, body: &str) -> SsmError {
        SsmError::Parse {
            message: message.into(),
            body: body.to_string(),
        }
    }

    /// The raw response body attached to this error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            SsmError::HttpStatus { body, .. } | SsmError::Parse { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SsmError {
    fn from(err: std::io::Error) -> Self {
        SsmError::Io(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_type_parses_all_ids() {
        for (i, skin) in SkinType::ALL.iter().enumerate() {
            let id = (i + 1).to_string();
            assert_eq!(SkinType::from_id(&id), Ok(*skin));
        }
    }

    #[test]
    fn test_skin_type_rejects_out_of_range() {
        assert!(SkinType::from_id("0").is_err());
        assert!(SkinType::from_id("7").is_err());
        assert!(SkinType::from_id("fair").is_err());
    }

    #[test]
    fn test_risk_levels_are_ordered() {
        assert!(UvRiskLevel::None < UvRiskLevel::Low);
        assert!(UvRiskLevel::Low < UvRiskLevel::Moderate);
        assert!(UvRiskLevel::High < UvRiskLevel::VeryHigh);
        assert!(UvRiskLevel::VeryHigh < UvRiskLevel::Extreme);
        assert_eq!(UvRiskLevel::VeryHigh.to_string(), "very_high");
    }

    #[test]
    fn test_safe_times_slots_follow_category() {
        let mut times = SafeTimes::default();
        assert!(times.is_empty());
        *times.slot_mut(ShadeCategory::PartialShade) = Some(45.0);
        assert_eq!(times.partial_shade, Some(45.0));
        assert_eq!(times.get(ShadeCategory::PartialShade), Some(45.0));
        assert!(!times.is_empty());
    }

    #[test]
    fn test_error_body_is_kept_for_http_and_parse() {
        let err = SsmError::HttpStatus {
            url: "https://example".into(),
            status: 503,
            body: "down".into(),
        };
        assert_eq!(err.body(), Some("down"));
        assert_eq!(err.to_string(), "HTTP error 503 from https://example");
        assert_eq!(SsmError::NoData("20".into()).body(), None);
    }
}
