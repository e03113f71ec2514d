//! UV index risk classification and display helpers.
//!
//! One set of thresholds drives both the risk level (applied to the day's
//! maximum) and the icon tier (applied to the current value):
//!   >= 11 extreme, >= 8 very high, >= 6 high, >= 3 moderate, > 0 low.

use chrono::NaiveDateTime;

use crate::model::{HourlyUv, SsmError, UvRiskLevel};

/// Classifies a UV index value. Total over all inputs: negative values and
/// NaN map to `None`.
pub fn classify_uv_risk(uv_index: f64) -> UvRiskLevel {
    if uv_index >= 11.0 {
        UvRiskLevel::Extreme
    } else if uv_index >= 8.0 {
        UvRiskLevel::VeryHigh
    } else if uv_index >= 6.0 {
        UvRiskLevel::High
    } else if uv_index >= 3.0 {
        UvRiskLevel::Moderate
    } else if uv_index > 0.0 {
        UvRiskLevel::Low
    } else {
        UvRiskLevel::None
    }
}

/// Material Design icon for a UV value, by risk tier.
pub fn uv_icon(uv_index: f64) -> &'static str {
    match classify_uv_risk(uv_index) {
        UvRiskLevel::Extreme => "mdi:fire",
        UvRiskLevel::VeryHigh => "mdi:weather-sunny-alert",
        UvRiskLevel::High => "mdi:weather-sunny",
        UvRiskLevel::Moderate => "mdi:weather-partly-cloudy",
        UvRiskLevel::Low => "mdi:weather-sunny-off",
        UvRiskLevel::None => "mdi:weather-night",
    }
}

/// Value of the curve at `hour`, and whether the hour had to be clamped
/// because the curve is shorter than a full day.
pub fn value_at_hour(curve: &[f64], hour: u32) -> Option<(f64, bool)> {
    let idx = hour as usize;
    match curve.get(idx) {
        Some(v) => Some((*v, false)),
        None => curve.last().map(|v| (*v, true)),
    }
}

/// Reformats `YYYY-MM-DDTHH:MM:SS` as `HH:MM`.
pub fn format_max_time(raw: &str) -> Result<String, SsmError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|dt| dt.format("%H:%M").to_string())
        .map_err(|e| SsmError::parse(format!("invalid maxUvIndexTime: {}", e), raw))
}

/// The curve as `{hour, uv_index}` entries.
pub fn hourly_forecast(curve: &[f64]) -> Vec<HourlyUv> {
    curve
        .iter()
        .enumerate()
        .map(|(hour, uv)| HourlyUv {
            hour: hour as u32,
            uv_index: *uv,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_has_no_gaps() {
        let cases = [
            (-1.0, UvRiskLevel::None),
            (0.0, UvRiskLevel::None),
            (0.5, UvRiskLevel::Low),
            (3.0, UvRiskLevel::Moderate),
            (6.0, UvRiskLevel::High),
            (8.0, UvRiskLevel::VeryHigh),
            (11.0, UvRiskLevel::Extreme),
            (50.0, UvRiskLevel::Extreme),
        ];
        for (input, expected) in cases {
            assert_eq!(classify_uv_risk(input), expected, "uv index {}", input);
        }
    }

    #[test]
    fn test_boundaries_just_below_thresholds() {
        assert_eq!(classify_uv_risk(2.99), UvRiskLevel::Low);
        assert_eq!(classify_uv_risk(5.99), UvRiskLevel::Moderate);
        assert_eq!(classify_uv_risk(7.99), UvRiskLevel::High);
        assert_eq!(classify_uv_risk(10.99), UvRiskLevel::VeryHigh);
        assert_eq!(classify_uv_risk(f64::NAN), UvRiskLevel::None);
    }

    #[test]
    fn test_icons_follow_tiers() {
        assert_eq!(uv_icon(0.0), "mdi:weather-night");
        assert_eq!(uv_icon(1.2), "mdi:weather-sunny-off");
        assert_eq!(uv_icon(4.0), "mdi:weather-partly-cloudy");
        assert_eq!(uv_icon(6.5), "mdi:weather-sunny");
        assert_eq!(uv_icon(9.0), "mdi:weather-sunny-alert");
        assert_eq!(uv_icon(12.0), "mdi:fire");
    }

    #[test]
    fn test_value_at_hour_clamps_short_curves() {
        let curve = [0.0, 0.5, 1.5];
        assert_eq!(value_at_hour(&curve, 1), Some((0.5, false)));
        assert_eq!(value_at_hour(&curve, 13), Some((1.5, true)));
        assert_eq!(value_at_hour(&[], 13), None);
    }

    #[test]
    fn test_format_max_time() {
        assert_eq!(format_max_time("2024-07-15T13:00:00").unwrap(), "13:00");
        assert_eq!(format_max_time("2024-07-15T09:45:30").unwrap(), "09:45");
        assert!(format_max_time("13:00").is_err());
        assert!(format_max_time("").is_err());
    }

    #[test]
    fn test_hourly_forecast_numbers_hours() {
        let forecast = hourly_forecast(&[0.0, 0.3, 1.1]);
        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast[2], HourlyUv { hour: 2, uv_index: 1.1 });
    }
}
