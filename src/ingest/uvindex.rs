/// SSM UV index forecast client.
///
/// The authority publishes an hourly UV curve per location and day at
/// `/api/uvindex/{label}`. The label is the authority's own place name,
/// e.g. "Sverige (Göteborg)", and must be percent-encoded in the path.

use serde::Deserialize;

use crate::ingest::{Endpoints, parse_json};
use crate::logging::{self, DataSource};
use crate::model::{SsmError, UvReading};
use crate::stations::UvLocation;
use crate::transport::HttpTransport;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UvIndexResponse {
    pub response: UvResponseBody,
}

#[derive(Debug, Deserialize)]
pub struct UvResponseBody {
    pub location: UvLocationData,
}

#[derive(Debug, Deserialize)]
pub struct UvLocationData {
    /// `date[0]` is today, `date[1]` (when present) is tomorrow.
    pub date: Vec<UvDay>,
}

/// Fields are optional so that a sparse "tomorrow" entry does not fail the
/// whole response; today's fields are checked in `parse_uvindex_response`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UvDay {
    pub hourly_uv_index: Option<Vec<f64>>,
    pub max_uv_index: Option<f64>,
    pub max_uv_index_time: Option<String>,
}

// ============================================================================
// API Client Functions
// ============================================================================

pub fn build_uvindex_url(endpoints: &Endpoints, api_name: &str, offset: &str) -> String {
    format!(
        "{}/api/uvindex/{}?offset={}",
        endpoints.authority(),
        urlencoding::encode(api_name),
        offset
    )
}

/// Parses a UV index body into today's reading.
///
/// Any missing key along `response.location.date[0]` is a parse error, as is
/// an empty hourly curve.
pub fn parse_uvindex_response(body: &str, location_id: &str) -> Result<UvReading, SsmError> {
    let response: UvIndexResponse = parse_json(body)?;
    let mut days = response.response.location.date.into_iter();

    let today = days
        .next()
        .ok_or_else(|| SsmError::parse("response.location.date is empty", body))?;
    let max_tomorrow = days.next().and_then(|d| d.max_uv_index);

    let hourly_curve = today
        .hourly_uv_index
        .ok_or_else(|| SsmError::parse("missing date[0].hourlyUvIndex", body))?;
    if hourly_curve.is_empty() {
        return Err(SsmError::parse("date[0].hourlyUvIndex is empty", body));
    }
    let max_value = today
        .max_uv_index
        .ok_or_else(|| SsmError::parse("missing date[0].maxUvIndex", body))?;
    let max_time = today
        .max_uv_index_time
        .ok_or_else(|| SsmError::parse("missing date[0].maxUvIndexTime", body))?;

    Ok(UvReading {
        location_id: location_id.to_string(),
        hourly_curve,
        max_value,
        max_time,
        max_tomorrow,
    })
}

/// Fetch today's UV curve for `location`.
pub fn fetch_uvindex(
    transport: &dyn HttpTransport,
    endpoints: &Endpoints,
    location: &UvLocation,
    offset: &str,
) -> Result<UvReading, SsmError> {
    let url = build_uvindex_url(endpoints, location.api_name, offset);
    logging::debug(
        DataSource::UvIndex,
        Some(location.id),
        &format!("Sending request to UV index API: {}", url),
    );

    let response = transport.get(&url)?.require_ok(&url)?;
    parse_uvindex_response(&response.body, location.id)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day_json(max: f64) -> String {
        let curve: Vec<String> = (0..24).map(|h| format!("{:.1}", h as f64 / 4.0)).collect();
        format!(
            r#"{{"hourlyUvIndex": [{}], "maxUvIndex": {}, "maxUvIndexTime": "2024-07-15T13:00:00"}}"#,
            curve.join(","),
            max
        )
    }

    #[test]
    fn test_url_encodes_label() {
        let url = build_uvindex_url(&Endpoints::default(), "Sverige (Göteborg)", "-2");
        assert_eq!(
            url,
            "https://www.stralsakerhetsmyndigheten.se/api/uvindex/Sverige%20%28G%C3%B6teborg%29?offset=-2"
        );
    }

    #[test]
    fn test_parse_today_and_tomorrow() {
        let body = format!(
            r#"{{"response": {{"location": {{"date": [{}, {}]}}}}}}"#,
            day_json(5.8),
            day_json(6.4)
        );
        let reading = parse_uvindex_response(&body, "sverige-goteborg").unwrap();
        assert_eq!(reading.hourly_curve.len(), 24);
        assert_eq!(reading.hourly_curve[8], 2.0);
        assert_eq!(reading.max_value, 5.8);
        assert_eq!(reading.max_time, "2024-07-15T13:00:00");
        assert_eq!(reading.max_tomorrow, Some(6.4));
    }

    #[test]
    fn test_tomorrow_is_optional() {
        let body = format!(r#"{{"response": {{"location": {{"date": [{}]}}}}}}"#, day_json(1.0));
        let reading = parse_uvindex_response(&body, "sverige-umea").unwrap();
        assert_eq!(reading.max_tomorrow, None);
    }

    #[test]
    fn test_missing_nesting_is_a_parse_error() {
        for body in [
            r#"{}"#,
            r#"{"response": {}}"#,
            r#"{"response": {"location": {}}}"#,
            r#"{"response": {"location": {"date": []}}}"#,
            r#"{"response": {"location": {"date": [{"maxUvIndex": 3.0, "maxUvIndexTime": "2024-07-15T13:00:00"}]}}}"#,
            r#"{"response": {"location": {"date": [{"hourlyUvIndex": [], "maxUvIndex": 3.0, "maxUvIndexTime": "2024-07-15T13:00:00"}]}}}"#,
            r#"{"response": {"location": {"date": [{"hourlyUvIndex": [1.0], "maxUvIndexTime": "2024-07-15T13:00:00"}]}}}"#,
        ] {
            let err = parse_uvindex_response(body, "sverige-umea").unwrap_err();
            assert!(matches!(err, SsmError::Parse { .. }), "body {} gave {:?}", body, err);
        }
    }
}
