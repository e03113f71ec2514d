/// SSM "Min soltid" (safe sun time) client.
///
/// Two calculations share one response shape:
///   - `suntime/calculate` from skin type, latitude, date and hour
///   - `suntime/calculatewithindex` from skin type and a UV index
///
/// Both answer with an unordered list of shade descriptions and minutes;
/// see `analysis::shade` for how those are matched to categories.

use serde::Deserialize;
use serde_json::json;

use crate::ingest::{Endpoints, parse_json};
use crate::logging::{self, DataSource};
use crate::model::{SkinType, SsmError};
use crate::transport::HttpTransport;

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SafeTimeResponse {
    pub result: Option<SafeTimeResultBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTimeResultBody {
    pub safe_time_results: Option<Vec<SafeTimeEntry>>,
}

/// One row of `safeTimeResults`, e.g.
/// `{"shadowDescription": "Direkt solljus", "safeTime": 25}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTimeEntry {
    #[serde(default)]
    pub shadow_description: Option<String>,
    #[serde(default)]
    pub safe_time: Option<f64>,
}

// ============================================================================
// Requests
// ============================================================================

pub fn build_calculate_url(endpoints: &Endpoints) -> String {
    format!("{}/api/v1/suntime/calculate", endpoints.authority())
}

pub fn build_calculate_with_index_url(endpoints: &Endpoints) -> String {
    format!("{}/api/v1/suntime/calculatewithindex", endpoints.authority())
}

/// Payload for `suntime/calculate`. The authority expects every value as a
/// string.
pub fn calculate_payload(
    skin: SkinType,
    latitude: f64,
    date: &str,
    hour: u32,
) -> serde_json::Value {
    json!({
        "skintypeId": skin.id().to_string(),
        "latitude": latitude.to_string(),
        "dateStr": date,
        "hour": hour.to_string(),
    })
}

/// Payload for `suntime/calculatewithindex`.
pub fn calculate_with_index_payload(skin: SkinType, uv_index: i64) -> serde_json::Value {
    json!({
        "skintypeId": skin.id().to_string(),
        "uvIndex": uv_index.to_string(),
    })
}

/// Extracts `result.safeTimeResults`. A body without that path is malformed;
/// an empty list is valid.
pub fn parse_safe_time_response(body: &str) -> Result<Vec<SafeTimeEntry>, SsmError> {
    let response: SafeTimeResponse = parse_json(body)?;
    response
        .result
        .and_then(|r| r.safe_time_results)
        .ok_or_else(|| SsmError::parse("missing result.safeTimeResults", body))
}

/// POST a calculation request and parse its safe time rows.
pub fn fetch_safe_times(
    transport: &dyn HttpTransport,
    url: &str,
    payload: &serde_json::Value,
    location_id: &str,
) -> Result<Vec<SafeTimeEntry>, SsmError> {
    logging::debug(
        DataSource::SunTime,
        Some(location_id),
        &format!("Sending request to sun time API {}: {}", url, payload),
    );

    let response = transport.post_json(url, payload)?.require_ok(url)?;
    parse_safe_time_response(&response.body)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_payload_uses_strings() {
        let payload = calculate_payload(SkinType::Type2, 62.0, "2024-07-15", 14);
        assert_eq!(
            payload,
            json!({"skintypeId": "2", "latitude": "62", "dateStr": "2024-07-15", "hour": "14"})
        );
    }

    #[test]
    fn test_with_index_payload() {
        let payload = calculate_with_index_payload(SkinType::Type5, 7);
        assert_eq!(payload, json!({"skintypeId": "5", "uvIndex": "7"}));
    }

    #[test]
    fn test_urls_share_the_authority_host() {
        let endpoints = Endpoints::default();
        assert_eq!(
            build_calculate_url(&endpoints),
            "https://www.stralsakerhetsmyndigheten.se/api/v1/suntime/calculate"
        );
        assert_eq!(
            build_calculate_with_index_url(&endpoints),
            "https://www.stralsakerhetsmyndigheten.se/api/v1/suntime/calculatewithindex"
        );
    }

    #[test]
    fn test_parse_rows_tolerates_missing_fields() {
        let body = r#"{"result": {"safeTimeResults": [
            {"shadowDescription": "Direkt solljus", "safeTime": 20},
            {"safeTime": 5},
            {"shadowDescription": "Lite skugga"}
        ]}}"#;
        let rows = parse_safe_time_response(body).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].safe_time, Some(20.0));
        assert_eq!(rows[1].shadow_description, None);
        assert_eq!(rows[2].safe_time, None);
    }

    #[test]
    fn test_missing_result_is_malformed() {
        assert!(parse_safe_time_response(r#"{"status": "ok"}"#).is_err());
        assert!(parse_safe_time_response(r#"{"result": {}}"#).is_err());
        assert_eq!(parse_safe_time_response(r#"{"result": {"safeTimeResults": []}}"#), Ok(vec![]));
    }
}
