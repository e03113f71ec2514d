/// SSM radiation network client.
///
/// Retrieves the dose-rate history for one station from the public map
/// service (karttjanst.ssm.se). The endpoint answers with a bare list of
/// `[timestamp_ms, µSv/h]` pairs for the requested window.

use serde::Deserialize;

use crate::ingest::{Endpoints, parse_json};
use crate::logging::{self, DataSource};
use crate::model::{RadiationSample, SsmError, StationReading};
use crate::timewindow::TimeWindow;
use crate::transport::HttpTransport;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response of `getHistoryForStation`. `values` may be absent or empty when
/// the station has not reported inside the window.
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    pub values: Option<Vec<HistoryPoint>>,
}

/// One `[timestamp_ms, value]` pair.
#[derive(Debug, Deserialize)]
pub struct HistoryPoint(pub f64, pub f64);

// ============================================================================
// API Client Functions
// ============================================================================

pub fn build_history_url(endpoints: &Endpoints, station_id: &str, window: &TimeWindow) -> String {
    format!(
        "{}/data/getHistoryForStation?locationId={}&start={}&end={}",
        endpoints.radiation(),
        station_id,
        window.start_ms(),
        window.end_ms()
    )
}

/// Parses a history body into a reading. An empty sample list is not an
/// error at this layer.
pub fn parse_history_response(
    body: &str,
    station_id: &str,
    window: &TimeWindow,
) -> Result<StationReading, SsmError> {
    let response: HistoryResponse = parse_json(body)?;

    let samples = response
        .values
        .unwrap_or_default()
        .into_iter()
        .map(|HistoryPoint(timestamp, value)| RadiationSample {
            timestamp_ms: timestamp as i64,
            microsieverts_per_hour: value,
        })
        .collect();

    Ok(StationReading {
        station_id: station_id.to_string(),
        window_start_ms: window.start_ms(),
        window_end_ms: window.end_ms(),
        samples,
    })
}

/// Fetch the history for `station_id` over `window`.
pub fn fetch_history(
    transport: &dyn HttpTransport,
    endpoints: &Endpoints,
    station_id: &str,
    window: &TimeWindow,
) -> Result<StationReading, SsmError> {
    let url = build_history_url(endpoints, station_id, window);
    logging::debug(
        DataSource::Radiation,
        Some(station_id),
        &format!("Sending request to radiation API: {}", url),
    );

    let response = transport.get(&url)?.require_ok(&url)?;
    parse_history_response(&response.body, station_id, window)
}

// ============================================================================
// Tests
// ============================================================================
