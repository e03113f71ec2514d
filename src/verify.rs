//! Data Source Verification Module
//!
//! Checks configured selections and the static registries against the live
//! SSM endpoints. `validate_entry` is the quick connectivity check run before
//! an entry is accepted; `run_full_verification` walks every registered
//! station and UV location and reports which ones currently return data.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::config::EntryData;
use crate::ingest::Endpoints;
use crate::ingest::radiation::{build_history_url, fetch_history};
use crate::ingest::uvindex::{build_uvindex_url, fetch_uvindex};
use crate::logging::{self, DataSource};
use crate::model::SsmError;
use crate::stations::{self, STATION_REGISTRY, UV_LOCATIONS, UvLocation};
use crate::timewindow::{self, TimeWindow};
use crate::transport::HttpTransport;

// ============================================================================
// Entry validation
// ============================================================================

/// Offset the UV probe asks for; any valid offset proves the label resolves.
const UV_PROBE_OFFSET: &str = "-1";

/// The smallest window the history endpoint accepts.
fn probe_window() -> TimeWindow {
    TimeWindow {
        start: DateTime::<Utc>::UNIX_EPOCH,
        end: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(1),
    }
}

fn probe(transport: &dyn HttpTransport, url: &str) -> Result<(), SsmError> {
    transport.get(url)?.require_ok(url).map(|_| ())
}

/// Confirms the selected station and UV location answer with HTTP 200.
///
/// Only fields that are set are probed. Unknown ids fail before any request.
pub fn validate_entry(
    transport: &dyn HttpTransport,
    endpoints: &Endpoints,
    data: &EntryData,
) -> Result<(), SsmError> {
    if let Some(station) = data.station.as_deref().filter(|s| !s.is_empty()) {
        let station = stations::resolve_station(station)?;
        let url = build_history_url(endpoints, station.id, &probe_window());
        probe(transport, &url).inspect_err(|e| {
            logging::error(
                DataSource::Radiation,
                Some(station.id),
                &logging::failure_message("Validating radiation API", e),
            )
        })?;
    }

    if let Some(location) = data.location.as_deref().filter(|l| !l.is_empty()) {
        let location = stations::resolve_uv_location(location)?;
        let url = build_uvindex_url(endpoints, location.api_name, UV_PROBE_OFFSET);
        probe(transport, &url).inspect_err(|e| {
            logging::error(
                DataSource::UvIndex,
                Some(location.id),
                &logging::failure_message("Validating UV index API", e),
            )
        })?;
    }

    Ok(())
}

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationVerification {
    pub station_id: String,
    pub name: String,
    pub status: VerificationStatus,
    pub sample_data_count: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationVerification {
    pub location_id: String,
    pub api_name: String,
    pub status: VerificationStatus,
    pub hourly_values: usize,
    pub max_uv_today: Option<f64>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationSummary {
    pub stations_total: usize,
    pub stations_working: usize,
    pub stations_failed: usize,
    pub locations_total: usize,
    pub locations_working: usize,
    pub locations_failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub station_results: Vec<StationVerification>,
    pub location_results: Vec<LocationVerification>,
    pub summary: VerificationSummary,
}

// ============================================================================
// Single-source checks
// ============================================================================

pub fn verify_station(
    transport: &dyn HttpTransport,
    endpoints: &Endpoints,
    station_id: &str,
    name: &str,
    window: &TimeWindow,
) -> StationVerification {
    let mut result = StationVerification {
        station_id: station_id.to_string(),
        name: name.to_string(),
        status: VerificationStatus::Failed,
        sample_data_count: 0,
        error_message: None,
    };

    match fetch_history(transport, endpoints, station_id, window) {
        Ok(reading) => {
            result.sample_data_count = reading.samples.len();
            // A 200 without samples means the station is known but silent.
            result.status = if reading.samples.is_empty() {
                VerificationStatus::PartialSuccess
            } else {
                VerificationStatus::Success
            };
        }
        Err(e) => result.error_message = Some(e.to_string()),
    }

    result
}

pub fn verify_location(
    transport: &dyn HttpTransport,
    endpoints: &Endpoints,
    location: &UvLocation,
    offset: &str,
) -> LocationVerification {
    let mut result = LocationVerification {
        location_id: location.id.to_string(),
        api_name: location.api_name.to_string(),
        status: VerificationStatus::Failed,
        hourly_values: 0,
        max_uv_today: None,
        error_message: None,
    };

    match fetch_uvindex(transport, endpoints, location, offset) {
        Ok(reading) => {
            result.hourly_values = reading.hourly_curve.len();
            result.max_uv_today = Some(reading.max_value);
            result.status = if reading.hourly_curve.len() >= 24 {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => result.error_message = Some(e.to_string()),
    }

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

fn status_line(status: &VerificationStatus, detail: &str, error: Option<&str>) -> String {
    match status {
        VerificationStatus::Success => format!("OK ({})", detail),
        VerificationStatus::PartialSuccess => format!("PARTIAL ({})", detail),
        VerificationStatus::Failed => format!("FAILED: {}", error.unwrap_or("Unknown")),
    }
}

/// Probes every registered station and UV location as of `now`.
pub fn run_full_verification(
    transport: &dyn HttpTransport,
    endpoints: &Endpoints,
    now: DateTime<Utc>,
) -> Result<VerificationReport, SsmError> {
    let window = timewindow::radiation_window(now)?;
    let offset = timewindow::uv_day_offset(now);
    let mut summary = VerificationSummary::default();

    println!("Verifying radiation stations...");
    let mut station_results = Vec::with_capacity(STATION_REGISTRY.len());
    for station in STATION_REGISTRY {
        let result = verify_station(transport, endpoints, station.id, station.name, &window);
        println!(
            "  {:>3} {:<28} {}",
            station.id,
            station.name,
            status_line(
                &result.status,
                &format!("{} samples", result.sample_data_count),
                result.error_message.as_deref()
            )
        );
        summary.stations_total += 1;
        if result.status == VerificationStatus::Failed {
            summary.stations_failed += 1;
        } else {
            summary.stations_working += 1;
        }
        station_results.push(result);
    }

    println!("\nVerifying UV locations...");
    let mut location_results = Vec::with_capacity(UV_LOCATIONS.len());
    for location in UV_LOCATIONS {
        let result = verify_location(transport, endpoints, location, offset);
        println!(
            "  {:<24} {}",
            location.id,
            status_line(
                &result.status,
                &format!("{} hourly values", result.hourly_values),
                result.error_message.as_deref()
            )
        );
        summary.locations_total += 1;
        if result.status == VerificationStatus::Failed {
            summary.locations_failed += 1;
        } else {
            summary.locations_working += 1;
        }
        location_results.push(result);
    }

    Ok(VerificationReport {
        timestamp: now.to_rfc3339(),
        station_results,
        location_results,
        summary,
    })
}

pub fn print_summary(report: &VerificationReport) {
    let s = &report.summary;
    println!("\n===========================================================");
    println!("VERIFICATION SUMMARY ({})", report.timestamp);
    println!("===========================================================");
    println!(
        "Radiation stations: {}/{} working  ({} failed)",
        s.stations_working, s.stations_total, s.stations_failed
    );
    println!(
        "UV locations:       {}/{} working  ({} failed)",
        s.locations_working, s.locations_total, s.locations_failed
    );

    let total_working = s.stations_working + s.locations_working;
    let total = s.stations_total + s.locations_total;
    let success_rate = if total > 0 {
        (total_working as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    println!("Overall Success Rate: {:.1}% ({}/{})", success_rate, total_working, total);
    println!("===========================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use std::sync::Mutex;

    /// Answers every GET with a fixed status and records the URLs.
    struct FixedStatus {
        status: u16,
        body: &'static str,
        urls: Mutex<Vec<String>>,
    }

    impl FixedStatus {
        fn new(status: u16, body: &'static str) -> Self {
            Self { status, body, urls: Mutex::new(Vec::new()) }
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl HttpTransport for FixedStatus {
        fn get(&self, url: &str) -> Result<HttpResponse, SsmError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(HttpResponse { status: self.status, body: self.body.to_string() })
        }

        fn post_json(
            &self,
            url: &str,
            _payload: &serde_json::Value,
        ) -> Result<HttpResponse, SsmError> {
            self.get(url)
        }
    }

    fn data(station: Option<&str>, location: Option<&str>) -> EntryData {
        EntryData {
            station: station.map(String::from),
            location: location.map(String::from),
            ..EntryData::default()
        }
    }

    #[test]
    fn test_validate_probes_both_endpoints() {
        let transport = FixedStatus::new(200, "{}");
        let goteborg = data(Some("17"), Some("sverige-goteborg"));
        validate_entry(&transport, &Endpoints::default(), &goteborg).unwrap();
        assert_eq!(
            transport.urls(),
            vec![
                "https://karttjanst.ssm.se/data/getHistoryForStation?locationId=17&start=0&end=1",
                "https://www.stralsakerhetsmyndigheten.se/api/uvindex/Sverige%20%28G%C3%B6teborg%29?offset=-1",
            ]
        );
    }

    #[test]
    fn test_validate_fails_on_non_200() {
        let transport = FixedStatus::new(503, "down");
        let err =
            validate_entry(&transport, &Endpoints::default(), &data(Some("17"), None)).unwrap_err();
        assert!(matches!(err, SsmError::HttpStatus { status: 503, .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_ids_without_requests() {
        let transport = FixedStatus::new(200, "{}");
        let unknown = data(None, Some("atlantis"));
        assert!(validate_entry(&transport, &Endpoints::default(), &unknown).is_err());
        assert!(transport.urls().is_empty());
    }

    #[test]
    fn test_station_without_samples_is_partial() {
        let transport = FixedStatus::new(200, r#"{"values": []}"#);
        let window = probe_window();
        let result = verify_station(&transport, &Endpoints::default(), "17", "Göteborg", &window);
        assert_eq!(result.status, VerificationStatus::PartialSuccess);
        assert_eq!(result.sample_data_count, 0);
    }
}
