/// Live checks against the real SSM endpoints
///
/// These make real network requests and depend on the authority's services
/// being up, so they are ignored by default.
///
/// Run with: cargo test --test live_api -- --ignored --test-threads=1

use chrono::Utc;

use ssm_service::config::{ConfigEntry, EntryData};
use ssm_service::ingest::Endpoints;
use ssm_service::ingest::radiation::fetch_history;
use ssm_service::ingest::suntime::{build_calculate_url, calculate_payload, fetch_safe_times};
use ssm_service::ingest::uvindex::fetch_uvindex;
use ssm_service::metrics::{MetricContext, RetryPolicy};
use ssm_service::model::SkinType;
use ssm_service::pipeline::Integration;
use ssm_service::scheduler::refresh_once;
use ssm_service::stations;
use ssm_service::timewindow;
use ssm_service::transport::{ReqwestTransport, SharedTransport, TransportConfig};
use ssm_service::verify;

fn live_transport() -> SharedTransport {
    ReqwestTransport::shared(&TransportConfig::default()).expect("HTTP client should build")
}

#[test]
#[ignore]
fn test_radiation_history_for_goteborg() {
    let transport = live_transport();
    let window = timewindow::radiation_window(Utc::now()).unwrap();

    let reading = fetch_history(transport.as_ref(), &Endpoints::default(), "17", &window)
        .expect("history request should succeed");

    println!("Göteborg: {} samples", reading.samples.len());
    for sample in &reading.samples {
        assert!(sample.microsieverts_per_hour >= 0.0);
        assert!(sample.timestamp_ms >= window.start_ms() - 3_600_000);
    }
}

#[test]
#[ignore]
fn test_uv_curve_for_stockholm() {
    let transport = live_transport();
    let location = stations::resolve_uv_location("sverige-stockholm").unwrap();
    let offset = timewindow::uv_day_offset(Utc::now());

    let reading = fetch_uvindex(transport.as_ref(), &Endpoints::default(), location, offset)
        .expect("UV request should succeed");

    println!("Stockholm max UV {} at {}", reading.max_value, reading.max_time);
    assert!(!reading.hourly_curve.is_empty());
    assert!(reading.max_value >= 0.0);
}

#[test]
#[ignore]
fn test_sun_time_calculation_returns_rows() {
    let transport = live_transport();
    let endpoints = Endpoints::default();
    let now = Utc::now();
    let payload = calculate_payload(
        SkinType::Type2,
        59.32893,
        &timewindow::local_date_string(now),
        timewindow::local_hour(now),
    );

    let url = build_calculate_url(&endpoints);
    let rows = fetch_safe_times(transport.as_ref(), &url, &payload, "sverige-stockholm")
        .expect("sun time request should succeed");
    println!("{} safe time rows", rows.len());
}

#[test]
#[ignore]
fn test_validate_entry_against_live_endpoints() {
    let transport = live_transport();
    let data = EntryData {
        station: Some("17".into()),
        location: Some("sverige-goteborg".into()),
        ..EntryData::default()
    };
    verify::validate_entry(transport.as_ref(), &Endpoints::default(), &data)
        .expect("validation probes should answer 200");
}

#[test]
#[ignore]
fn test_full_entry_refresh() {
    let context = MetricContext {
        transport: live_transport(),
        endpoints: Endpoints::default(),
        retry: RetryPolicy::default(),
    };
    let mut integration = Integration::new(context);
    integration
        .setup_entry(ConfigEntry::with_id(
            "live",
            EntryData {
                name: "Live".into(),
                station: Some("17".into()),
                location: Some("sverige-goteborg".into()),
                skin_type: Some("3".into()),
            },
        ))
        .unwrap();

    let summary = refresh_once(&integration, Utc::now());
    println!("{:?}", summary);
    for snapshot in integration.snapshots() {
        println!(
            "{} available={} value={:?}",
            snapshot.unique_id, snapshot.available, snapshot.native_value
        );
    }
    assert_eq!(summary.total, 3);

    for metric in integration.metrics() {
        let guard = metric.lock().unwrap();
        if guard.unique_id().ends_with("_uv_index") {
            assert!(guard.is_available(), "UV index should refresh against the live API");
        }
    }
}
