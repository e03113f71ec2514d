//! The three poll-and-derive units.
//!
//! Each metric owns its state exclusively and exposes `refresh()`, which the
//! scheduler calls on its own interval. A refresh never returns an error:
//! every failure ends at the metric boundary as `RefreshOutcome::Unavailable`
//! plus a log record, and the last good values are kept.
//!
//! The only cross-metric link is the read-only `UvIndexHandle` the sun time
//! metric holds onto the UV index metric's last published attributes.

pub mod radiation;
pub mod sun_time;
pub mod uv_index;

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::ingest::Endpoints;
use crate::model::{RadiationSummary, UvIndexAttributes};
use crate::transport::SharedTransport;

pub use radiation::RadiationMetric;
pub use sun_time::{SunTimeAttributes, SunTimeMetric};
pub use uv_index::{UvIndexHandle, UvIndexMetric, UvReadiness};

pub const MANUFACTURER: &str = "Swedish Radiation Safety Authority";
pub const MODEL: &str = "Radiation and UV Monitor";

/// Result of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    Updated,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Radiation,
    UvIndex,
    SunTime,
}

impl MetricKind {
    /// Suffix appended to the entry id to form the metric's unique id.
    pub fn id_suffix(self) -> &'static str {
        match self {
            MetricKind::Radiation => "radiation",
            MetricKind::UvIndex => "uv_index",
            MetricKind::SunTime => "sun_time",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MetricKind::Radiation => "Radiation Level",
            MetricKind::UvIndex => "UV Index",
            MetricKind::SunTime => "Min soltid",
        }
    }
}

/// Bounded wait used by the sun time refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(2),
        }
    }
}

/// Everything a metric needs from its integration instance.
///
/// Passed to each metric at construction; the transport is shared by all
/// metrics of all entries.
#[derive(Clone)]
pub struct MetricContext {
    pub transport: SharedTransport,
    pub endpoints: Endpoints,
    pub retry: RetryPolicy,
}

/// Groups the metrics of one configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
}

impl DeviceInfo {
    pub fn new(name: &str) -> DeviceInfo {
        DeviceInfo {
            name: name.to_string(),
            manufacturer: MANUFACTURER,
            model: MODEL,
        }
    }
}

/// State shared by every metric: identity, availability and freshness.
#[derive(Debug, Clone)]
pub(crate) struct MetricCore {
    pub unique_id: String,
    pub device: DeviceInfo,
    pub available: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl MetricCore {
    pub fn new(entry_id: &str, kind: MetricKind, device: DeviceInfo) -> MetricCore {
        MetricCore {
            unique_id: format!("{}_{}", entry_id, kind.id_suffix()),
            device,
            available: false,
            last_updated: None,
        }
    }

    pub fn mark_updated(&mut self, now: DateTime<Utc>) {
        self.available = true;
        self.last_updated = Some(now);
    }

    pub fn mark_unavailable(&mut self) {
        self.available = false;
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RadiationAttributes {
    pub station_id: String,
    pub station_name: Option<&'static str>,
    pub summary: Option<RadiationSummary>,
    pub window_start_ms: Option<i64>,
    pub window_end_ms: Option<i64>,
}

/// Metric-specific attribute set, exported alongside the common fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricAttributes {
    Radiation(RadiationAttributes),
    UvIndex(Option<UvIndexAttributes>),
    SunTime(SunTimeAttributes),
}

/// Serializable view of a metric, as handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    pub unique_id: String,
    pub kind: MetricKind,
    pub name: &'static str,
    pub available: bool,
    pub native_value: Option<f64>,
    pub unit: &'static str,
    pub icon: &'static str,
    pub last_updated: Option<String>,
    pub device: DeviceInfo,
    pub attributes: MetricAttributes,
}

impl MetricSnapshot {
    pub(crate) fn new(
        core: &MetricCore,
        kind: MetricKind,
        native_value: Option<f64>,
        unit: &'static str,
        icon: &'static str,
        attributes: MetricAttributes,
    ) -> MetricSnapshot {
        MetricSnapshot {
            unique_id: core.unique_id.clone(),
            kind,
            name: kind.display_name(),
            available: core.available,
            native_value,
            unit,
            icon,
            last_updated: core
                .last_updated
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            device: core.device.clone(),
            attributes,
        }
    }
}

// ---------------------------------------------------------------------------
// Metric trait
// ---------------------------------------------------------------------------

/// A poll-and-derive unit driven by the host's schedule.
pub trait Metric: Send {
    fn kind(&self) -> MetricKind;

    fn unique_id(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Runs one refresh cycle as of `now`.
    fn refresh_at(&mut self, now: DateTime<Utc>) -> RefreshOutcome;

    /// Convenience wrapper that uses the real current time.
    /// Use `refresh_at` in tests to keep them deterministic.
    fn refresh(&mut self) -> RefreshOutcome {
        self.refresh_at(Utc::now())
    }

    fn snapshot(&self) -> MetricSnapshot;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unique_ids_use_kind_suffix() {
        let core = MetricCore::new("abc", MetricKind::UvIndex, DeviceInfo::new("Home"));
        assert_eq!(core.unique_id, "abc_uv_index");
        assert!(!core.available);
    }

    #[test]
    fn test_mark_updated_then_unavailable_keeps_timestamp() {
        let mut core = MetricCore::new("abc", MetricKind::Radiation, DeviceInfo::new("Home"));
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        core.mark_updated(now);
        core.mark_unavailable();
        assert!(!core.available);
        assert_eq!(core.last_updated, Some(now));
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }
}
