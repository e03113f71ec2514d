//! UV index metric and its published read handle.
//!
//! Each refresh resolves the configured location to the authority's label,
//! fetches today's curve and derives the current value, the day's maximum
//! and its time, tomorrow's maximum and the risk level. The derived set is
//! then published through `UvIndexHandle` for the sun time metric.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::analysis::uv_risk::{
    classify_uv_risk, format_max_time, hourly_forecast, uv_icon, value_at_hour,
};
use crate::ingest::uvindex::fetch_uvindex;
use crate::logging::{self, DataSource};
use crate::metrics::{
    DeviceInfo, Metric, MetricAttributes, MetricContext, MetricCore, MetricKind, MetricSnapshot,
    RefreshOutcome,
};
use crate::model::{SsmError, UNIT_UV_INDEX, UvIndexAttributes, UvReading};
use crate::stations;
use crate::timewindow;

// ---------------------------------------------------------------------------
// Shared read handle
// ---------------------------------------------------------------------------

/// What the UV index metric last published.
#[derive(Debug, Clone, PartialEq)]
struct UvPublication {
    available: bool,
    attributes: Option<UvIndexAttributes>,
}

/// Readiness of the UV value as seen by a dependent metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UvReadiness {
    /// The UV metric has not completed a refresh yet.
    NotPublished,
    /// The last refresh failed.
    Unavailable,
    /// Refreshed, but without a current value.
    AttributeMissing,
    Ready(f64),
}

/// Cloneable handle onto the UV index metric's last published attributes.
///
/// The UV metric replaces the whole publication under a write lock on every
/// refresh, so readers never see a half-updated attribute set.
#[derive(Debug, Clone, Default)]
pub struct UvIndexHandle {
    cell: Arc<RwLock<Option<UvPublication>>>,
}

impl UvIndexHandle {
    pub fn new() -> UvIndexHandle {
        UvIndexHandle::default()
    }

    fn publish(&self, available: bool, attributes: Option<UvIndexAttributes>) {
        let publication = Some(UvPublication { available, attributes });
        match self.cell.write() {
            Ok(mut guard) => *guard = publication,
            Err(poisoned) => *poisoned.into_inner() = publication,
        }
    }

    /// Current UV value, if the UV metric has a usable one.
    pub fn readiness(&self) -> UvReadiness {
        let Ok(guard) = self.cell.read() else {
            return UvReadiness::NotPublished;
        };
        match guard.as_ref() {
            None => UvReadiness::NotPublished,
            Some(p) if !p.available => UvReadiness::Unavailable,
            Some(p) => match p.attributes.as_ref().and_then(|a| a.current_uv) {
                Some(uv) if uv.is_finite() => UvReadiness::Ready(uv),
                _ => UvReadiness::AttributeMissing,
            },
        }
    }

    /// Copy of the last published attributes, regardless of availability.
    pub fn attributes(&self) -> Option<UvIndexAttributes> {
        let guard = self.cell.read().ok()?;
        guard.as_ref().and_then(|p| p.attributes.clone())
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derives the exported attribute set from a reading at Stockholm `hour`.
///
/// A curve shorter than `hour` uses its last value; an unparseable maximum
/// time leaves `max_uv_time` empty. Both are logged, neither fails the update.
pub fn derive_attributes(reading: &UvReading, hour: u32) -> UvIndexAttributes {
    let current_uv = match value_at_hour(&reading.hourly_curve, hour) {
        Some((value, clamped)) => {
            if clamped {
                logging::warn(
                    DataSource::UvIndex,
                    Some(&reading.location_id),
                    &format!(
                        "hourly curve has {} entries, using last value for hour {}",
                        reading.hourly_curve.len(),
                        hour
                    ),
                );
            }
            Some(value)
        }
        None => None,
    };

    let max_uv_time = match format_max_time(&reading.max_time) {
        Ok(time) => Some(time),
        Err(err) => {
            logging::warn(
                DataSource::UvIndex,
                Some(&reading.location_id),
                &logging::failure_message("Formatting maxUvIndexTime", &err),
            );
            None
        }
    };

    UvIndexAttributes {
        current_uv,
        max_uv_today: reading.max_value,
        max_uv_time,
        max_uv_tomorrow: reading.max_tomorrow,
        risk_level: classify_uv_risk(reading.max_value),
        hourly_forecast: hourly_forecast(&reading.hourly_curve),
    }
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

pub struct UvIndexMetric {
    core: MetricCore,
    context: MetricContext,
    location_id: String,
    attributes: Option<UvIndexAttributes>,
    handle: UvIndexHandle,
}

impl UvIndexMetric {
    pub fn new(
        entry_id: &str,
        device: DeviceInfo,
        location_id: &str,
        context: MetricContext,
    ) -> Self {
        Self {
            core: MetricCore::new(entry_id, MetricKind::UvIndex, device),
            context,
            location_id: location_id.to_string(),
            attributes: None,
            handle: UvIndexHandle::new(),
        }
    }

    /// Read handle for dependent metrics.
    pub fn handle(&self) -> UvIndexHandle {
        self.handle.clone()
    }

    pub fn attributes(&self) -> Option<&UvIndexAttributes> {
        self.attributes.as_ref()
    }

    fn fetch_attributes(&self, now: DateTime<Utc>) -> Result<UvIndexAttributes, SsmError> {
        let location = stations::resolve_uv_location(&self.location_id)?;
        let offset = timewindow::uv_day_offset(now);
        let reading = fetch_uvindex(
            self.context.transport.as_ref(),
            &self.context.endpoints,
            location,
            offset,
        )?;
        Ok(derive_attributes(&reading, timewindow::local_hour(now)))
    }
}

impl Metric for UvIndexMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::UvIndex
    }

    fn unique_id(&self) -> &str {
        &self.core.unique_id
    }

    fn is_available(&self) -> bool {
        self.core.available
    }

    fn refresh_at(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        let outcome = match self.fetch_attributes(now) {
            Ok(attributes) => {
                logging::debug(
                    DataSource::UvIndex,
                    Some(&self.location_id),
                    &format!(
                        "current {:?}, max today {} at {:?}, risk {}",
                        attributes.current_uv,
                        attributes.max_uv_today,
                        attributes.max_uv_time,
                        attributes.risk_level
                    ),
                );
                self.attributes = Some(attributes);
                self.core.mark_updated(now);
                RefreshOutcome::Updated
            }
            Err(err) => {
                logging::log_fetch_failure(
                    DataSource::UvIndex,
                    &self.location_id,
                    "UV index update",
                    &err,
                );
                self.core.mark_unavailable();
                RefreshOutcome::Unavailable
            }
        };

        self.handle.publish(self.core.available, self.attributes.clone());
        outcome
    }

    fn snapshot(&self) -> MetricSnapshot {
        let current = self.attributes.as_ref().and_then(|a| a.current_uv);
        MetricSnapshot::new(
            &self.core,
            MetricKind::UvIndex,
            current,
            UNIT_UV_INDEX,
            uv_icon(current.unwrap_or(0.0)),
            MetricAttributes::UvIndex(self.attributes.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UvRiskLevel;

    fn reading(curve: Vec<f64>, max: f64, max_time: &str) -> UvReading {
        UvReading {
            location_id: "sverige-stockholm".to_string(),
            hourly_curve: curve,
            max_value: max,
            max_time: max_time.to_string(),
            max_tomorrow: Some(4.2),
        }
    }

    fn attributes_with(current: Option<f64>) -> UvIndexAttributes {
        UvIndexAttributes {
            current_uv: current,
            max_uv_today: 5.0,
            max_uv_time: Some("13:00".into()),
            max_uv_tomorrow: None,
            risk_level: UvRiskLevel::Moderate,
            hourly_forecast: vec![],
        }
    }

    #[test]
    fn test_derive_uses_hour_index() {
        let curve: Vec<f64> = (0..24).map(|h| h as f64 * 0.25).collect();
        let attrs = derive_attributes(&reading(curve, 6.1, "2024-07-15T13:00:00"), 12);
        assert_eq!(attrs.current_uv, Some(3.0));
        assert_eq!(attrs.max_uv_time.as_deref(), Some("13:00"));
        assert_eq!(attrs.risk_level, UvRiskLevel::High);
        assert_eq!(attrs.max_uv_tomorrow, Some(4.2));
        assert_eq!(attrs.hourly_forecast.len(), 24);
    }

    #[test]
    fn test_derive_guards_short_curve() {
        let short = reading(vec![0.0, 0.4, 0.9], 0.9, "2024-07-15T13:00:00");
        let attrs = derive_attributes(&short, 20);
        assert_eq!(attrs.current_uv, Some(0.9));
        assert_eq!(attrs.risk_level, UvRiskLevel::Low);
    }

    #[test]
    fn test_bad_max_time_only_clears_that_field() {
        let curve = vec![1.0; 24];
        let attrs = derive_attributes(&reading(curve, 1.0, "kl 13"), 10);
        assert_eq!(attrs.max_uv_time, None);
        assert_eq!(attrs.current_uv, Some(1.0));
        assert_eq!(attrs.max_uv_today, 1.0);
    }

    #[test]
    fn test_handle_readiness_states() {
        let handle = UvIndexHandle::new();
        assert_eq!(handle.readiness(), UvReadiness::NotPublished);

        handle.publish(false, Some(attributes_with(Some(3.2))));
        assert_eq!(handle.readiness(), UvReadiness::Unavailable);

        handle.publish(true, Some(attributes_with(None)));
        assert_eq!(handle.readiness(), UvReadiness::AttributeMissing);

        handle.publish(true, Some(attributes_with(Some(3.2))));
        assert_eq!(handle.readiness(), UvReadiness::Ready(3.2));
    }

    #[test]
    fn test_cloned_handles_share_the_cell() {
        let handle = UvIndexHandle::new();
        let reader = handle.clone();
        handle.publish(true, Some(attributes_with(Some(7.0))));
        assert_eq!(reader.readiness(), UvReadiness::Ready(7.0));
        assert_eq!(reader.attributes().and_then(|a| a.current_uv), Some(7.0));
    }
}
