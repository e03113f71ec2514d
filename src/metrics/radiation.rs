//! Radiation level metric.
//!
//! Fetches the station's recent dose-rate history and exports the latest,
//! min, max and average values in nSv/h. A 200 response without samples is a
//! soft failure: the metric turns unavailable but keeps its last summary.

use chrono::{DateTime, Utc};

use crate::analysis::radiation_stats::summarize;
use crate::ingest::radiation::fetch_history;
use crate::logging::{self, DataSource};
use crate::metrics::{
    DeviceInfo, Metric, MetricAttributes, MetricContext, MetricCore, MetricKind, MetricSnapshot,
    RadiationAttributes, RefreshOutcome,
};
use crate::model::{RadiationSummary, SsmError, UNIT_NANOSIEVERT_PER_HOUR};
use crate::stations;
use crate::timewindow::{self, TimeWindow};

pub const RADIATION_ICON: &str = "mdi:radioactive";

pub struct RadiationMetric {
    core: MetricCore,
    context: MetricContext,
    station_id: String,
    summary: Option<RadiationSummary>,
    window: Option<TimeWindow>,
}

impl RadiationMetric {
    pub fn new(
        entry_id: &str,
        device: DeviceInfo,
        station_id: &str,
        context: MetricContext,
    ) -> Self {
        Self {
            core: MetricCore::new(entry_id, MetricKind::Radiation, device),
            context,
            station_id: station_id.to_string(),
            summary: None,
            window: None,
        }
    }

    /// Last successfully derived summary, retained across failures.
    pub fn summary(&self) -> Option<&RadiationSummary> {
        self.summary.as_ref()
    }

    fn fetch_summary(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(RadiationSummary, TimeWindow), SsmError> {
        let station = stations::resolve_station(&self.station_id)?;
        let window = timewindow::radiation_window(now)?;
        let reading = fetch_history(
            self.context.transport.as_ref(),
            &self.context.endpoints,
            station.id,
            &window,
        )?;

        let summary = summarize(&reading).ok_or_else(|| {
            SsmError::NoData(format!(
                "station {} between {} and {}",
                station.id,
                window.start_ms(),
                window.end_ms()
            ))
        })?;
        Ok((summary, window))
    }
}

impl Metric for RadiationMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::Radiation
    }

    fn unique_id(&self) -> &str {
        &self.core.unique_id
    }

    fn is_available(&self) -> bool {
        self.core.available
    }

    fn refresh_at(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        match self.fetch_summary(now) {
            Ok((summary, window)) => {
                logging::debug(
                    DataSource::Radiation,
                    Some(&self.station_id),
                    &format!(
                        "latest {} nSv/h (min {}, max {}, avg {}) from {} samples",
                        summary.latest, summary.min, summary.max, summary.avg, summary.sample_count
                    ),
                );
                self.summary = Some(summary);
                self.window = Some(window);
                self.core.mark_updated(now);
                RefreshOutcome::Updated
            }
            Err(err) => {
                logging::log_fetch_failure(
                    DataSource::Radiation,
                    &self.station_id,
                    "Radiation update",
                    &err,
                );
                self.core.mark_unavailable();
                RefreshOutcome::Unavailable
            }
        }
    }

    fn snapshot(&self) -> MetricSnapshot {
        let attributes = RadiationAttributes {
            station_id: self.station_id.clone(),
            station_name: stations::find_station(&self.station_id).map(|s| s.name),
            summary: self.summary,
            window_start_ms: self.window.map(|w| w.start_ms()),
            window_end_ms: self.window.map(|w| w.end_ms()),
        };
        MetricSnapshot::new(
            &self.core,
            MetricKind::Radiation,
            self.summary.map(|s| s.latest as f64),
            UNIT_NANOSIEVERT_PER_HOUR,
            RADIATION_ICON,
            MetricAttributes::Radiation(attributes),
        )
    }
}
