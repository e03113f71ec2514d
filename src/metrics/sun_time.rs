//! "Min soltid" metric: safe sun exposure minutes per shade category.
//!
//! Stage 1 asks the authority for safe times from skin type, latitude, date
//! and hour. Stage 2 refines them from the UV index metric's current value,
//! waiting a bounded number of attempts for that value to be published.
//! Only stage 1 decides availability; stage 2 can only add refined values.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::shade::match_safe_times;
use crate::ingest::suntime::{
    build_calculate_url, build_calculate_with_index_url, calculate_payload,
    calculate_with_index_payload, fetch_safe_times,
};
use crate::logging::{self, DataSource};
use crate::metrics::uv_index::{UvIndexHandle, UvReadiness};
use crate::metrics::{
    DeviceInfo, Metric, MetricAttributes, MetricContext, MetricCore, MetricKind, MetricSnapshot,
    RefreshOutcome, RetryPolicy,
};
use crate::model::{SafeTimeResult, SafeTimes, SkinType, SsmError, UNIT_MINUTES};
use crate::stations;
use crate::timewindow;

pub const SUN_TIME_ICON: &str = "mdi:sun-clock";

type Sleeper = Box<dyn FnMut(Duration) + Send>;

/// Exported attribute set, flat as the host displays it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SunTimeAttributes {
    pub shade_direct_sun: Option<f64>,
    pub shade_partial: Option<f64>,
    pub shade_full: Option<f64>,
    pub i_shade_direct_sun: Option<f64>,
    pub i_shade_partial: Option<f64>,
    pub i_shade_full: Option<f64>,
}

impl From<&SafeTimeResult> for SunTimeAttributes {
    fn from(result: &SafeTimeResult) -> Self {
        SunTimeAttributes {
            shade_direct_sun: result.primary.direct_sun,
            shade_partial: result.primary.partial_shade,
            shade_full: result.primary.full_shade,
            i_shade_direct_sun: result.refined.direct_sun,
            i_shade_partial: result.refined.partial_shade,
            i_shade_full: result.refined.full_shade,
        }
    }
}

/// Polls the UV handle until it holds a current value, at most
/// `policy.attempts` reads with `policy.delay` between them.
///
/// Returns the value rounded half-to-even, or `None` if it never became
/// ready. Not-published, unavailable and missing-attribute are all treated
/// as "not ready yet".
pub fn wait_for_uv_index(
    handle: &UvIndexHandle,
    policy: RetryPolicy,
    sleep: &mut dyn FnMut(Duration),
) -> Option<i64> {
    for attempt in 1..=policy.attempts {
        match handle.readiness() {
            UvReadiness::Ready(uv) => return Some(uv.round_ties_even() as i64),
            state => {
                logging::debug(
                    DataSource::SunTime,
                    None,
                    &format!(
                        "UV index not ready ({:?}), attempt {}/{}",
                        state, attempt, policy.attempts
                    ),
                );
            }
        }
        if attempt < policy.attempts {
            sleep(policy.delay);
        }
    }
    None
}

pub struct SunTimeMetric {
    core: MetricCore,
    context: MetricContext,
    location_id: String,
    skin_type_raw: String,
    uv_handle: UvIndexHandle,
    result: SafeTimeResult,
    sleeper: Sleeper,
}

impl SunTimeMetric {
    pub fn new(
        entry_id: &str,
        device: DeviceInfo,
        location_id: &str,
        skin_type_raw: &str,
        uv_handle: UvIndexHandle,
        context: MetricContext,
    ) -> Self {
        Self {
            core: MetricCore::new(entry_id, MetricKind::SunTime, device),
            context,
            location_id: location_id.to_string(),
            skin_type_raw: skin_type_raw.to_string(),
            uv_handle,
            result: SafeTimeResult::default(),
            sleeper: Box::new(std::thread::sleep),
        }
    }

    /// Replaces the delay function used between UV readiness checks.
    pub fn with_sleeper(mut self, sleeper: impl FnMut(Duration) + Send + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    fn calculate_primary(&self, now: DateTime<Utc>) -> Result<(SkinType, SafeTimes), SsmError> {
        let skin = SkinType::from_id(&self.skin_type_raw)?;
        let location = stations::resolve_uv_location(&self.location_id)?;
        let url = build_calculate_url(&self.context.endpoints);
        let payload = calculate_payload(
            skin,
            location.latitude,
            &timewindow::local_date_string(now),
            timewindow::local_hour(now),
        );
        let transport = self.context.transport.as_ref();
        let rows = fetch_safe_times(transport, &url, &payload, &self.location_id)?;
        Ok((skin, match_safe_times(&rows)))
    }

    fn calculate_refined(&self, skin: SkinType, uv_index: i64) -> Result<SafeTimes, SsmError> {
        let url = build_calculate_with_index_url(&self.context.endpoints);
        let payload = calculate_with_index_payload(skin, uv_index);
        let transport = self.context.transport.as_ref();
        let rows = fetch_safe_times(transport, &url, &payload, &self.location_id)?;
        Ok(match_safe_times(&rows))
    }

    fn refine(&mut self, skin: SkinType) {
        self.result.refined = SafeTimes::default();

        let retry = self.context.retry;
        let Some(uv_index) = wait_for_uv_index(&self.uv_handle, retry, &mut self.sleeper) else {
            logging::debug(
                DataSource::SunTime,
                Some(&self.location_id),
                "UV index not available, skipping refined calculation",
            );
            return;
        };

        match self.calculate_refined(skin, uv_index) {
            Ok(refined) => self.result.refined = refined,
            Err(err) => logging::warn(
                DataSource::SunTime,
                Some(&self.location_id),
                &logging::failure_message("Refined sun time calculation", &err),
            ),
        }
    }
}

impl Metric for SunTimeMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::SunTime
    }

    fn unique_id(&self) -> &str {
        &self.core.unique_id
    }

    fn is_available(&self) -> bool {
        self.core.available
    }

    fn refresh_at(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        let (skin, primary) = match self.calculate_primary(now) {
            Ok(calculated) => calculated,
            Err(err) => {
                logging::log_fetch_failure(
                    DataSource::SunTime,
                    &self.location_id,
                    "Sun time update",
                    &err,
                );
                self.core.mark_unavailable();
                return RefreshOutcome::Unavailable;
            }
        };

        self.result.primary = primary;
        self.core.mark_updated(now);
        self.refine(skin);

        logging::debug(
            DataSource::SunTime,
            Some(&self.location_id),
            &format!("safe times {:?}", self.result),
        );
        RefreshOutcome::Updated
    }

    fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot::new(
            &self.core,
            MetricKind::SunTime,
            self.result.primary.direct_sun,
            UNIT_MINUTES,
            SUN_TIME_ICON,
            MetricAttributes::SunTime(SunTimeAttributes::from(&self.result)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_gives_up_after_bounded_attempts() {
        let handle = UvIndexHandle::new();
        let mut delays = Vec::new();
        let policy = RetryPolicy { attempts: 5, delay: Duration::from_secs(2) };

        let value = wait_for_uv_index(&handle, policy, &mut |d: Duration| delays.push(d));

        assert_eq!(value, None);
        assert_eq!(delays, vec![Duration::from_secs(2); 4]);
    }

    #[test]
    fn test_wait_with_zero_attempts_never_sleeps() {
        let handle = UvIndexHandle::new();
        let mut slept = 0;
        let policy = RetryPolicy { attempts: 0, delay: Duration::from_secs(2) };
        assert_eq!(wait_for_uv_index(&handle, policy, &mut |_: Duration| slept += 1), None);
        assert_eq!(slept, 0);
    }

    #[test]
    fn test_attributes_flatten_both_triples() {
        let result = SafeTimeResult {
            primary: SafeTimes {
                direct_sun: Some(20.0),
                partial_shade: Some(40.0),
                full_shade: None,
            },
            refined: SafeTimes { direct_sun: Some(15.0), partial_shade: None, full_shade: None },
        };
        let attrs = SunTimeAttributes::from(&result);
        assert_eq!(attrs.shade_direct_sun, Some(20.0));
        assert_eq!(attrs.shade_partial, Some(40.0));
        assert_eq!(attrs.shade_full, None);
        assert_eq!(attrs.i_shade_direct_sun, Some(15.0));
        assert_eq!(attrs.i_shade_full, None);
    }
}
