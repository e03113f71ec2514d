//! Refresh scheduling.
//!
//! `run` drives every metric from its own named worker thread on the scan
//! interval until the shutdown flag is raised (normally by the Ctrl-C
//! handler installed in `main`). `refresh_once` refreshes all metrics
//! sequentially, which keeps each UV index metric ahead of the sun time
//! metric that reads it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::logging::{self, DataSource};
use crate::metrics::RefreshOutcome;
use crate::model::SsmError;
use crate::pipeline::{Integration, SharedMetric, lock_metric};

/// Granularity of the interruptible sleep between refreshes.
const SLEEP_SLICE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub total: usize,
    pub updated: usize,
    pub unavailable: usize,
}

impl RefreshSummary {
    fn record(&mut self, outcome: RefreshOutcome) {
        self.total += 1;
        match outcome {
            RefreshOutcome::Updated => self.updated += 1,
            RefreshOutcome::Unavailable => self.unavailable += 1,
        }
    }
}

/// Refreshes every metric once, in entry then creation order.
pub fn refresh_once(integration: &Integration, now: DateTime<Utc>) -> RefreshSummary {
    let mut summary = RefreshSummary::default();
    for metric in integration.metrics() {
        summary.record(lock_metric(&metric).refresh_at(now));
    }
    logging::log_refresh_summary(summary.total, summary.updated, summary.unavailable);
    summary
}

/// Sleeps for `duration` in short slices. Returns false if shutdown was
/// requested meanwhile.
fn sleep_unless_shutdown(duration: Duration, shutdown: &AtomicBool) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let slice = remaining.min(SLEEP_SLICE);
        thread::sleep(slice);
        remaining -= slice;
    }
    !shutdown.load(Ordering::SeqCst)
}

fn worker_loop(metric: SharedMetric, interval: Duration, shutdown: Arc<AtomicBool>) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        lock_metric(&metric).refresh();
        if !sleep_unless_shutdown(interval, &shutdown) {
            break;
        }
    }
}

/// Runs all metrics until `shutdown` is set, then joins the workers.
pub fn run(
    integration: &Integration,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> Result<(), SsmError> {
    let metrics = integration.metrics();
    if metrics.is_empty() {
        logging::warn(DataSource::System, None, "No metrics configured, nothing to schedule");
        return Ok(());
    }

    let mut handles = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let name = lock_metric(&metric).unique_id().to_string();
        let flag = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker_loop(metric, interval, flag))
            .map_err(|e| SsmError::Io(format!("cannot start worker {}: {}", name, e)))?;
        logging::debug(DataSource::System, Some(&name), "Worker started");
        handles.push((name, handle));
    }

    logging::info(
        DataSource::System,
        None,
        &format!("Scheduled {} metrics every {}s", handles.len(), interval.as_secs()),
    );

    for (name, handle) in handles {
        match handle.join() {
            Ok(()) => logging::debug(DataSource::System, Some(&name), "Joined worker"),
            Err(_) => logging::error(DataSource::System, Some(&name), "Worker panicked"),
        }
    }

    logging::info(DataSource::System, None, "All workers stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_returns_early_on_shutdown() {
        let shutdown = AtomicBool::new(true);
        assert!(!sleep_unless_shutdown(Duration::from_secs(3600), &shutdown));
    }

    #[test]
    fn test_zero_sleep_without_shutdown() {
        let shutdown = AtomicBool::new(false);
        assert!(sleep_unless_shutdown(Duration::ZERO, &shutdown));
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = RefreshSummary::default();
        summary.record(RefreshOutcome::Updated);
        summary.record(RefreshOutcome::Unavailable);
        summary.record(RefreshOutcome::Updated);
        assert_eq!(summary, RefreshSummary { total: 3, updated: 2, unavailable: 1 });
    }
}
