//! Integration instance: configured entries and the metrics derived from them.
//!
//! Metric creation per entry:
//!   - station                 -> radiation level
//!   - location                -> UV index
//!   - location + skin type    -> safe sun time, reading the UV metric's handle
//!
//! Metrics are held behind `Arc<Mutex<..>>` so the scheduler can drive each
//! one from its own worker thread while the instance keeps ownership.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ConfigEntry, EntryOptions};
use crate::logging::{self, DataSource};
use crate::metrics::{
    DeviceInfo, Metric, MetricContext, MetricSnapshot, RadiationMetric, SunTimeMetric,
    UvIndexMetric,
};
use crate::model::SsmError;

pub type SharedMetric = Arc<Mutex<Box<dyn Metric>>>;

/// Locks a metric, recovering the guard if a worker panicked mid-refresh.
pub fn lock_metric(metric: &SharedMetric) -> MutexGuard<'_, Box<dyn Metric>> {
    metric.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A set-up entry and the metrics it activated.
pub struct EntryRuntime {
    pub entry: ConfigEntry,
    metrics: Vec<SharedMetric>,
}

impl EntryRuntime {
    pub fn metrics(&self) -> &[SharedMetric] {
        &self.metrics
    }
}

/// Builds the metrics an entry's effective configuration asks for, in
/// refresh order (UV index before sun time).
pub fn build_metrics(entry: &ConfigEntry, context: &MetricContext) -> Vec<Box<dyn Metric>> {
    let effective = entry.effective();
    let device = DeviceInfo::new(&effective.name);
    let mut metrics: Vec<Box<dyn Metric>> = Vec::new();

    if let Some(station) = &effective.station {
        metrics.push(Box::new(RadiationMetric::new(
            &entry.id,
            device.clone(),
            station,
            context.clone(),
        )));
    }

    if let Some(location) = &effective.location {
        let uv = UvIndexMetric::new(&entry.id, device.clone(), location, context.clone());
        let handle = uv.handle();
        metrics.push(Box::new(uv));

        if let Some(skin_type) = &effective.skin_type {
            metrics.push(Box::new(SunTimeMetric::new(
                &entry.id,
                device,
                location,
                skin_type,
                handle,
                context.clone(),
            )));
        }
    }

    metrics
}

pub struct Integration {
    context: MetricContext,
    entries: BTreeMap<String, EntryRuntime>,
}

impl Integration {
    pub fn new(context: MetricContext) -> Integration {
        Integration {
            context,
            entries: BTreeMap::new(),
        }
    }

    /// Sets up an entry's metrics. Fails if the id is taken or another entry
    /// already covers the same station/location selection.
    pub fn setup_entry(&mut self, entry: ConfigEntry) -> Result<usize, SsmError> {
        if self.entries.contains_key(&entry.id) {
            return Err(SsmError::Config(format!("entry {} is already set up", entry.id)));
        }
        self.ensure_unique(&entry, None)?;

        let metrics: Vec<SharedMetric> = build_metrics(&entry, &self.context)
            .into_iter()
            .map(|m| Arc::new(Mutex::new(m)))
            .collect();
        let count = metrics.len();

        logging::info(
            DataSource::Config,
            Some(&entry.id),
            &format!("Set up '{}' ({}) with {} metrics", entry.data.name, entry.unique_id(), count),
        );

        self.entries.insert(
            entry.id.clone(),
            EntryRuntime { entry, metrics },
        );
        Ok(count)
    }

    /// Drops an entry and its metrics. Returns false for an unknown id.
    pub fn unload_entry(&mut self, entry_id: &str) -> bool {
        match self.entries.remove(entry_id) {
            Some(runtime) => {
                logging::info(
                    DataSource::Config,
                    Some(entry_id),
                    &format!("Unloaded {} metrics", runtime.metrics.len()),
                );
                true
            }
            None => false,
        }
    }

    /// Replaces an entry's options and reloads it. On a duplicate selection
    /// the entry is left untouched.
    pub fn update_options(
        &mut self,
        entry_id: &str,
        options: EntryOptions,
    ) -> Result<usize, SsmError> {
        let mut entry = self
            .entries
            .get(entry_id)
            .map(|r| r.entry.clone())
            .ok_or_else(|| SsmError::Config(format!("unknown entry {}", entry_id)))?;
        entry.options = options;
        self.ensure_unique(&entry, Some(entry_id))?;

        self.unload_entry(entry_id);
        self.setup_entry(entry)
    }

    fn ensure_unique(&self, entry: &ConfigEntry, except: Option<&str>) -> Result<(), SsmError> {
        let identity = entry.unique_id();
        let clash = self
            .entries
            .values()
            .filter(|r| Some(r.entry.id.as_str()) != except)
            .find(|r| r.entry.unique_id() == identity);
        match clash {
            Some(existing) => Err(SsmError::Config(format!(
                "selection {} is already configured by entry {}",
                identity, existing.entry.id
            ))),
            None => Ok(()),
        }
    }

    pub fn entry(&self, entry_id: &str) -> Option<&EntryRuntime> {
        self.entries.get(entry_id)
    }

    pub fn entry_ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// All metrics of all entries, in entry-id then refresh order.
    pub fn metrics(&self) -> Vec<SharedMetric> {
        self.entries
            .values()
            .flat_map(|r| r.metrics.iter().cloned())
            .collect()
    }

    pub fn snapshots(&self) -> Vec<MetricSnapshot> {
        self.entries
            .values()
            .flat_map(|r| r.metrics.iter())
            .map(|m| lock_metric(m).snapshot())
            .collect()
    }
}
