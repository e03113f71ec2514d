//! Service settings and configuration entries.
//!
//! Settings are read from a TOML file (`ssm.toml` unless `SSM_CONFIG` or
//! `--config` says otherwise). Each `[[entry]]` describes one monitored
//! selection: a display name plus any subset of radiation station, UV
//! location and skin type. An entry's `[entry.options]` table overrides its
//! data field by field.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ingest::Endpoints;
use crate::logging::{self, DataSource};
use crate::metrics::RetryPolicy;
use crate::model::{SkinType, SsmError};
use crate::stations::{self, STATION_REGISTRY, UV_LOCATIONS};

pub const DEFAULT_NAME: &str = "SSM";
pub const DEFAULT_CONFIG_PATH: &str = "ssm.toml";

// ============================================================================
// TOML structures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_true")]
    pub console_timestamps: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: default_scan_interval(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
            log_file: None,
            console_timestamps: true,
        }
    }
}

impl ServiceConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetryConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_delay")]
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_secs: default_delay(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts,
            delay: Duration::from_secs(self.delay_secs),
        }
    }
}

fn default_scan_interval() -> u64 {
    30 * 60
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}
fn default_true() -> bool {
    true
}
fn default_attempts() -> u32 {
    5
}
fn default_delay() -> u64 {
    2
}
fn default_name() -> String {
    DEFAULT_NAME.into()
}

/// Fields set when an entry is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryData {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skin_type: Option<String>,
}

impl Default for EntryData {
    fn default() -> Self {
        Self {
            name: default_name(),
            station: None,
            location: None,
            skin_type: None,
        }
    }
}

/// Fields changed after creation. An empty string means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryOptions {
    #[serde(default)]
    pub station: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub skin_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    station: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    skin_type: Option<String>,
    #[serde(default)]
    options: EntryOptions,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    service: ServiceConfig,
    #[serde(default)]
    endpoints: Endpoints,
    #[serde(default)]
    retry: RetryConfig,
    #[serde(default)]
    entry: Vec<RawEntry>,
}

// ============================================================================
// Configuration entries
// ============================================================================

/// One configured selection with its creation data and later options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub id: String,
    pub data: EntryData,
    pub options: EntryOptions,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ConfigEntry {
    /// New entry with a random id and no options.
    pub fn new(data: EntryData) -> ConfigEntry {
        ConfigEntry {
            id: uuid::Uuid::new_v4().to_string(),
            data,
            options: EntryOptions::default(),
        }
    }

    pub fn with_id(id: &str, data: EntryData) -> ConfigEntry {
        ConfigEntry {
            id: id.to_string(),
            data,
            options: EntryOptions::default(),
        }
    }

    /// Data with options applied field by field. Empty values never win.
    pub fn effective(&self) -> EntryData {
        EntryData {
            name: self.data.name.clone(),
            station: non_empty(&self.options.station).or_else(|| non_empty(&self.data.station)),
            location: non_empty(&self.options.location).or_else(|| non_empty(&self.data.location)),
            skin_type: non_empty(&self.options.skin_type)
                .or_else(|| non_empty(&self.data.skin_type)),
        }
    }

    /// Identity of the physical selection, used to reject duplicate setups.
    /// The display name is not part of it.
    pub fn unique_id(&self) -> String {
        let effective = self.effective();
        format!(
            "{}_{}",
            effective.station.as_deref().unwrap_or("-"),
            effective.location.as_deref().unwrap_or("-")
        )
    }

    /// Problems that will make a metric unavailable at refresh time.
    pub fn validate(&self) -> Vec<String> {
        let effective = self.effective();
        let mut warnings = Vec::new();

        if let Some(station) = &effective.station {
            if let Err(e) = stations::resolve_station(station) {
                warnings.push(e.to_string());
            }
        }
        if let Some(location) = &effective.location {
            if let Err(e) = stations::resolve_uv_location(location) {
                warnings.push(e.to_string());
            }
        }
        if let Some(skin) = &effective.skin_type {
            if let Err(e) = SkinType::from_id(skin) {
                warnings.push(e.to_string());
            }
            if effective.location.is_none() {
                warnings.push("skin type is set but no UV location; sun time is disabled".into());
            }
        }
        if effective.station.is_none() && effective.location.is_none() {
            warnings.push("neither station nor location is set; entry has no metrics".into());
        }

        warnings
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Everything read from the settings file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub service: ServiceConfig,
    pub endpoints: Endpoints,
    pub retry: RetryConfig,
    pub entries: Vec<ConfigEntry>,
}

impl Settings {
    /// Parses settings from TOML text. Entries without an id get a fresh one.
    pub fn from_toml(text: &str) -> Result<Settings, SsmError> {
        let raw: RawSettings =
            toml::from_str(text).map_err(|e| SsmError::Config(format!("invalid settings: {}", e)))?;

        let entries = raw
            .entry
            .into_iter()
            .map(|e| {
                let data = EntryData {
                    name: e.name,
                    station: e.station,
                    location: e.location,
                    skin_type: e.skin_type,
                };
                let mut entry = match non_empty(&e.id) {
                    Some(id) => ConfigEntry::with_id(&id, data),
                    None => ConfigEntry::new(data),
                };
                entry.options = e.options;
                entry
            })
            .collect();

        Ok(Settings {
            service: raw.service,
            endpoints: raw.endpoints,
            retry: raw.retry,
            entries,
        })
    }

    pub fn load(path: &Path) -> Result<Settings, SsmError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SsmError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Settings::from_toml(&text)
    }

    /// Logs every entry's validation warnings. Returns how many were found.
    pub fn log_warnings(&self) -> usize {
        let mut count = 0;
        for entry in &self.entries {
            for warning in entry.validate() {
                logging::warn(DataSource::Config, Some(&entry.id), &warning);
                count += 1;
            }
        }
        count
    }
}

// ============================================================================
// Settings form
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Dropdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

fn dropdown(name: &'static str, options: Vec<SelectOption>, default: Option<String>) -> FormField {
    FormField {
        name,
        kind: FieldKind::Dropdown,
        required: false,
        default,
        options,
    }
}

fn station_options() -> Vec<SelectOption> {
    STATION_REGISTRY
        .iter()
        .map(|s| SelectOption { value: s.id.into(), label: s.name.into() })
        .collect()
}

fn location_options() -> Vec<SelectOption> {
    UV_LOCATIONS
        .iter()
        .map(|l| SelectOption { value: l.id.into(), label: l.display_name.into() })
        .collect()
}

fn skin_type_options() -> Vec<SelectOption> {
    SkinType::ALL
        .iter()
        .map(|s| SelectOption {
            value: s.id().to_string(),
            label: stations::skin_type_label(*s).into(),
        })
        .collect()
}

/// Fields shown when creating an entry.
pub fn form_schema() -> Vec<FormField> {
    vec![
        FormField {
            name: "name",
            kind: FieldKind::Text,
            required: true,
            default: Some(DEFAULT_NAME.into()),
            options: Vec::new(),
        },
        dropdown("station", station_options(), None),
        dropdown("location", location_options(), None),
        dropdown("skin_type", skin_type_options(), None),
    ]
}

/// Fields shown when changing an existing entry, pre-filled with its
/// effective values.
pub fn options_form_schema(entry: &ConfigEntry) -> Vec<FormField> {
    let effective = entry.effective();
    vec![
        dropdown("station", station_options(), effective.station),
        dropdown("location", location_options(), effective.location),
        dropdown("skin_type", skin_type_options(), effective.skin_type),
    ]
}
