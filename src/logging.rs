/// Structured logging for the SSM monitoring service
///
/// Provides context-rich log records tagged with the data source and the
/// station/location identifier. Records are emitted as `tracing` events;
/// `init_logger` installs a console layer and, optionally, a plain-text file
/// layer for daemon operation.

use std::fmt;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::model::SsmError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a configured level name. Unknown names fall back to `Info`.
    pub fn from_name(name: &str) -> LogLevel {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Radiation,
    UvIndex,
    SunTime,
    Config,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Radiation => write!(f, "RADIATION"),
            DataSource::UvIndex => write!(f, "UV"),
            DataSource::SunTime => write!(f, "SUNTIME"),
            DataSource::Config => write!(f, "CONFIG"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - nothing to act on
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - a station may simply not have reported yet
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a fetch failure by its error variant.
pub fn classify_failure(err: &SsmError) -> FailureType {
    match err {
        SsmError::NoData(_) => FailureType::Unknown,
        SsmError::Transport { .. }
        | SsmError::HttpStatus { .. }
        | SsmError::Parse { .. }
        | SsmError::UnknownStation(_)
        | SsmError::UnknownLocation(_)
        | SsmError::InvalidSkinType(_)
        | SsmError::Config(_)
        | SsmError::Io(_) => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `min_level` when set. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&Path>,
    console_timestamps: bool,
) -> Result<(), SsmError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.filter_directive()));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let console = if console_timestamps {
        console
            .with_timer(ChronoUtc::new("%Y-%m-%d %H:%M:%S UTC".to_string()))
            .boxed()
    } else {
        console.without_time().boxed()
    };

    let file = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                SsmError::Config(format!("log file {} has no file name", path.display()))
            })?;
            std::fs::create_dir_all(directory)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy().into_owned())
                .build(directory)
                .map_err(|e| {
                    SsmError::Config(format!("cannot open log file {}: {}", path.display(), e))
                })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_timer(ChronoUtc::new("%Y-%m-%d %H:%M:%S UTC".to_string())),
            )
        }
        None => None,
    };

    // try_init fails only if a subscriber is already installed (e.g. in tests).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

fn site_part(site_id: Option<&str>) -> String {
    site_id.map(|s| format!(" [{}]", s)).unwrap_or_default()
}

/// Log a general informational message
pub fn info(source: DataSource, site_id: Option<&str>, message: &str) {
    tracing::info!("{}{}: {}", source, site_part(site_id), message);
}

/// Log a warning message
pub fn warn(source: DataSource, site_id: Option<&str>, message: &str) {
    tracing::warn!("{}{}: {}", source, site_part(site_id), message);
}

/// Log an error message
pub fn error(source: DataSource, site_id: Option<&str>, message: &str) {
    tracing::error!("{}{}: {}", source, site_part(site_id), message);
}

/// Log a debug message
pub fn debug(source: DataSource, site_id: Option<&str>, message: &str) {
    tracing::debug!("{}{}: {}", source, site_part(site_id), message);
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Longest raw body excerpt included in a failure record.
const BODY_EXCERPT_CHARS: usize = 512;

fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{}...", cut)
    }
}

/// Formats a failure record: operation, classification, error and body.
pub fn failure_message(operation: &str, err: &SsmError) -> String {
    let failure_type = classify_failure(err);
    match err.body() {
        Some(body) if !body.is_empty() => format!(
            "{} failed [{}]: {} (body: {})",
            operation,
            failure_type,
            err,
            excerpt(body)
        ),
        _ => format!("{} failed [{}]: {}", operation, failure_type, err),
    }
}

/// Log a data source failure at the level its classification calls for
pub fn log_fetch_failure(source: DataSource, site_id: &str, operation: &str, err: &SsmError) {
    let message = failure_message(operation, err);
    match classify_failure(err) {
        FailureType::Expected => debug(source, Some(site_id), &message),
        FailureType::Unexpected => error(source, Some(site_id), &message),
        FailureType::Unknown => warn(source, Some(site_id), &message),
    }
}

/// Log a summary of one refresh round across all metrics
pub fn log_refresh_summary(total: usize, updated: usize, unavailable: usize) {
    let message = format!(
        "Refresh complete: {}/{} updated, {} unavailable",
        updated, total, unavailable
    );

    if unavailable == 0 {
        info(DataSource::System, None, &message);
    } else if updated == 0 {
        error(DataSource::System, None, &message);
    } else {
        warn(DataSource::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::from_name("WARN"), LogLevel::Warning);
        assert_eq!(LogLevel::from_name("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_name("verbose"), LogLevel::Info);
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(classify_failure(&SsmError::NoData("17".into())), FailureType::Unknown);
        let http = SsmError::HttpStatus { url: "u".into(), status: 500, body: String::new() };
        assert_eq!(classify_failure(&http), FailureType::Unexpected);
        assert_eq!(
            classify_failure(&SsmError::UnknownLocation("x".into())),
            FailureType::Unexpected
        );
    }

    #[test]
    fn test_failure_message_includes_body_excerpt() {
        let err = SsmError::parse("missing values", &"x".repeat(600));
        let message = failure_message("Radiation update", &err);
        assert!(
            message.starts_with("Radiation update failed [UNEXPECTED]: Parse error: missing values")
        );
        assert!(message.ends_with("...)"));
        assert!(message.len() < 700);
    }
}
