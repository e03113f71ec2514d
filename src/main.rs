use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use clap::{Parser, Subcommand};

use ssm_service::config::{self, Settings};
use ssm_service::logging::{self, DataSource, LogLevel};
use ssm_service::metrics::MetricContext;
use ssm_service::model::SsmError;
use ssm_service::pipeline::Integration;
use ssm_service::scheduler;
use ssm_service::transport::{ReqwestTransport, SharedTransport, TransportConfig};
use ssm_service::verify;

#[derive(Debug, Parser)]
#[command(
    name = "ssm_service",
    version,
    about = "SSM radiation, UV index and safe sun time monitor"
)]
struct Cli {
    /// Settings file
    #[arg(long, env = "SSM_CONFIG", default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Overrides `service.log_level` (debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh all metrics on the scan interval until interrupted
    Run,
    /// Refresh every metric once and print the snapshots as JSON
    Once,
    /// Check that each entry's station and location answer
    Validate,
    /// Probe every registered station and UV location
    Verify,
    /// Print the settings form schema as JSON
    Form,
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        logging::error(DataSource::System, None, &err.to_string());
        eprintln!("error: {}", err);
        exit(1);
    }
}

/// Reads the settings file, or falls back to defaults when it is absent.
fn load_settings(path: &Path) -> Result<(Settings, bool), SsmError> {
    if path.exists() {
        Ok((Settings::load(path)?, true))
    } else {
        Ok((Settings::default(), false))
    }
}

fn build_transport(settings: &Settings) -> Result<SharedTransport, SsmError> {
    ReqwestTransport::shared(&TransportConfig {
        timeout: settings.service.request_timeout(),
        ..TransportConfig::default()
    })
}

fn build_integration(settings: &Settings, transport: SharedTransport) -> Integration {
    let mut integration = Integration::new(MetricContext {
        transport,
        endpoints: settings.endpoints.clone(),
        retry: settings.retry.policy(),
    });
    for entry in &settings.entries {
        if let Err(e) = integration.setup_entry(entry.clone()) {
            logging::error(DataSource::Config, Some(&entry.id), &e.to_string());
        }
    }
    integration
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, SsmError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SsmError::Io(format!("cannot serialize output: {}", e)))
}

fn run(cli: Cli) -> Result<(), SsmError> {
    let (settings, found) = load_settings(&cli.config)?;
    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(settings.service.log_level.as_str());
    logging::init_logger(
        LogLevel::from_name(level),
        settings.service.log_file.as_deref().map(Path::new),
        settings.service.console_timestamps,
    )?;

    if found {
        logging::info(
            DataSource::Config,
            None,
            &format!("Loaded {} entries from {}", settings.entries.len(), cli.config.display()),
        );
    } else {
        logging::warn(
            DataSource::Config,
            None,
            &format!("{} not found, using defaults", cli.config.display()),
        );
    }
    settings.log_warnings();

    let transport = build_transport(&settings)?;

    match cli.command {
        Command::Form => {
            println!("{}", to_json(&config::form_schema())?);
            Ok(())
        }
        Command::Once => {
            let integration = build_integration(&settings, transport);
            scheduler::refresh_once(&integration, Utc::now());
            println!("{}", to_json(&integration.snapshots())?);
            Ok(())
        }
        Command::Validate => {
            let mut failed = 0;
            for entry in &settings.entries {
                let data = entry.effective();
                match verify::validate_entry(transport.as_ref(), &settings.endpoints, &data) {
                    Ok(()) => println!("{} ({}): OK", entry.id, entry.data.name),
                    Err(e) => {
                        println!("{} ({}): cannot_connect: {}", entry.id, entry.data.name, e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                return Err(SsmError::Config(format!("{} entries failed validation", failed)));
            }
            Ok(())
        }
        Command::Verify => {
            let report =
                verify::run_full_verification(transport.as_ref(), &settings.endpoints, Utc::now())?;
            verify::print_summary(&report);
            Ok(())
        }
        Command::Run => {
            let integration = build_integration(&settings, transport);
            let shutdown = Arc::new(AtomicBool::new(false));
            let handler_flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || {
                logging::info(DataSource::System, None, "Termination signal received");
                handler_flag.store(true, Ordering::SeqCst);
            })
            .map_err(|e| SsmError::Config(format!("cannot install signal handler: {}", e)))?;

            scheduler::run(&integration, settings.service.scan_interval(), shutdown)
        }
    }
}
