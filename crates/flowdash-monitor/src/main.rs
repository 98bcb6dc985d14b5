//! Flowdash polling service
//!
//! Polls the gas pipeline telemetry backend, maintains an in-memory view
//! of the fleet and serves classified dashboard snapshots.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

use clap::{Parser, Subcommand};
use flowdash_monitor::{MonitorConfig, MonitorService, Result};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

/// Command line interface for the flowdash polling service
#[derive(Parser)]
#[command(
    name = "flowdash-monitor",
    version = env!("CARGO_PKG_VERSION"),
    about = "Polling service for the flowdash telemetry dashboard",
    long_about = "Polls a gas pipeline telemetry backend on per-collection intervals, keeps an in-memory view of devices, readings, alarms, sections and odorant drums, and derives classified dashboard snapshots."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Enable structured JSON logging
    #[arg(long)]
    json: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Start the polling service
    Start,

    /// Query backend health: headline counters and system metrics
    Status {
        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Poll everything once and print a classified dashboard snapshot
    Snapshot {
        /// Output format (json, table)
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Validate configuration
    Config {
        /// Show resolved configuration
        #[arg(short, long)]
        show: bool,

        /// Validate configuration values
        #[arg(short, long)]
        validate: bool,
    },
}

/// Main entry point for the polling service
///
/// # Errors
///
/// Returns error if service initialization or execution fails
///
/// # Panics
///
/// Panics if the tokio runtime cannot be initialized
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for development convenience)
    if let Err(e) = dotenvy::dotenv() {
        // It's okay if .env doesn't exist
        eprintln!("Note: .env file not loaded: {e}");
    }

    let cli = Cli::parse();

    init_logging(&cli);

    let config = load_config(cli.config.as_deref()).await?;

    match cli.command {
        Some(Commands::Start) | None => start_service(config).await,
        Some(Commands::Status { format }) => show_status(config, &format).await,
        Some(Commands::Snapshot { format }) => show_snapshot(config, &format).await,
        Some(Commands::Config { show, validate }) => handle_config_command(&config, show, validate),
    }
}

/// Initialize logging system
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json || cli.log_format == "json" {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = cli.log_level,
        "Flowdash polling service starting"
    );
}

/// Load configuration from file or environment
///
/// # Errors
///
/// Returns error if the configuration file cannot be read or parsed
async fn load_config(config_path: Option<&std::path::Path>) -> Result<MonitorConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from: {}", path.display());

        let config_content = tokio::fs::read_to_string(path).await.map_err(|e| {
            flowdash_monitor::MonitorError::configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: MonitorConfig = toml::from_str(&config_content).map_err(|e| {
            flowdash_monitor::MonitorError::configuration(format!(
                "Failed to parse config file: {e}"
            ))
        })?;

        Ok(config)
    } else {
        info!("Loading default configuration");
        MonitorConfig::load()
    }
}

/// Start the polling service and run until shutdown
///
/// # Errors
///
/// Returns error if the service cannot be started
async fn start_service(config: MonitorConfig) -> Result<()> {
    info!(
        backend = %config.backend.base_url,
        "Starting polling service"
    );

    let service = MonitorService::new(config).await?;
    service.start()?;
    info!("Polling service is running. Press Ctrl+C to stop.");

    wait_for_shutdown_signal(&service).await;

    service.stop().await?;
    info!("Service stopped successfully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or service shutdown)
async fn wait_for_shutdown_signal(service: &MonitorService) {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully");
        }
        () = service.wait_for_shutdown() => {
            info!("Service requested shutdown");
        }
    }
}

/// Query backend health and print it
///
/// # Errors
///
/// Returns error if the backend cannot be reached
async fn show_status(config: MonitorConfig, format: &str) -> Result<()> {
    let service = MonitorService::new(config).await?;
    let client = service.client();

    let stats = client.dashboard_stats().await?;
    let metrics = client.system_metrics().await?;

    if format == "json" {
        let value = serde_json::json!({
            "stats": stats,
            "metrics": metrics,
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
    } else {
        println!("Backend status");
        println!("  Devices:         {} ({} active)", stats.total_devices, stats.active_devices);
        println!("  Readings stored: {}", stats.total_readings);
        println!("  Open alarms:     {}", stats.active_alarms);
        println!("  Last hour:       {} readings ({:.1}/min)", metrics.readings_last_hour, metrics.readings_per_minute);
        println!("  Uptime:          {:.1}%", metrics.uptime_percentage);
    }

    Ok(())
}

/// Poll everything once and print a classified snapshot
///
/// # Errors
///
/// Returns error if the service cannot be initialized
async fn show_snapshot(config: MonitorConfig, format: &str) -> Result<()> {
    let service = MonitorService::new(config).await?;
    service.refresh_once().await;

    let snapshot = service.snapshot();

    if format == "table" {
        println!("Snapshot at {}", snapshot.generated_at);
        println!("Devices ({}):", snapshot.devices.len());
        for row in &snapshot.devices {
            println!(
                "  {:<16} {:<10} section {}",
                row.client_id,
                row.online,
                row.section_id.as_deref().unwrap_or("-")
            );
        }
        println!("Open alarms: {}", snapshot.unacknowledged_alarms.len());
        println!("Drums: {}", snapshot.drums.len());
    } else {
        let rendered = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            flowdash_monitor::MonitorError::configuration(format!(
                "Failed to serialize snapshot: {e}"
            ))
        })?;
        println!("{rendered}");
    }

    Ok(())
}

/// Validate configuration values
fn validate_config_values(config: &MonitorConfig) {
    info!("Validating configuration...");

    if config.backend.base_url.is_empty() {
        warn!("Backend base URL is empty");
    }
    if config.backend.token.is_none()
        && (config.backend.username.is_none() || config.backend.password.is_none())
    {
        warn!("No token or credentials configured; authenticated endpoints will fail");
    }
    if config.poll.readings_page_size > 1000 {
        warn!(
            page_size = config.poll.readings_page_size,
            "Readings page size exceeds the backend cap of 1000"
        );
    }
    for (name, interval) in [
        ("devices", config.poll.devices_interval_seconds),
        ("readings", config.poll.readings_interval_seconds),
        ("alarms", config.poll.alarms_interval_seconds),
        ("sections", config.poll.sections_interval_seconds),
        ("drums", config.poll.drums_interval_seconds),
    ] {
        if interval == 0 {
            warn!(collection = name, "Poll interval of zero will busy-loop");
        }
    }

    info!("Configuration validation completed");
}

/// Show configuration as TOML
///
/// # Errors
///
/// Returns error if configuration cannot be serialized
fn show_config(config: &MonitorConfig) -> Result<()> {
    let config_toml = toml::to_string_pretty(config).map_err(|e| {
        flowdash_monitor::MonitorError::configuration(format!(
            "Failed to serialize configuration: {e}"
        ))
    })?;
    println!("{config_toml}");
    Ok(())
}

/// Handle configuration commands
///
/// # Errors
///
/// Returns error if configuration cannot be serialized
fn handle_config_command(config: &MonitorConfig, show: bool, validate: bool) -> Result<()> {
    if validate {
        validate_config_values(config);
    }

    if show {
        show_config(config)?;
    }

    Ok(())
}
