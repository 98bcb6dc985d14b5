//! Polling service for the flowdash telemetry dashboard
//!
//! Polls the backend REST API on per-collection intervals, keeps an
//! in-memory view of devices, readings, alarms, sections and odorant
//! drums, and derives a classified dashboard snapshot on demand. Slow
//! responses are discarded rather than overwriting fresher data, and poll
//! failures keep the previous view so the dashboard degrades instead of
//! blanking.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod poller;
pub mod service;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use config::{MonitorConfig, PollConfig, ServiceConfig};
pub use error::{MonitorError, Result};
pub use service::{MonitorService, ServiceStatus};
pub use snapshot::{DashboardSnapshot, DeviceStatusRow, DrumReport, ParameterReport};
pub use state::{Versioned, ViewState};

/// Initialize the polling service with default configuration
///
/// # Errors
///
/// Returns [`MonitorError`] if configuration loading fails, the HTTP
/// client cannot be constructed, or the configured login fails.
pub async fn init() -> Result<MonitorService> {
    let config = MonitorConfig::load()?;
    MonitorService::new(config).await
}

/// Initialize the polling service with custom configuration
///
/// # Errors
///
/// Returns [`MonitorError`] if the HTTP client cannot be constructed or
/// the configured login fails.
pub async fn init_with_config(config: MonitorConfig) -> Result<MonitorService> {
    MonitorService::new(config).await
}
