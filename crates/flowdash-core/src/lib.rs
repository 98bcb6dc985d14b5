//! Core types and telemetry math for the flowdash toolkit
//!
//! Domain model for gas pipeline telemetry (metering stations, readings,
//! sections, alarms, odorant drums), the threshold classifier, the hourly
//! flow aggregator and the drum depletion estimator. Everything here is
//! backend-agnostic; the HTTP surface lives in `flowdash-client`.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod odorant;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use status::{OnlineStatus, ParameterKind, ParameterStatus, StatusLabel};
pub use types::{Alarm, ClientId, Device, DeviceReading, OdorantDrum, Reading, SectionId};

/// Initialize the logging system
///
/// # Errors
///
/// Returns an error if the logging system cannot be initialized.
pub fn init_logging() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| Error::Configuration {
            message: e.to_string(),
        })
}
