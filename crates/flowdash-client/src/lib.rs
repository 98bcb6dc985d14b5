//! HTTP client for the flowdash telemetry backend
//!
//! Thin typed wrapper over the backend REST API: bearer-token auth, typed
//! request/response models per endpoint group, and CSV/Excel export
//! downloads.
//! Every call goes through [`ApiClient`]; endpoint groups live in their own
//! modules and attach methods to it.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod alarms;
pub mod auth;
pub mod client;
pub mod dashboard;
pub mod devices;
pub mod export;
pub mod odorant;
pub mod readings;
pub mod sections;
pub mod users;

// Re-export commonly used types
pub use alarms::{AlarmQuery, AlarmStats, MonitoringStatus};
pub use auth::{AuthenticatedUser, Token};
pub use client::{ApiClient, MessageResponse};
pub use export::ExportFormat;
pub use readings::{ExportedReading, ReadingsQuery, ReadingsSummary};
pub use sections::{SectionDevices, SectionStatsResponse, SectionSummary};
