//! Configuration management for the polling service

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the polling service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Backend API configuration (shared with the client)
    #[serde(default)]
    pub backend: flowdash_core::config::BackendConfig,

    /// Poll interval configuration
    #[serde(default)]
    pub poll: PollConfig,

    /// Service lifecycle configuration
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Per-collection poll intervals and fetch windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Device list poll interval in seconds
    #[serde(default = "default_devices_interval")]
    pub devices_interval_seconds: u64,

    /// Alarm (list, stats, thresholds) poll interval in seconds
    #[serde(default = "default_alarms_interval")]
    pub alarms_interval_seconds: u64,

    /// Section and dashboard stats poll interval in seconds
    #[serde(default = "default_sections_interval")]
    pub sections_interval_seconds: u64,

    /// Odorant drum poll interval in seconds
    #[serde(default = "default_drums_interval")]
    pub drums_interval_seconds: u64,

    /// Readings window poll interval in seconds
    #[serde(default = "default_readings_interval")]
    pub readings_interval_seconds: u64,

    /// Trailing window of readings to fetch, in hours
    #[serde(default = "default_readings_window_hours")]
    pub readings_window_hours: u32,

    /// Page size for the readings fetch (backend caps at 1000)
    #[serde(default = "default_readings_page_size")]
    pub readings_page_size: u32,
}

/// Service lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,

    /// Health check interval in seconds (0 disables)
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_seconds: u64,

    /// Age in seconds after which a collection counts as stale for health
    /// checks
    #[serde(default = "default_stale_after")]
    pub stale_after_seconds: u64,
}

// Default value functions
const fn default_devices_interval() -> u64 {
    10
}

const fn default_alarms_interval() -> u64 {
    15
}

const fn default_sections_interval() -> u64 {
    30
}

const fn default_drums_interval() -> u64 {
    30
}

const fn default_readings_interval() -> u64 {
    30
}

const fn default_readings_window_hours() -> u32 {
    24
}

const fn default_readings_page_size() -> u32 {
    1000
}

const fn default_shutdown_timeout() -> u64 {
    30
}

const fn default_health_check_interval() -> u64 {
    60
}

const fn default_stale_after() -> u64 {
    120
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            devices_interval_seconds: default_devices_interval(),
            alarms_interval_seconds: default_alarms_interval(),
            sections_interval_seconds: default_sections_interval(),
            drums_interval_seconds: default_drums_interval(),
            readings_interval_seconds: default_readings_interval(),
            readings_window_hours: default_readings_window_hours(),
            readings_page_size: default_readings_page_size(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_seconds: default_shutdown_timeout(),
            health_check_interval_seconds: default_health_check_interval(),
            stale_after_seconds: default_stale_after(),
        }
    }
}

impl PollConfig {
    /// Device poll interval as a [`Duration`]
    #[must_use]
    pub const fn devices_interval(&self) -> Duration {
        Duration::from_secs(self.devices_interval_seconds)
    }

    /// Alarm poll interval as a [`Duration`]
    #[must_use]
    pub const fn alarms_interval(&self) -> Duration {
        Duration::from_secs(self.alarms_interval_seconds)
    }

    /// Section poll interval as a [`Duration`]
    #[must_use]
    pub const fn sections_interval(&self) -> Duration {
        Duration::from_secs(self.sections_interval_seconds)
    }

    /// Drum poll interval as a [`Duration`]
    #[must_use]
    pub const fn drums_interval(&self) -> Duration {
        Duration::from_secs(self.drums_interval_seconds)
    }

    /// Readings poll interval as a [`Duration`]
    #[must_use]
    pub const fn readings_interval(&self) -> Duration {
        Duration::from_secs(self.readings_interval_seconds)
    }
}

impl ServiceConfig {
    /// Shutdown timeout as a [`Duration`]
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    /// Health check interval as a [`Duration`]
    #[must_use]
    pub const fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_seconds)
    }
}

impl MonitorConfig {
    /// Load configuration from environment and files
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("flowdash-monitor").required(false))
            .add_source(config::Environment::with_prefix("FLOWDASH_MONITOR").separator("__"))
            .build()
            .map_err(|e| crate::MonitorError::configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| crate::MonitorError::configuration(e.to_string()))
    }
}
