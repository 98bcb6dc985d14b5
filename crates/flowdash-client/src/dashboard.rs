//! Dashboard feed endpoints: headline counters, recent activity and
//! fleet-wide averages

use crate::client::ApiClient;
use chrono::NaiveDateTime;
use flowdash_core::types::{AlarmSeverity, DashboardStats, DeviceType};
use flowdash_core::Result;
use serde::{Deserialize, Serialize};

/// Reading row on the dashboard's recent-readings feed
///
/// Unlike the analytics rows, these carry only the client id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentReading {
    /// Backend row identifier
    pub id: i64,

    /// Reporting device client identifier
    pub client_id: String,

    /// Temperature (°F)
    pub temperature: Option<f64>,

    /// Static pressure (PSI)
    pub static_pressure: Option<f64>,

    /// Differential pressure (IWC)
    pub differential_pressure: Option<f64>,

    /// Cumulative volume (MCF)
    pub volume: Option<f64>,

    /// Flow rate (MCF/day)
    pub total_volume_flow: Option<f64>,

    /// When the reading was taken (backend-local time)
    pub timestamp: NaiveDateTime,
}

/// Alarm row on the dashboard's recent-alarms timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentAlarm {
    /// Backend identifier
    pub id: i64,

    /// Owning device client identifier
    pub client_id: String,

    /// Parameter that tripped
    pub parameter: String,

    /// Observed value
    pub value: f64,

    /// Severity tier
    pub severity: AlarmSeverity,

    /// Whether an operator has acknowledged the alarm
    pub is_acknowledged: bool,

    /// When the alarm fired (backend-local time)
    pub triggered_at: NaiveDateTime,
}

/// System throughput and uptime figures
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SystemMetrics {
    /// Total stored readings
    pub total_readings: u64,

    /// Readings ingested in the last hour
    pub readings_last_hour: u64,

    /// Average ingest rate over the last hour
    pub readings_per_minute: f64,

    /// Share of devices that reported in the last five minutes
    pub uptime_percentage: f64,

    /// Devices known to the backend
    pub total_devices: u64,

    /// Devices that reported in the last five minutes
    pub active_devices: u64,
}

/// Fleet-wide per-parameter averages over a trailing window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FleetAverages {
    /// Mean temperature (°F)
    pub temperature: f64,

    /// Mean static pressure (PSI)
    pub static_pressure: f64,

    /// Mean differential pressure (IWC)
    pub differential_pressure: f64,

    /// Mean cumulative volume (MCF)
    pub volume: f64,

    /// Mean flow rate (MCF/day)
    pub total_volume_flow: f64,

    /// Window length in hours (absent when the window was empty)
    #[serde(default)]
    pub period_hours: Option<u32>,

    /// Readings in the window (absent when the window was empty)
    #[serde(default)]
    pub sample_count: Option<u64>,
}

impl ApiClient {
    /// Headline counters for the main dashboard cards
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.get_json("/dashboard/stats", &[]).await
    }

    /// Most recent readings across the whole fleet, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn latest_readings(&self, limit: Option<u32>) -> Result<Vec<RecentReading>> {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(format!("limit={limit}"));
        }
        self.get_json("/dashboard/recent-readings", &params).await
    }

    /// Most recent alarms for the dashboard timeline, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn latest_alarms(&self, limit: Option<u32>) -> Result<Vec<RecentAlarm>> {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(format!("limit={limit}"));
        }
        self.get_json("/dashboard/recent-alarms", &params).await
    }

    /// System throughput and uptime figures
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn system_metrics(&self) -> Result<SystemMetrics> {
        self.get_json("/dashboard/system-metrics", &[]).await
    }

    /// Fleet-wide parameter averages over the last `hours` hours
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn fleet_parameter_averages(&self, hours: Option<u32>) -> Result<FleetAverages> {
        let mut params = Vec::new();
        if let Some(hours) = hours {
            params.push(format!("hours={hours}"));
        }
        self.get_json("/dashboard/parameter-averages", &params).await
    }

    /// Per-device classified status overview, optionally filtered by
    /// device type
    ///
    /// The shape varies per parameter, so the payload is returned as raw
    /// JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn status_overview(
        &self,
        device_type: Option<DeviceType>,
    ) -> Result<serde_json::Value> {
        let mut params = Vec::new();
        if let Some(device_type) = device_type {
            params.push(format!("device_type={device_type}"));
        }
        self.get_json("/dashboard/status-overview", &params).await
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recent_reading_parses_naive_timestamp() {
        let json = r#"{
            "id": 1,
            "client_id": "SMS-I-003",
            "temperature": 74.2,
            "static_pressure": null,
            "differential_pressure": null,
            "volume": null,
            "total_volume_flow": 812.5,
            "timestamp": "2025-06-01T12:00:00"
        }"#;

        let reading: RecentReading = serde_json::from_str(json).unwrap();
        assert_eq!(reading.client_id, "SMS-I-003");
        assert_eq!(reading.total_volume_flow, Some(812.5));
    }

    #[test]
    fn test_system_metrics_deserialization() {
        let json = r#"{
            "total_readings": 120000,
            "readings_last_hour": 600,
            "readings_per_minute": 10.0,
            "uptime_percentage": 92.5,
            "total_devices": 40,
            "active_devices": 37
        }"#;

        let metrics: SystemMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.readings_last_hour, 600);
        assert_eq!(metrics.uptime_percentage, 92.5);
    }

    #[test]
    fn test_fleet_averages_empty_window() {
        // Backend omits period fields when no readings exist
        let json = r#"{
            "temperature": 0,
            "static_pressure": 0,
            "differential_pressure": 0,
            "volume": 0,
            "total_volume_flow": 0
        }"#;

        let averages: FleetAverages = serde_json::from_str(json).unwrap();
        assert_eq!(averages.sample_count, None);
    }
}
