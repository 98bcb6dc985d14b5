//! Pipeline section rollup endpoints

use crate::client::ApiClient;
use chrono::NaiveDateTime;
use flowdash_core::types::{Device, SectionStats};
use flowdash_core::Result;
use serde::{Deserialize, Serialize};

/// Per-section statistics plus the fleet-wide total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionStatsResponse {
    /// One row per section: the five named sections in order, plus
    /// `OTHER` when non-station devices exist
    pub sections: Vec<SectionStats>,

    /// Fleet-wide totals under the `ALL` pseudo section
    pub all_sms: SectionStats,

    /// Server time the rollup was computed
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

/// Device list of one section with counters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionDevices {
    /// Section identifier (`I`..`V`, `OTHER`, or `ALL`)
    pub section_id: String,

    /// Display name
    pub section_name: String,

    /// Devices in the section
    pub device_count: u64,

    /// Station count (same as `device_count` on current backends)
    pub sms_count: u64,

    /// Devices currently marked active
    pub online_count: u64,

    /// Devices currently marked inactive
    pub offline_count: u64,

    /// The devices themselves, each with its latest reading
    pub devices: Vec<Device>,
}

/// An averaged measurement with its unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AverageMeasurement {
    /// Arithmetic mean across the section's latest readings
    pub average: f64,

    /// Unit label
    pub unit: String,
}

/// A totalled measurement with its unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TotalMeasurement {
    /// Sum across the section's latest readings
    pub total: f64,

    /// Unit label
    pub unit: String,
}

/// A cumulative flow figure with its unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CumulativeMeasurement {
    /// Summed flow rate across the section's latest readings
    pub cumulative: f64,

    /// Unit label
    pub unit: String,
}

/// Measurement block of a section summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionMeasurements {
    /// Mean temperature
    pub temperature: AverageMeasurement,

    /// Mean static pressure
    pub pressure: AverageMeasurement,

    /// Mean differential pressure
    pub differential_pressure: AverageMeasurement,

    /// Total volume
    pub volume: TotalMeasurement,

    /// Cumulative flow
    pub total_volume_flow: CumulativeMeasurement,
}

/// Detailed summary for one section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionSummary {
    /// Section identifier
    pub section_id: String,

    /// Stations in the section
    pub sms_count: u64,

    /// Currently active stations
    pub active_sms: u64,

    /// Aggregated measurements from the stations' latest readings
    pub measurements: SectionMeasurements,
}

impl ApiClient {
    /// Statistics for all sections plus the fleet total
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn section_stats(&self) -> Result<SectionStatsResponse> {
        self.get_json("/sections/stats", &[]).await
    }

    /// Devices of one section (`I`..`V`, `OTHER`, or `ALL`)
    ///
    /// # Errors
    ///
    /// Returns an error if the section id is rejected or the request fails.
    pub async fn section_devices(&self, section_id: &str) -> Result<SectionDevices> {
        self.get_json(
            &format!("/sections/{}/devices", urlencoding::encode(section_id)),
            &[],
        )
        .await
    }

    /// Detailed measurement summary for one section
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::NotFound`] when the section has no
    /// devices, or an error if the request fails.
    pub async fn section_summary(&self, section_id: &str) -> Result<SectionSummary> {
        self.get_json(
            &format!("/sections/{}/summary", urlencoding::encode(section_id)),
            &[],
        )
        .await
    }
}
