//! Readings endpoints: pagination, recency windows, backend summaries and
//! CSV export

use crate::client::ApiClient;
use chrono::{DateTime, NaiveDateTime, Utc};
use flowdash_core::aggregate::{ParameterAverages, ParameterExtremes};
use flowdash_core::types::{DeviceReading, Paginated};
use flowdash_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Filters for the paginated readings endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReadingsQuery {
    /// Restrict to one device by numeric id (takes precedence over
    /// `client_id` on the backend)
    pub device_id: Option<i64>,

    /// Restrict to one device by client id
    pub client_id: Option<String>,

    /// Window start (inclusive)
    pub start_date: Option<DateTime<Utc>>,

    /// Window end (inclusive)
    pub end_date: Option<DateTime<Utc>>,

    /// 1-based page number
    pub page: Option<u32>,

    /// Rows per page (backend caps at 1000)
    pub page_size: Option<u32>,
}

impl ReadingsQuery {
    fn to_query(&self) -> Vec<String> {
        let mut params = Vec::new();
        if let Some(device_id) = self.device_id {
            params.push(format!("device_id={device_id}"));
        }
        if let Some(ref client_id) = self.client_id {
            params.push(format!("client_id={}", urlencoding::encode(client_id)));
        }
        if let Some(ref start) = self.start_date {
            params.push(format!(
                "start_date={}",
                urlencoding::encode(&start.to_rfc3339())
            ));
        }
        if let Some(ref end) = self.end_date {
            params.push(format!(
                "end_date={}",
                urlencoding::encode(&end.to_rfc3339())
            ));
        }
        if let Some(page) = self.page {
            params.push(format!("page={page}"));
        }
        if let Some(page_size) = self.page_size {
            params.push(format!("page_size={page_size}"));
        }
        params
    }
}

/// Summary statistics computed by the backend over a trailing window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingsSummary {
    /// Device filter in force, if any
    pub device_id: Option<i64>,

    /// Window length in days
    pub period_days: u32,

    /// Readings in the window
    pub total_readings: u64,

    /// Arithmetic means (empty object when the window is empty)
    #[serde(default)]
    pub averages: ParameterAverages,

    /// Minima
    #[serde(default)]
    pub min_values: ParameterExtremes,

    /// Maxima
    #[serde(default)]
    pub max_values: ParameterExtremes,
}

/// One row of a CSV readings export
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExportedReading {
    /// Owning device identifier
    #[serde(rename = "Device ID")]
    pub device_id: i64,

    /// Temperature (°F)
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,

    /// Static pressure (PSI)
    #[serde(rename = "Static Pressure")]
    pub static_pressure: Option<f64>,

    /// Differential pressure (IWC)
    #[serde(rename = "Differential Pressure")]
    pub differential_pressure: Option<f64>,

    /// Cumulative volume (MCF)
    #[serde(rename = "Volume")]
    pub volume: Option<f64>,

    /// Flow rate (MCF/day)
    #[serde(rename = "Total Volume Flow")]
    pub total_volume_flow: Option<f64>,

    /// Formatted as `%Y-%m-%d %H:%M:%S`
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl ExportedReading {
    /// Parse the formatted timestamp column
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] if the column does not match the export
    /// format.
    pub fn parsed_timestamp(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%d %H:%M:%S")
            .map_err(|e| Error::Export(format!("bad timestamp {:?}: {e}", self.timestamp)))
    }
}

impl ApiClient {
    /// Readings page matching the given filters, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn readings(&self, query: &ReadingsQuery) -> Result<Paginated<DeviceReading>> {
        self.get_json("/analytics/readings", &query.to_query()).await
    }

    /// Most recent readings for one device by numeric id
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn recent_readings(
        &self,
        device_id: i64,
        limit: Option<u32>,
    ) -> Result<Vec<DeviceReading>> {
        let mut params = Vec::new();
        if let Some(limit) = limit {
            params.push(format!("limit={limit}"));
        }
        self.get_json(&format!("/analytics/device/{device_id}/recent"), &params)
            .await
    }

    /// Backend-computed summary over the last `days` days
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn readings_summary(
        &self,
        device_id: Option<i64>,
        days: Option<u32>,
    ) -> Result<ReadingsSummary> {
        let mut params = Vec::new();
        if let Some(device_id) = device_id {
            params.push(format!("device_id={device_id}"));
        }
        if let Some(days) = days {
            params.push(format!("days={days}"));
        }
        self.get_json("/analytics/summary", &params).await
    }

    /// Download and parse a CSV export of readings
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] if a row cannot be parsed, or an HTTP
    /// error if the download fails.
    pub async fn export_readings_csv(
        &self,
        device_id: Option<i64>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Vec<ExportedReading>> {
        let mut params = Vec::new();
        if let Some(device_id) = device_id {
            params.push(format!("device_id={device_id}"));
        }
        if let Some(ref start) = start_date {
            params.push(format!(
                "start_date={}",
                urlencoding::encode(&start.to_rfc3339())
            ));
        }
        if let Some(ref end) = end_date {
            params.push(format!(
                "end_date={}",
                urlencoding::encode(&end.to_rfc3339())
            ));
        }

        let body = self
            .get_text("/analytics/readings/export/csv", &params)
            .await?;

        let mut reader = csv::Reader::from_reader(body.as_bytes());
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row.map_err(|e| Error::Export(format!("failed to parse export row: {e}")))?);
        }
        Ok(rows)
    }
}
