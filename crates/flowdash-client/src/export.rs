//! Bulk export downloads: per-device, per-section and fleet-wide files

use crate::client::ApiClient;
use chrono::{DateTime, Utc};
use flowdash_core::Result;

/// File format of a bulk export download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain CSV
    Csv,
    /// Styled Excel workbook
    Excel,
}

impl ExportFormat {
    /// Query parameter value the backend expects
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
        }
    }
}

fn export_query(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    format: ExportFormat,
) -> Vec<String> {
    vec![
        format!("start={}", urlencoding::encode(&start.to_rfc3339())),
        format!("end={}", urlencoding::encode(&end.to_rfc3339())),
        format!("format={}", format.as_str()),
    ]
}

impl ApiClient {
    /// Download the readings of one device over a window as a formatted
    /// file. The body is returned as raw bytes; CSV content can be handed
    /// to a parser, Excel content written out as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the download cannot be read.
    pub async fn export_device(
        &self,
        device_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        self.get_bytes(
            &format!("/export/device/{device_id}"),
            &export_query(start, end, format),
        )
        .await
    }

    /// Download the readings of every device in one section over a window
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the download cannot be read.
    pub async fn export_section(
        &self,
        section_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        self.get_bytes(
            &format!("/export/section/{}", urlencoding::encode(section_id)),
            &export_query(start, end, format),
        )
        .await
    }

    /// Download the readings of the whole fleet over a window
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the download cannot be read.
    pub async fn export_all(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        self.get_bytes("/export/all", &export_query(start, end, format))
            .await
    }
}
