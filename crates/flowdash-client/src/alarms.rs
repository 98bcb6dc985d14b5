//! Alarm endpoints: listing, acknowledgement, monitoring toggle and
//! threshold management

use crate::client::{validated, ApiClient, MessageResponse};
use flowdash_core::types::{Alarm, AlarmSeverity, AlarmThreshold, ThresholdUpsert};
use flowdash_core::Result;
use serde::{Deserialize, Serialize};

/// Filters for the alarm list endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlarmQuery {
    /// Filter on the acknowledged flag
    pub acknowledged: Option<bool>,

    /// Filter on severity
    pub severity: Option<AlarmSeverity>,

    /// Maximum rows returned (backend default 100)
    pub limit: Option<u32>,
}

/// Fleet-wide alarm counters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlarmStats {
    /// All alarms ever recorded
    pub total_alarms: u64,

    /// Unacknowledged alarms
    pub active_alarms: u64,

    /// Unacknowledged critical alarms
    pub critical_alarms: u64,
}

/// Whether background alarm evaluation is running
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitoringStatus {
    /// Evaluation enabled flag
    pub enabled: bool,

    /// Present on toggle responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of the delete-all endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlarmsDeleted {
    /// Outcome description
    pub message: String,

    /// Alarms removed
    pub deleted_count: u64,
}

impl ApiClient {
    /// List alarms, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_alarms(&self, query: &AlarmQuery) -> Result<Vec<Alarm>> {
        let mut params = Vec::new();
        if let Some(acknowledged) = query.acknowledged {
            params.push(format!("acknowledged={acknowledged}"));
        }
        if let Some(severity) = query.severity {
            params.push(format!("severity={severity}"));
        }
        if let Some(limit) = query.limit {
            params.push(format!("limit={limit}"));
        }
        self.get_json("/alarms/", &params).await
    }

    /// Fleet-wide alarm counters
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn alarm_stats(&self) -> Result<AlarmStats> {
        self.get_json("/alarms/stats", &[]).await
    }

    /// Alarms grouped by pipeline section, with per-section device counts
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn alarms_by_section(&self) -> Result<serde_json::Value> {
        self.get_json("/alarms/by-section", &[]).await
    }

    /// Mark an alarm as acknowledged by the logged-in user
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::NotFound`] for an unknown alarm id.
    pub async fn acknowledge_alarm(&self, alarm_id: i64) -> Result<MessageResponse> {
        self.put_empty(&format!("/alarms/{alarm_id}/acknowledge"))
            .await
    }

    /// Delete one alarm
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_alarm(&self, alarm_id: i64) -> Result<MessageResponse> {
        self.delete_json(&format!("/alarms/{alarm_id}")).await
    }

    /// Delete every alarm
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_all_alarms(&self) -> Result<AlarmsDeleted> {
        self.delete_json("/alarms/").await
    }

    /// Current alarm monitoring flag
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn monitoring_status(&self) -> Result<MonitoringStatus> {
        self.get_json("/alarms/monitoring/status", &[]).await
    }

    /// Flip alarm monitoring on or off
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn toggle_monitoring(&self) -> Result<MonitoringStatus> {
        self.post_empty("/alarms/monitoring/toggle").await
    }

    /// List configured alarm thresholds
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn list_thresholds(&self) -> Result<Vec<AlarmThreshold>> {
        self.get_json("/alarms/thresholds", &[]).await
    }

    /// Create an alarm threshold
    ///
    /// # Errors
    ///
    /// Returns [`flowdash_core::Error::Validation`] if the payload fails
    /// local validation.
    pub async fn create_threshold(&self, payload: &ThresholdUpsert) -> Result<AlarmThreshold> {
        validated(payload)?;
        self.post_json("/alarms/thresholds", payload).await
    }

    /// Update an alarm threshold
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    pub async fn update_threshold(
        &self,
        threshold_id: i64,
        payload: &ThresholdUpsert,
    ) -> Result<AlarmThreshold> {
        validated(payload)?;
        self.put_json(&format!("/alarms/thresholds/{threshold_id}"), payload)
            .await
    }

    /// Delete an alarm threshold
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_threshold(&self, threshold_id: i64) -> Result<MessageResponse> {
        self.delete_json(&format!("/alarms/thresholds/{threshold_id}"))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_alarm_stats_deserialization() {
        let json = r#"{"total_alarms": 42, "active_alarms": 5, "critical_alarms": 1}"#;
        let stats: AlarmStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_alarms, 42);
        assert_eq!(stats.critical_alarms, 1);
    }

    #[test]
    fn test_monitoring_status_without_message() {
        let status: MonitoringStatus = serde_json::from_str(r#"{"enabled": true}"#).unwrap();
        assert!(status.enabled);
        assert_eq!(status.message, None);
    }
}
