//! Derivation of a classified dashboard snapshot from the view state
//!
//! Pure transformation: takes whatever the pollers have committed and
//! produces one serializable structure with per-device parameter statuses,
//! section rollups, the hourly flow series, open alarms and drum levels.

use crate::state::ViewState;
use chrono::{DateTime, Utc};
use flowdash_client::SectionStatsResponse;
use flowdash_core::aggregate::{
    hourly_flow_series, section_rollup, FlowSample, HourlyFlow, SectionRollup, HOURLY_CHART_POINTS,
};
use flowdash_core::odorant::{estimate_level, DrumLevel};
use flowdash_core::status::{
    classify_parameter, online_status, Bounds, OnlineStatus, ParameterKind, ParameterStatus,
};
use flowdash_core::types::{
    Alarm, AlarmThreshold, DashboardStats, OdorantDrum, Reading, SectionId,
};
use serde::Serialize;
use std::collections::HashMap;

/// One classified sensor value on a device row
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParameterReport {
    /// Which parameter
    pub parameter: ParameterKind,

    /// Latest value, if the station reports this sensor
    pub value: Option<f64>,

    /// Classification against the effective bounds
    pub status: ParameterStatus,
}

/// One device on the snapshot, with liveness and classified parameters
#[derive(Debug, Clone, Serialize)]
pub struct DeviceStatusRow {
    /// Client identifier
    pub client_id: String,

    /// Display name
    pub device_name: Option<String>,

    /// Section the device belongs to
    pub section_id: Option<SectionId>,

    /// Liveness derived from the last report time
    pub online: OnlineStatus,

    /// Classified sensor values, one per parameter kind
    pub parameters: Vec<ParameterReport>,
}

/// A drum with its estimated liquid level
#[derive(Debug, Clone, Serialize)]
pub struct DrumReport {
    /// The drum as the backend reported it
    pub drum: OdorantDrum,

    /// Locally estimated level from cumulative flow
    pub level: DrumLevel,
}

/// Everything the dashboard renders, derived in one pass
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// When this snapshot was derived
    pub generated_at: DateTime<Utc>,

    /// Headline counters, when the dashboard poll has succeeded
    pub stats: Option<DashboardStats>,

    /// Per-device classified rows
    pub devices: Vec<DeviceStatusRow>,

    /// Section rollup computed locally from the device list
    pub sections: SectionRollup,

    /// Backend-computed section statistics, when available
    pub backend_sections: Option<SectionStatsResponse>,

    /// Hourly fleet flow series, oldest first
    pub hourly_flow: Vec<HourlyFlow>,

    /// Open alarms, most severe and most recent first
    pub unacknowledged_alarms: Vec<Alarm>,

    /// Drums with estimated levels
    pub drums: Vec<DrumReport>,
}

/// Effective bounds for one device and parameter.
///
/// Precedence: active device-specific threshold, then active global
/// threshold, then the built-in defaults (applied inside the classifier).
fn bounds_for(
    thresholds: &[AlarmThreshold],
    device_id: i64,
    kind: ParameterKind,
) -> Option<Bounds> {
    let mut global: Option<Bounds> = None;
    for threshold in thresholds {
        if !threshold.is_active || ParameterKind::parse(&threshold.parameter) != Some(kind) {
            continue;
        }
        let bounds = Bounds {
            low: threshold.low_threshold,
            high: threshold.high_threshold,
        };
        match threshold.device_id {
            Some(id) if id == device_id => return Some(bounds),
            None => global = Some(bounds),
            Some(_) => {}
        }
    }
    global
}

/// Latest value of one parameter on a reading.
///
/// Specific gravity is reported as a bare float where zero means "not
/// configured", so zero maps to absent.
fn parameter_value(reading: &Reading, kind: ParameterKind) -> Option<f64> {
    match kind {
        ParameterKind::Temperature => reading.temperature,
        ParameterKind::StaticPressure => reading.static_pressure,
        ParameterKind::DifferentialPressure => reading.differential_pressure,
        ParameterKind::Battery => reading.battery,
        ParameterKind::Volume => reading.volume,
        ParameterKind::TotalVolumeFlow => reading.total_volume_flow,
        ParameterKind::SpecificGravity => {
            (reading.specific_gravity > 0.0).then_some(reading.specific_gravity)
        }
    }
}

/// Derive a full snapshot from the current view state
#[must_use]
pub fn build_snapshot(state: &ViewState, now: DateTime<Utc>) -> DashboardSnapshot {
    let devices = state.devices.get().unwrap_or_default();
    let readings = state.readings.get().unwrap_or_default();
    let alarms = state.alarms.get().unwrap_or_default();
    let thresholds = state.thresholds.get().unwrap_or_default();
    let drums = state.drums.get().unwrap_or_default();

    let device_rows: Vec<DeviceStatusRow> = devices
        .iter()
        .map(|device| {
            let parameters = ParameterKind::ALL
                .into_iter()
                .map(|kind| {
                    let value = device
                        .latest_reading
                        .as_ref()
                        .and_then(|r| parameter_value(r, kind));
                    let bounds = bounds_for(&thresholds, device.id, kind);
                    ParameterReport {
                        parameter: kind,
                        value,
                        status: classify_parameter(kind, value, bounds),
                    }
                })
                .collect();

            DeviceStatusRow {
                client_id: device.client_id.clone(),
                device_name: device.device_name.clone(),
                section_id: device.section(),
                online: online_status(device.last_seen, now),
                parameters,
            }
        })
        .collect();

    let samples: Vec<FlowSample> = readings.iter().filter_map(FlowSample::from_reading).collect();

    let mut open_alarms: Vec<Alarm> = alarms
        .iter()
        .filter(|alarm| !alarm.is_acknowledged)
        .cloned()
        .collect();
    open_alarms.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.triggered_at.cmp(&a.triggered_at))
    });

    let drum_reports: Vec<DrumReport> = drums
        .iter()
        .map(|drum| DrumReport {
            level: estimate_level(
                drum.initial_level,
                drum.odorant_consumption_rate,
                drum.total_mmcf_consumed,
            ),
            drum: drum.clone(),
        })
        .collect();

    DashboardSnapshot {
        generated_at: now,
        stats: state.dashboard.get().map(|stats| *stats),
        devices: device_rows,
        sections: section_rollup(&devices),
        backend_sections: state.sections.get().map(|s| (*s).clone()),
        hourly_flow: hourly_flow_series(&samples, HOURLY_CHART_POINTS),
        unacknowledged_alarms: open_alarms,
        drums: drum_reports,
    }
}

/// Index thresholds by parameter for diagnostics output
#[must_use]
pub fn threshold_index(thresholds: &[AlarmThreshold]) -> HashMap<String, Vec<&AlarmThreshold>> {
    let mut by_parameter: HashMap<String, Vec<&AlarmThreshold>> = HashMap::new();
    for threshold in thresholds {
        by_parameter
            .entry(threshold.parameter.clone())
            .or_default()
            .push(threshold);
    }
    by_parameter
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flowdash_core::status::StatusLabel;
    use flowdash_core::types::{
        AlarmSeverity, Device, DeviceReading, DeviceType, ThresholdType,
    };
    use pretty_assertions::assert_eq;

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0).unwrap()
    }

    fn device(id: i64, client_id: &str, last_seen: Option<DateTime<Utc>>) -> Device {
        Device {
            id,
            client_id: client_id.to_string(),
            device_name: Some(format!("{client_id} station")),
            device_type: DeviceType::Sms,
            location: None,
            latitude: None,
            longitude: None,
            is_active: true,
            last_seen,
            latest_reading: Some(Reading {
                timestamp: last_seen.unwrap_or_else(|| ts(0, 0)),
                temperature: Some(75.0),
                static_pressure: Some(950.0), // above the 900 default high
                battery: Some(12.5),
                ..Reading::default()
            }),
            section_id: None,
        }
    }

    fn threshold(
        id: i64,
        device_id: Option<i64>,
        parameter: &str,
        low: Option<f64>,
        high: Option<f64>,
    ) -> AlarmThreshold {
        AlarmThreshold {
            id,
            device_id,
            parameter: parameter.to_string(),
            low_threshold: low,
            high_threshold: high,
            is_active: true,
        }
    }

    fn alarm(id: i64, severity: AlarmSeverity, triggered_at: DateTime<Utc>, ack: bool) -> Alarm {
        Alarm {
            id,
            device_id: 1,
            client_id: "SMS-I-001".to_string(),
            parameter: "static_pressure".to_string(),
            value: 950.0,
            threshold_type: ThresholdType::High,
            severity,
            is_acknowledged: ack,
            acknowledged_by: None,
            acknowledged_at: None,
            triggered_at,
            resolved_at: None,
        }
    }

    #[test]
    fn test_empty_state_yields_empty_snapshot() {
        let state = ViewState::default();
        let snapshot = build_snapshot(&state, ts(12, 0));

        assert!(snapshot.devices.is_empty());
        assert!(snapshot.stats.is_none());
        assert!(snapshot.hourly_flow.is_empty());
        assert!(snapshot.unacknowledged_alarms.is_empty());
        // The local rollup still emits the five named sections
        assert_eq!(snapshot.sections.sections.len(), 5);
    }

    #[test]
    fn test_device_rows_classified_with_defaults() {
        let state = ViewState::default();
        let ticket = state.devices.ticket();
        state
            .devices
            .commit(ticket, vec![device(1, "SMS-I-001", Some(ts(11, 58)))]);

        let snapshot = build_snapshot(&state, ts(12, 0));
        let row = &snapshot.devices[0];

        assert_eq!(row.online, OnlineStatus::Online);
        assert_eq!(row.section_id.as_deref(), Some("I"));

        let pressure = row
            .parameters
            .iter()
            .find(|p| p.parameter == ParameterKind::StaticPressure)
            .unwrap();
        // 950 is above the 900 default high bound
        assert_eq!(pressure.status.label, StatusLabel::High);

        let gravity = row
            .parameters
            .iter()
            .find(|p| p.parameter == ParameterKind::SpecificGravity)
            .unwrap();
        // Zero specific gravity means not configured
        assert_eq!(gravity.value, None);
        assert_eq!(gravity.status.label, StatusLabel::Unknown);
    }

    #[test]
    fn test_threshold_precedence_device_over_global() {
        let thresholds = vec![
            threshold(1, None, "static_pressure", Some(50.0), Some(500.0)),
            threshold(2, Some(7), "static_pressure", Some(100.0), Some(1200.0)),
        ];

        // Device 7 gets its own bounds
        let own = bounds_for(&thresholds, 7, ParameterKind::StaticPressure).unwrap();
        assert_eq!(own.high, Some(1200.0));

        // Everyone else falls back to the global row
        let other = bounds_for(&thresholds, 3, ParameterKind::StaticPressure).unwrap();
        assert_eq!(other.high, Some(500.0));

        // No row for this parameter at all
        assert!(bounds_for(&thresholds, 7, ParameterKind::Battery).is_none());
    }

    #[test]
    fn test_inactive_thresholds_ignored() {
        let mut row = threshold(1, None, "battery", Some(10.0), Some(16.0));
        row.is_active = false;

        assert!(bounds_for(&[row], 1, ParameterKind::Battery).is_none());
    }

    #[test]
    fn test_alarms_sorted_severity_then_recency() {
        let state = ViewState::default();
        let ticket = state.alarms.ticket();
        state.alarms.commit(
            ticket,
            vec![
                alarm(1, AlarmSeverity::Medium, ts(10, 0), false),
                alarm(2, AlarmSeverity::High, ts(9, 0), false),
                alarm(3, AlarmSeverity::High, ts(11, 0), false),
                alarm(4, AlarmSeverity::High, ts(11, 30), true), // acknowledged
            ],
        );

        let snapshot = build_snapshot(&state, ts(12, 0));
        let ids: Vec<i64> = snapshot.unacknowledged_alarms.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_hourly_flow_from_readings() {
        let state = ViewState::default();
        let ticket = state.readings.ticket();
        state.readings.commit(
            ticket,
            vec![
                DeviceReading {
                    id: 1,
                    device_id: 1,
                    client_id: "SMS-I-001".to_string(),
                    reading: Reading {
                        timestamp: ts(10, 15),
                        total_volume_flow: Some(100.0),
                        ..Reading::default()
                    },
                },
                DeviceReading {
                    id: 2,
                    device_id: 2,
                    client_id: "SMS-II-001".to_string(),
                    reading: Reading {
                        timestamp: ts(10, 30),
                        total_volume_flow: Some(40.0),
                        ..Reading::default()
                    },
                },
            ],
        );

        let snapshot = build_snapshot(&state, ts(12, 0));
        assert_eq!(snapshot.hourly_flow.len(), 1);
        assert_eq!(snapshot.hourly_flow[0].total_flow, 140.0);
        assert_eq!(snapshot.hourly_flow[0].device_count, 2);
    }

    #[test]
    fn test_drum_levels_estimated() {
        let drum = OdorantDrum {
            id: 9,
            device_id: 1,
            section_id: 1,
            section_name: Some("Section I".to_string()),
            station_name: "Vehari".to_string(),
            refill_date: ts(0, 0),
            initial_level: 200.0,
            current_level: 150.0,
            total_mmcf_consumed: 100.0,
            odorant_used: 50.0,
            odorant_consumption_rate: 0.5,
            percentage_remaining: 75.0,
            is_active: true,
        };

        let state = ViewState::default();
        let ticket = state.drums.ticket();
        state.drums.commit(ticket, vec![drum]);

        let snapshot = build_snapshot(&state, ts(12, 0));
        let report = &snapshot.drums[0];
        assert_eq!(report.level.remaining, 150.0);
        assert_eq!(report.level.percent_remaining, 75);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let state = ViewState::default();
        let ticket = state.devices.ticket();
        state
            .devices
            .commit(ticket, vec![device(1, "SMS-I-001", Some(ts(11, 58)))]);

        let snapshot = build_snapshot(&state, ts(12, 0));
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json["devices"][0]["parameters"].is_array());
        assert_eq!(json["devices"][0]["online"], "online");
    }

    #[test]
    fn test_threshold_index_groups_by_parameter() {
        let rows = vec![
            threshold(1, None, "battery", Some(10.0), None),
            threshold(2, Some(7), "battery", Some(11.0), None),
            threshold(3, None, "temperature", None, Some(110.0)),
        ];

        let index = threshold_index(&rows);
        assert_eq!(index["battery"].len(), 2);
        assert_eq!(index["temperature"].len(), 1);
    }
}
