//! Client-side aggregation of already-fetched telemetry
//!
//! All functions here are single-pass transformations over flat reading
//! records; nothing is persisted and everything is recomputed on each data
//! refresh.

use crate::types::{Device, DeviceReading, SectionId, SectionStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of hourly points the dashboard flow chart shows
pub const HOURLY_CHART_POINTS: usize = 24;

/// Unit label for aggregated flow figures
pub const FLOW_UNIT: &str = "MCF/day";

/// A flow observation tagged with its reporting device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowSample {
    /// Reporting device
    pub client_id: String,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Flow rate at that time (MCF/day)
    pub flow: f64,
}

impl FlowSample {
    /// Extract a flow sample from a fetched reading row, if it carries flow
    #[must_use]
    pub fn from_reading(row: &DeviceReading) -> Option<Self> {
        row.reading.total_volume_flow.map(|flow| Self {
            client_id: row.client_id.clone(),
            timestamp: row.reading.timestamp,
            flow,
        })
    }
}

/// One aggregated point on the hourly flow chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyFlow {
    /// Start of the calendar hour (UTC)
    pub hour: DateTime<Utc>,

    /// Sum of per-device flow for that hour
    pub total_flow: f64,

    /// Number of devices contributing to the sum
    pub device_count: usize,
}

/// Aggregate flow samples into at most `max_points` hourly chart points.
///
/// Samples are grouped by (device, calendar hour); within each group only
/// the chronologically latest sample survives, so several reports from one
/// device inside the same hour are never double-counted. Surviving values
/// are summed across devices per hour and the most recent `max_points`
/// hours are returned oldest first.
#[must_use]
pub fn hourly_flow_series(samples: &[FlowSample], max_points: usize) -> Vec<HourlyFlow> {
    // Latest sample per (device, hour)
    let mut latest: HashMap<(&str, i64), (DateTime<Utc>, f64)> = HashMap::new();
    for sample in samples {
        let hour_key = sample.timestamp.timestamp().div_euclid(3600);
        match latest.entry((sample.client_id.as_str(), hour_key)) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                if sample.timestamp >= entry.get().0 {
                    entry.insert((sample.timestamp, sample.flow));
                }
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert((sample.timestamp, sample.flow));
            }
        }
    }

    // Sum the survivors across devices per hour
    let mut per_hour: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for ((_, hour_key), (_, flow)) in latest {
        let slot = per_hour.entry(hour_key).or_insert((0.0, 0));
        slot.0 += flow;
        slot.1 += 1;
    }

    let skip = per_hour.len().saturating_sub(max_points);
    per_hour
        .into_iter()
        .skip(skip)
        .filter_map(|(hour_key, (total_flow, device_count))| {
            DateTime::<Utc>::from_timestamp(hour_key * 3600, 0).map(|hour| HourlyFlow {
                hour,
                total_flow,
                device_count,
            })
        })
        .collect()
}

/// Per-parameter arithmetic means over a reading window
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ParameterAverages {
    /// Mean temperature (°F)
    pub temperature: Option<f64>,

    /// Mean static pressure (PSI)
    pub static_pressure: Option<f64>,

    /// Mean differential pressure (IWC)
    pub differential_pressure: Option<f64>,

    /// Mean cumulative volume (MCF)
    pub volume: Option<f64>,

    /// Mean flow rate (MCF/day)
    pub total_volume_flow: Option<f64>,
}

/// Per-parameter extremes over a reading window
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ParameterExtremes {
    /// Temperature extreme (°F)
    pub temperature: Option<f64>,

    /// Static pressure extreme (PSI)
    pub static_pressure: Option<f64>,

    /// Differential pressure extreme (IWC)
    pub differential_pressure: Option<f64>,
}

/// Summary statistics over a fetched reading window
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsSummary {
    /// Number of readings in the window
    pub total_readings: usize,

    /// Arithmetic means
    pub averages: ParameterAverages,

    /// Minima
    pub min_values: ParameterExtremes,

    /// Maxima
    pub max_values: ParameterExtremes,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0_usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn fold_min(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
}

fn fold_max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

/// Summarize a reading window: count, means, minima and maxima.
///
/// Missing sensor fields are skipped, not treated as zero.
#[must_use]
pub fn summarize(readings: &[DeviceReading]) -> AnalyticsSummary {
    AnalyticsSummary {
        total_readings: readings.len(),
        averages: ParameterAverages {
            temperature: mean(readings.iter().filter_map(|r| r.reading.temperature)),
            static_pressure: mean(readings.iter().filter_map(|r| r.reading.static_pressure)),
            differential_pressure: mean(
                readings
                    .iter()
                    .filter_map(|r| r.reading.differential_pressure),
            ),
            volume: mean(readings.iter().filter_map(|r| r.reading.volume)),
            total_volume_flow: mean(readings.iter().filter_map(|r| r.reading.total_volume_flow)),
        },
        min_values: ParameterExtremes {
            temperature: fold_min(readings.iter().filter_map(|r| r.reading.temperature)),
            static_pressure: fold_min(readings.iter().filter_map(|r| r.reading.static_pressure)),
            differential_pressure: fold_min(
                readings
                    .iter()
                    .filter_map(|r| r.reading.differential_pressure),
            ),
        },
        max_values: ParameterExtremes {
            temperature: fold_max(readings.iter().filter_map(|r| r.reading.temperature)),
            static_pressure: fold_max(readings.iter().filter_map(|r| r.reading.static_pressure)),
            differential_pressure: fold_max(
                readings
                    .iter()
                    .filter_map(|r| r.reading.differential_pressure),
            ),
        },
    }
}

/// The five named pipeline sections, in display order
pub const SECTION_ORDER: [&str; 5] = ["I", "II", "III", "IV", "V"];

/// Normalize a section identifier: station ids occur in both `SMS-II-…`
/// and `SMS-2-…` form, so Arabic digits map onto Roman numerals.
#[must_use]
pub fn normalize_section(section: &str) -> SectionId {
    match section {
        "1" => "I".to_string(),
        "2" => "II".to_string(),
        "3" => "III".to_string(),
        "4" => "IV".to_string(),
        "5" => "V".to_string(),
        other => other.to_string(),
    }
}

/// Per-section rollup of a device list plus the fleet-wide total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionRollup {
    /// One entry per section with at least the five named sections, plus
    /// `OTHER` when non-station devices exist
    pub sections: Vec<SectionStats>,

    /// Fleet-wide totals
    pub all_sms: SectionStats,
}

/// Roll a device list up into per-section statistics.
///
/// Each device contributes its latest flow rate to its section's
/// cumulative figure; devices without a parseable section land in the
/// `OTHER` bucket, which is only emitted when non-empty.
#[must_use]
pub fn section_rollup(devices: &[Device]) -> SectionRollup {
    let mut by_section: HashMap<SectionId, (u64, u64, f64)> = HashMap::new();

    let mut total_count = 0_u64;
    let mut total_active = 0_u64;
    let mut total_flow = 0.0_f64;

    for device in devices {
        let section = device
            .section()
            .map_or_else(|| "OTHER".to_string(), |s| normalize_section(&s));
        let flow = device
            .latest_reading
            .as_ref()
            .and_then(|r| r.total_volume_flow)
            .unwrap_or(0.0);

        let slot = by_section.entry(section).or_insert((0, 0, 0.0));
        slot.0 += 1;
        if device.is_active {
            slot.1 += 1;
            total_active += 1;
        }
        slot.2 += flow;

        total_count += 1;
        total_flow += flow;
    }

    let mut sections = Vec::with_capacity(SECTION_ORDER.len() + 1);
    for section in SECTION_ORDER {
        let (count, active, flow) = by_section.remove(section).unwrap_or((0, 0, 0.0));
        sections.push(SectionStats {
            section_id: section.to_string(),
            section_name: format!("Section {section}"),
            sms_count: count,
            active_sms: active,
            cumulative_volume_flow: flow,
            unit: FLOW_UNIT.to_string(),
        });
    }

    // Anything left over (including OTHER) appends after the named sections
    let mut rest: Vec<_> = by_section.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));
    for (section, (count, active, flow)) in rest {
        let section_name = if section == "OTHER" {
            "Other Devices".to_string()
        } else {
            format!("Section {section}")
        };
        sections.push(SectionStats {
            section_id: section,
            section_name,
            sms_count: count,
            active_sms: active,
            cumulative_volume_flow: flow,
            unit: FLOW_UNIT.to_string(),
        });
    }

    SectionRollup {
        sections,
        all_sms: SectionStats {
            section_id: "ALL".to_string(),
            section_name: "All SMS".to_string(),
            sms_count: total_count,
            active_sms: total_active,
            cumulative_volume_flow: total_flow,
            unit: FLOW_UNIT.to_string(),
        },
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::{DeviceType, Reading};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0).unwrap()
    }

    fn sample(client_id: &str, at: DateTime<Utc>, flow: f64) -> FlowSample {
        FlowSample {
            client_id: client_id.to_string(),
            timestamp: at,
            flow,
        }
    }

    #[test]
    fn test_hourly_series_empty() {
        assert!(hourly_flow_series(&[], HOURLY_CHART_POINTS).is_empty());
    }

    #[test]
    fn test_hourly_series_latest_per_device_hour_wins() {
        // Three reports from one device inside one hour: only the 10:45
        // value may count
        let samples = vec![
            sample("SMS-I-001", ts(10, 5), 100.0),
            sample("SMS-I-001", ts(10, 45), 140.0),
            sample("SMS-I-001", ts(10, 20), 120.0),
        ];

        let series = hourly_flow_series(&samples, HOURLY_CHART_POINTS);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].total_flow, 140.0);
        assert_eq!(series[0].device_count, 1);
        assert_eq!(series[0].hour, ts(10, 0));
    }

    #[test]
    fn test_hourly_series_sums_across_devices() {
        let samples = vec![
            sample("SMS-I-001", ts(10, 30), 100.0),
            sample("SMS-II-007", ts(10, 15), 50.0),
            sample("SMS-I-001", ts(11, 10), 90.0),
        ];

        let series = hourly_flow_series(&samples, HOURLY_CHART_POINTS);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].total_flow, 150.0);
        assert_eq!(series[0].device_count, 2);
        assert_eq!(series[1].total_flow, 90.0);
    }

    #[test]
    fn test_hourly_series_truncates_to_most_recent() {
        let samples: Vec<_> = (0..30)
            .map(|h| sample("SMS-I-001", ts(h % 24, 0) + chrono::Duration::days(i64::from(h / 24)), f64::from(h)))
            .collect();

        let series = hourly_flow_series(&samples, HOURLY_CHART_POINTS);
        assert_eq!(series.len(), HOURLY_CHART_POINTS);
        // Oldest first, and the oldest surviving point is hour 6
        assert_eq!(series[0].total_flow, 6.0);
        assert_eq!(series[23].total_flow, 29.0);
    }

    #[test]
    fn test_hourly_series_oldest_first() {
        let samples = vec![
            sample("SMS-I-001", ts(12, 0), 1.0),
            sample("SMS-I-001", ts(9, 0), 2.0),
            sample("SMS-I-001", ts(15, 0), 3.0),
        ];

        let series = hourly_flow_series(&samples, HOURLY_CHART_POINTS);
        let hours: Vec<_> = series.iter().map(|p| p.hour).collect();
        assert_eq!(hours, vec![ts(9, 0), ts(12, 0), ts(15, 0)]);
    }

    fn reading_row(id: i64, temperature: Option<f64>, flow: Option<f64>) -> DeviceReading {
        DeviceReading {
            id,
            device_id: 1,
            client_id: "SMS-I-001".to_string(),
            reading: Reading {
                timestamp: ts(10, 0),
                temperature,
                total_volume_flow: flow,
                ..Reading::default()
            },
        }
    }

    #[test]
    fn test_summarize_empty_window() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_readings, 0);
        assert_eq!(summary.averages.temperature, None);
        assert_eq!(summary.min_values.temperature, None);
    }

    #[test]
    fn test_summarize_skips_missing_fields() {
        let rows = vec![
            reading_row(1, Some(70.0), Some(100.0)),
            reading_row(2, None, Some(200.0)),
            reading_row(3, Some(90.0), None),
        ];

        let summary = summarize(&rows);
        assert_eq!(summary.total_readings, 3);
        assert_eq!(summary.averages.temperature, Some(80.0));
        assert_eq!(summary.averages.total_volume_flow, Some(150.0));
        assert_eq!(summary.min_values.temperature, Some(70.0));
        assert_eq!(summary.max_values.temperature, Some(90.0));
    }

    fn device(client_id: &str, active: bool, flow: Option<f64>) -> Device {
        Device {
            id: 0,
            client_id: client_id.to_string(),
            device_name: None,
            device_type: DeviceType::Sms,
            location: None,
            latitude: None,
            longitude: None,
            is_active: active,
            last_seen: None,
            latest_reading: flow.map(|f| Reading {
                timestamp: ts(10, 0),
                total_volume_flow: Some(f),
                ..Reading::default()
            }),
            section_id: None,
        }
    }

    #[test]
    fn test_section_rollup_groups_and_totals() {
        let devices = vec![
            device("SMS-I-001", true, Some(100.0)),
            device("SMS-I-002", false, Some(50.0)),
            device("SMS-2-001", true, Some(25.0)), // Arabic form of II
            device("modem2", true, Some(5.0)),
        ];

        let rollup = section_rollup(&devices);

        let section_one = &rollup.sections[0];
        assert_eq!(section_one.section_id, "I");
        assert_eq!(section_one.sms_count, 2);
        assert_eq!(section_one.active_sms, 1);
        assert_eq!(section_one.cumulative_volume_flow, 150.0);

        let section_two = &rollup.sections[1];
        assert_eq!(section_two.section_id, "II");
        assert_eq!(section_two.cumulative_volume_flow, 25.0);

        let other = rollup
            .sections
            .iter()
            .find(|s| s.section_id == "OTHER")
            .unwrap();
        assert_eq!(other.sms_count, 1);
        assert_eq!(other.section_name, "Other Devices");

        assert_eq!(rollup.all_sms.sms_count, 4);
        assert_eq!(rollup.all_sms.active_sms, 3);
        assert_eq!(rollup.all_sms.cumulative_volume_flow, 180.0);
    }

    #[test]
    fn test_section_rollup_emits_empty_named_sections() {
        let rollup = section_rollup(&[device("SMS-III-001", true, None)]);

        assert_eq!(rollup.sections.len(), 5);
        assert_eq!(rollup.sections[2].sms_count, 1);
        assert_eq!(rollup.sections[0].sms_count, 0);
        assert!(rollup.sections.iter().all(|s| s.unit == FLOW_UNIT));
    }

    #[test]
    fn test_normalize_section() {
        assert_eq!(normalize_section("2"), "II");
        assert_eq!(normalize_section("V"), "V");
        assert_eq!(normalize_section("OTHER"), "OTHER");
    }

    proptest! {
        /// Two readings from the same device in the same hour never both
        /// count toward the hourly total.
        #[test]
        fn test_no_double_counting_within_hour(
            flows in proptest::collection::vec(0.0_f64..1000.0, 2..20),
            minutes in proptest::collection::vec(0_u32..60, 2..20),
        ) {
            let n = flows.len().min(minutes.len());
            let samples: Vec<_> = flows.iter().zip(&minutes).take(n)
                .map(|(&flow, &minute)| sample("SMS-I-001", ts(10, minute), flow))
                .collect();

            let series = hourly_flow_series(&samples, HOURLY_CHART_POINTS);
            prop_assert_eq!(series.len(), 1);
            prop_assert_eq!(series[0].device_count, 1);
            // The surviving flow is one of the inputs, not a sum of them
            prop_assert!(flows.iter().take(n).any(|&f| (f - series[0].total_flow).abs() < 1e-9));
        }

        /// The series never exceeds the requested point budget.
        #[test]
        fn test_series_respects_budget(
            hours in proptest::collection::vec(0_u32..240, 0..60),
            budget in 1_usize..48,
        ) {
            let samples: Vec<_> = hours.iter()
                .map(|&h| sample("SMS-I-001", ts(0, 0) + chrono::Duration::hours(i64::from(h)), 1.0))
                .collect();
            let series = hourly_flow_series(&samples, budget);
            prop_assert!(series.len() <= budget);
        }
    }
}
