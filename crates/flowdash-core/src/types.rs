//! Core data types for the flowdash telemetry toolkit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Device client identifier type (e.g. `SMS-II-023`)
pub type ClientId = String;

/// Section identifier type (Roman numeral `I`..`V`, or `OTHER`/`ALL`)
pub type SectionId = String;

/// Kind of metering hardware reporting telemetry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceType {
    /// Sales metering station (the common case)
    Sms,
    /// Electronic volume corrector
    Evc,
    /// Flow computer
    Fc,
}

impl Default for DeviceType {
    fn default() -> Self {
        Self::Sms
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sms => write!(f, "SMS"),
            Self::Evc => write!(f, "EVC"),
            Self::Fc => write!(f, "FC"),
        }
    }
}

/// A flat telemetry record reported by a device on each poll
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Temperature (°F)
    pub temperature: Option<f64>,

    /// Static pressure (PSI)
    pub static_pressure: Option<f64>,

    /// Differential pressure (IWC)
    pub differential_pressure: Option<f64>,

    /// Maximum static pressure over the reporting window (PSI)
    pub max_static_pressure: Option<f64>,

    /// Minimum static pressure over the reporting window (PSI)
    pub min_static_pressure: Option<f64>,

    /// Battery voltage (V)
    pub battery: Option<f64>,

    /// Cumulative volume (MCF)
    pub volume: Option<f64>,

    /// Computed flow rate (MCF/day)
    pub total_volume_flow: Option<f64>,

    /// Flow time over the last hour
    #[serde(default)]
    pub last_hour_flow_time: f64,

    /// Average differential pressure over the last hour (IWC)
    #[serde(default)]
    pub last_hour_diff_pressure: f64,

    /// Average static pressure over the last hour (PSI)
    #[serde(default)]
    pub last_hour_static_pressure: f64,

    /// Average temperature over the last hour (°F)
    #[serde(default)]
    pub last_hour_temperature: f64,

    /// Volume accumulated over the last hour (MCF)
    #[serde(default)]
    pub last_hour_volume: f64,

    /// Energy accumulated over the last hour
    #[serde(default)]
    pub last_hour_energy: f64,

    /// Specific gravity in use
    #[serde(default)]
    pub specific_gravity: f64,
}

/// A reading as returned by the readings/analytics endpoints, tagged with
/// its owning device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceReading {
    /// Backend row identifier
    pub id: i64,

    /// Owning device identifier
    pub device_id: i64,

    /// Owning device client identifier
    pub client_id: ClientId,

    /// The telemetry record itself
    #[serde(flatten)]
    pub reading: Reading,
}

/// A monitored metering station
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    /// Backend identifier
    pub id: i64,

    /// Unique client identifier (e.g. `SMS-II-023`)
    pub client_id: ClientId,

    /// Display name
    pub device_name: Option<String>,

    /// Hardware kind
    #[serde(default)]
    pub device_type: DeviceType,

    /// Human-readable location
    pub location: Option<String>,

    /// Latitude coordinate
    pub latitude: Option<f64>,

    /// Longitude coordinate
    pub longitude: Option<f64>,

    /// Whether the backend considers the device active
    pub is_active: bool,

    /// When the device last reported
    pub last_seen: Option<DateTime<Utc>>,

    /// Latest reading, if the device has ever reported
    pub latest_reading: Option<Reading>,

    /// Section parsed from the client id, when present in the payload
    #[serde(default)]
    pub section_id: Option<SectionId>,
}

impl Device {
    /// Parse the section identifier out of a client id.
    ///
    /// `SMS-II-023` yields `II`; non-SMS ids (modems, test rigs) yield `None`.
    #[must_use]
    pub fn section_of(client_id: &str) -> Option<SectionId> {
        let rest = client_id.strip_prefix("SMS-")?;
        let section = rest.split('-').next()?;
        if section.is_empty() {
            None
        } else {
            Some(section.to_string())
        }
    }

    /// Section this device belongs to, preferring the backend-provided value
    #[must_use]
    pub fn section(&self) -> Option<SectionId> {
        self.section_id
            .clone()
            .or_else(|| Self::section_of(&self.client_id))
    }
}

/// Aggregate statistics for one geographic section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionStats {
    /// Section identifier (`I`..`V`, `OTHER`, or `ALL`)
    pub section_id: SectionId,

    /// Display name
    pub section_name: String,

    /// Number of stations in the section
    pub sms_count: u64,

    /// Number of currently active stations
    pub active_sms: u64,

    /// Sum of the latest flow rate across stations
    pub cumulative_volume_flow: f64,

    /// Unit label for the cumulative flow
    pub unit: String,
}

/// Alarm threshold direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    /// Value fell below the low bound
    Low,
    /// Value exceeded the high bound
    High,
}

impl std::fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Alarm severity tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSeverity {
    /// Informational
    Low,
    /// Needs attention
    Medium,
    /// Needs immediate attention
    High,
}

impl Default for AlarmSeverity {
    fn default() -> Self {
        Self::Medium
    }
}

impl std::fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A triggered alarm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alarm {
    /// Backend identifier
    pub id: i64,

    /// Owning device identifier
    pub device_id: i64,

    /// Owning device client identifier
    pub client_id: ClientId,

    /// Parameter that tripped (e.g. `static_pressure`)
    pub parameter: String,

    /// Observed value
    pub value: f64,

    /// Which bound was crossed
    pub threshold_type: ThresholdType,

    /// Severity tier
    #[serde(default)]
    pub severity: AlarmSeverity,

    /// Whether an operator has acknowledged the alarm
    pub is_acknowledged: bool,

    /// Acknowledging user identifier
    pub acknowledged_by: Option<i64>,

    /// When the alarm was acknowledged
    pub acknowledged_at: Option<DateTime<Utc>>,

    /// When the alarm fired
    pub triggered_at: DateTime<Utc>,

    /// When the condition cleared
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Per-parameter low/high alarm bounds, optionally scoped to one device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlarmThreshold {
    /// Backend identifier
    pub id: i64,

    /// Device the bounds apply to; `None` means global
    pub device_id: Option<i64>,

    /// Parameter name
    pub parameter: String,

    /// Low bound, if configured
    pub low_threshold: Option<f64>,

    /// High bound, if configured
    pub high_threshold: Option<f64>,

    /// Whether the threshold is in force
    pub is_active: bool,
}

/// An odorant drum as reported by the backend, with derived consumption
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OdorantDrum {
    /// Backend identifier
    pub id: i64,

    /// Device whose flow depletes this drum
    pub device_id: i64,

    /// Section the drum is installed in
    pub section_id: i64,

    /// Section display name
    pub section_name: Option<String>,

    /// Station the drum is installed at
    pub station_name: String,

    /// When the drum was last refilled (or first installed)
    pub refill_date: DateTime<Utc>,

    /// Capacity at install/refill time (liters)
    pub initial_level: f64,

    /// Estimated current level (liters)
    pub current_level: f64,

    /// Cumulative flow volume consumed against this drum (MMCF)
    pub total_mmcf_consumed: f64,

    /// Liters of odorant used so far
    pub odorant_used: f64,

    /// Consumption rate (liters per MMCF)
    pub odorant_consumption_rate: f64,

    /// Percentage of liquid remaining
    pub percentage_remaining: f64,

    /// Whether this is the drum currently in service for its device
    pub is_active: bool,
}

/// One refill event in a drum's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefillRecord {
    /// Backend identifier
    pub id: i64,

    /// Device whose drum was refilled
    pub device_id: i64,

    /// Station name
    pub station_name: String,

    /// When the refill happened
    pub refill_date: DateTime<Utc>,

    /// Level before the refill (liters)
    pub previous_level: Option<f64>,

    /// Amount added (liters)
    pub refilled_amount: f64,

    /// Level after the refill (liters)
    pub new_level: f64,

    /// Operator who performed the refill
    pub refilled_by_username: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Dashboard user role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administration rights
    Admin,
    /// Day-to-day operation (acknowledge alarms, refill drums)
    Operator,
    /// Read-only access
    Viewer,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Operator => write!(f, "operator"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

/// A dashboard user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Backend identifier
    pub id: i64,

    /// Login name
    pub username: String,

    /// Contact email
    pub email: String,

    /// Assigned role
    pub role: UserRole,

    /// Whether the account is enabled
    pub is_active: bool,

    /// When the account was created
    pub created_at: Option<DateTime<Utc>>,

    /// Last successful login
    pub last_login: Option<DateTime<Utc>>,
}

/// Pagination envelope used by the readings endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    /// Total matching rows
    pub total: u64,

    /// Current page (1-based)
    pub page: u32,

    /// Rows per page
    pub page_size: u32,

    /// Total page count
    pub total_pages: u32,

    /// The rows themselves
    pub data: Vec<T>,
}

/// Fleet-level device counters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceStats {
    /// Devices known to the backend
    pub total_devices: u64,

    /// Devices that reported recently
    pub active_devices: u64,

    /// Devices that have gone quiet
    pub inactive_devices: u64,

    /// Total stored readings
    pub total_readings: u64,
}

/// Headline counters for the main dashboard cards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    /// Devices known to the backend
    pub total_devices: u64,

    /// Devices that reported in the last five minutes
    pub active_devices: u64,

    /// Total stored readings
    pub total_readings: u64,

    /// Unacknowledged alarms
    pub active_alarms: u64,
}

/// Payload for creating or updating a device
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeviceCreate {
    /// Unique client identifier
    #[validate(length(min = 1, max = 100), custom(function = validate_client_id))]
    pub client_id: ClientId,

    /// Display name
    #[validate(length(min = 1, max = 200))]
    pub device_name: String,

    /// Hardware kind
    #[serde(default)]
    pub device_type: DeviceType,

    /// Human-readable location
    #[validate(length(min = 1, max = 500))]
    pub location: String,

    /// Latitude coordinate
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    /// Longitude coordinate
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

fn validate_client_id(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("client_id_empty"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(validator::ValidationError::new("client_id_charset"));
    }
    Ok(())
}

/// Payload for installing a new odorant drum
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DrumCreate {
    /// Device whose flow depletes the drum
    pub device_id: i64,

    /// Section the drum is installed in
    pub section_id: i64,

    /// Station name
    #[validate(length(min = 1, max = 200))]
    pub station_name: String,

    /// Capacity at install time (liters)
    #[validate(range(min = 0.0))]
    pub initial_level: f64,

    /// Consumption rate (liters per MMCF); backend defaults to 0.5
    pub odorant_consumption_rate: Option<f64>,
}

/// Payload for refilling an odorant drum
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DrumRefill {
    /// Drum being refilled
    pub drum_id: i64,

    /// Amount added (liters)
    #[validate(range(min = 0.0))]
    pub refilled_amount: f64,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Payload for creating a user account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    /// Login name
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    /// Contact email
    #[validate(email)]
    pub email: String,

    /// Initial password
    #[validate(length(min = 8, max = 128))]
    pub password: String,

    /// Assigned role
    pub role: UserRole,
}

/// Payload for updating a user account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    /// New contact email, if changing
    #[validate(email)]
    pub email: Option<String>,

    /// New role, if changing
    pub role: Option<UserRole>,

    /// New active flag, if changing
    pub is_active: Option<bool>,
}

/// Payload for a user changing their own password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordChange {
    /// Current password
    pub current_password: String,

    /// Replacement password
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Payload for creating or updating an alarm threshold
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ThresholdUpsert {
    /// Device the bounds apply to; `None` means global
    pub device_id: Option<i64>,

    /// Parameter name
    #[validate(length(min = 1, max = 100))]
    pub parameter: String,

    /// Low bound, if any
    pub low_threshold: Option<f64>,

    /// High bound, if any
    pub high_threshold: Option<f64>,
}

#[cfg(test)]
#[allow(
    clippy::missing_panics_doc,
    clippy::float_cmp,
    clippy::uninlined_format_args
)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use validator::Validate;

    #[test]
    fn test_device_type_default() {
        assert_eq!(DeviceType::default(), DeviceType::Sms);
    }

    #[test]
    fn test_device_type_display() {
        assert_eq!(format!("{}", DeviceType::Sms), "SMS");
        assert_eq!(format!("{}", DeviceType::Evc), "EVC");
        assert_eq!(format!("{}", DeviceType::Fc), "FC");
    }

    #[test]
    fn test_device_type_serialization() {
        let serialized = serde_json::to_string(&DeviceType::Evc).unwrap();
        assert_eq!(serialized, "\"EVC\"");

        let deserialized: DeviceType = serde_json::from_str("\"FC\"").unwrap();
        assert_eq!(deserialized, DeviceType::Fc);
    }

    #[test]
    fn test_section_of_sms_ids() {
        assert_eq!(Device::section_of("SMS-II-023"), Some("II".to_string()));
        assert_eq!(Device::section_of("SMS-V-001"), Some("V".to_string()));
        assert_eq!(Device::section_of("SMS-1-007"), Some("1".to_string()));
    }

    #[test]
    fn test_section_of_non_sms_ids() {
        assert_eq!(Device::section_of("modem2"), None);
        assert_eq!(Device::section_of("SMS-"), None);
        assert_eq!(Device::section_of(""), None);
    }

    fn sample_device() -> Device {
        Device {
            id: 7,
            client_id: "SMS-III-042".to_string(),
            device_name: Some("Vehari SMS".to_string()),
            device_type: DeviceType::Sms,
            location: Some("Vehari".to_string()),
            latitude: Some(30.03),
            longitude: Some(72.35),
            is_active: true,
            last_seen: Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
            latest_reading: None,
            section_id: None,
        }
    }

    #[test]
    fn test_device_section_prefers_backend_value() {
        let mut device = sample_device();
        assert_eq!(device.section(), Some("III".to_string()));

        device.section_id = Some("IV".to_string());
        assert_eq!(device.section(), Some("IV".to_string()));
    }

    #[test]
    fn test_device_serialization_roundtrip() {
        let device = sample_device();
        let serialized = serde_json::to_string(&device).unwrap();
        let deserialized: Device = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, device);
    }

    #[test]
    fn test_reading_optional_fields_deserialize() {
        // Backend omits sensor fields when the station never reported them
        let json = r#"{"timestamp": "2025-06-01T12:00:00Z", "battery": 12.6}"#;
        let reading: Reading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.battery, Some(12.6));
        assert_eq!(reading.temperature, None);
        assert_eq!(reading.specific_gravity, 0.0);
    }

    #[test]
    fn test_device_reading_flatten() {
        let json = r#"{
            "id": 991,
            "device_id": 7,
            "client_id": "SMS-I-003",
            "timestamp": "2025-06-01T12:00:00Z",
            "temperature": 74.2,
            "total_volume_flow": 812.5
        }"#;
        let row: DeviceReading = serde_json::from_str(json).unwrap();

        assert_eq!(row.client_id, "SMS-I-003");
        assert_eq!(row.reading.temperature, Some(74.2));
        assert_eq!(row.reading.total_volume_flow, Some(812.5));
    }

    #[test]
    fn test_alarm_severity_ordering() {
        assert!(AlarmSeverity::Low < AlarmSeverity::Medium);
        assert!(AlarmSeverity::Medium < AlarmSeverity::High);
        assert_eq!(AlarmSeverity::default(), AlarmSeverity::Medium);
    }

    #[test]
    fn test_threshold_type_serialization() {
        assert_eq!(serde_json::to_string(&ThresholdType::Low).unwrap(), "\"low\"");
        let deserialized: ThresholdType = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(deserialized, ThresholdType::High);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(format!("{}", UserRole::Admin), "admin");
        assert_eq!(format!("{}", UserRole::Operator), "operator");
        assert_eq!(format!("{}", UserRole::Viewer), "viewer");
    }

    #[test]
    fn test_device_create_validation_valid() {
        let payload = DeviceCreate {
            client_id: "SMS-IV-100".to_string(),
            device_name: "Okara SMS".to_string(),
            device_type: DeviceType::Sms,
            location: "Okara".to_string(),
            latitude: 30.81,
            longitude: 73.45,
        };

        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_device_create_validation_bad_client_id() {
        let payload = DeviceCreate {
            client_id: "SMS II 023".to_string(),
            device_name: "Station".to_string(),
            device_type: DeviceType::Sms,
            location: "Somewhere".to_string(),
            latitude: 0.0,
            longitude: 0.0,
        };

        let result = payload.validate();
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors.field_errors().contains_key("client_id"));
    }

    #[test]
    fn test_device_create_validation_coordinates() {
        let payload = DeviceCreate {
            client_id: "SMS-I-001".to_string(),
            device_name: "Station".to_string(),
            device_type: DeviceType::Sms,
            location: "Somewhere".to_string(),
            latitude: 91.0,
            longitude: 0.0,
        };

        let result = payload.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().field_errors().contains_key("latitude"));
    }

    #[test]
    fn test_user_create_validation() {
        let payload = UserCreate {
            username: "op".to_string(), // too short
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            role: UserRole::Operator,
        };

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_paginated_deserialization() {
        let json = r#"{
            "total": 250,
            "page": 2,
            "page_size": 100,
            "total_pages": 3,
            "data": [1, 2, 3]
        }"#;
        let page: Paginated<i32> = serde_json::from_str(json).unwrap();

        assert_eq!(page.total, 250);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data, vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn test_section_of_never_panics(client_id in "\\PC{0,40}") {
            let _ = Device::section_of(&client_id);
        }

        #[test]
        fn test_section_of_roundtrip(section in "[IVX]{1,3}", suffix in "[0-9]{3}") {
            let client_id = format!("SMS-{section}-{suffix}");
            prop_assert_eq!(Device::section_of(&client_id), Some(section));
        }

        #[test]
        fn test_valid_client_ids_pass_validation(id in "[A-Za-z0-9_-]{1,100}") {
            prop_assert!(validate_client_id(&id).is_ok());
        }
    }
}
