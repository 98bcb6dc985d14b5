//! Threshold classification for sensor values and device liveness
//!
//! Maps a numeric sensor value to a status label, severity tier and display
//! color by checking it against ordered low/high bounds for that parameter.
//! Bounds can be overridden per device by backend-configured alarm
//! thresholds; otherwise built-in defaults per parameter kind apply. The
//! classification is total: any finite value lands in exactly one band.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display color for nominal values
pub const COLOR_NORMAL: &str = "#43A047";
/// Display color for warning-tier values
pub const COLOR_WARNING: &str = "#FD6835";
/// Display color for critical-tier values
pub const COLOR_CRITICAL: &str = "#E53935";
/// Display color when no value or bounds are available
pub const COLOR_UNKNOWN: &str = "#808080";

/// Sensor parameter kinds reported by metering stations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Temperature (°F)
    Temperature,
    /// Static pressure (PSI)
    StaticPressure,
    /// Differential pressure (IWC)
    DifferentialPressure,
    /// Battery voltage (V)
    Battery,
    /// Cumulative volume (MCF)
    Volume,
    /// Flow rate (MCF/day)
    TotalVolumeFlow,
    /// Specific gravity in use
    SpecificGravity,
}

impl ParameterKind {
    /// Backend parameter name for this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::StaticPressure => "static_pressure",
            Self::DifferentialPressure => "differential_pressure",
            Self::Battery => "battery",
            Self::Volume => "volume",
            Self::TotalVolumeFlow => "total_volume_flow",
            Self::SpecificGravity => "specific_gravity",
        }
    }

    /// Parse a backend parameter name
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "temperature" => Some(Self::Temperature),
            "static_pressure" => Some(Self::StaticPressure),
            "differential_pressure" => Some(Self::DifferentialPressure),
            "battery" => Some(Self::Battery),
            "volume" => Some(Self::Volume),
            "total_volume_flow" => Some(Self::TotalVolumeFlow),
            "specific_gravity" => Some(Self::SpecificGravity),
            _ => None,
        }
    }

    /// All classifiable parameter kinds
    pub const ALL: [Self; 7] = [
        Self::Temperature,
        Self::StaticPressure,
        Self::DifferentialPressure,
        Self::Battery,
        Self::Volume,
        Self::TotalVolumeFlow,
        Self::SpecificGravity,
    ];
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional low/high bounds for one parameter
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    /// Low bound; values below it are abnormal
    pub low: Option<f64>,

    /// High bound; values above it are abnormal
    pub high: Option<f64>,
}

impl Bounds {
    /// Bounds with both ends configured
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self {
            low: Some(low),
            high: Some(high),
        }
    }

    /// Bounds with only a high end
    #[must_use]
    pub const fn high_only(high: f64) -> Self {
        Self {
            low: None,
            high: Some(high),
        }
    }
}

/// Built-in default bounds for a parameter kind.
///
/// Used when no backend-configured threshold override exists for the
/// device. Values reflect typical sales-metering-station operating ranges.
#[must_use]
pub const fn default_bounds(kind: ParameterKind) -> Bounds {
    match kind {
        ParameterKind::Temperature => Bounds::new(32.0, 120.0),
        ParameterKind::StaticPressure => Bounds::new(100.0, 900.0),
        ParameterKind::DifferentialPressure => Bounds::new(5.0, 250.0),
        ParameterKind::Battery => Bounds::new(11.5, 14.6),
        ParameterKind::Volume => Bounds::high_only(5000.0),
        ParameterKind::TotalVolumeFlow => Bounds::high_only(2000.0),
        ParameterKind::SpecificGravity => Bounds::new(0.55, 0.70),
    }
}

/// Status label for a classified sensor value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusLabel {
    /// Far below the low bound
    Critical,
    /// Below the low bound
    Low,
    /// Approaching the low bound
    LowWarning,
    /// Within normal range
    Normal,
    /// Approaching the high bound
    HighWarning,
    /// Above the high bound
    High,
    /// Far above the high bound
    CriticalHigh,
    /// No value or no bounds available
    Unknown,
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "Critical"),
            Self::Low => write!(f, "Low"),
            Self::LowWarning => write!(f, "Low Warning"),
            Self::Normal => write!(f, "Normal"),
            Self::HighWarning => write!(f, "Warning"),
            Self::High => write!(f, "High"),
            Self::CriticalHigh => write!(f, "Critical High"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Severity tier for a classified sensor value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    /// Value is nominal
    Normal,
    /// Early warning
    Low,
    /// Bound crossed
    Medium,
    /// Bound crossed by a wide margin
    High,
}

/// Result of classifying one sensor value
///
/// Serialize-only: the display color is a static string and statuses are
/// always recomputed locally, never read back.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ParameterStatus {
    /// Status label
    pub label: StatusLabel,

    /// Severity tier
    pub severity: SeverityTier,

    /// Display color (hex)
    pub color: &'static str,
}

impl ParameterStatus {
    const fn new(label: StatusLabel, severity: SeverityTier, color: &'static str) -> Self {
        Self {
            label,
            severity,
            color,
        }
    }

    /// Status for a missing value or missing bounds
    #[must_use]
    pub const fn unknown() -> Self {
        Self::new(StatusLabel::Unknown, SeverityTier::Normal, COLOR_UNKNOWN)
    }
}

/// Classify a value against explicit bounds.
///
/// Bands, checked low side first:
/// below `0.8 * low` is critical, below `low` is low, below `1.1 * low` is
/// an early low warning; above `1.2 * high` is critical, above `high` is
/// high, above `0.9 * high` is an early high warning; everything else is
/// normal. With neither bound configured the result is unknown.
#[must_use]
pub fn classify(value: f64, bounds: Bounds) -> ParameterStatus {
    if bounds.low.is_none() && bounds.high.is_none() {
        return ParameterStatus::unknown();
    }

    if let Some(low) = bounds.low {
        if value < low * 0.8 {
            return ParameterStatus::new(StatusLabel::Critical, SeverityTier::High, COLOR_CRITICAL);
        }
        if value < low {
            return ParameterStatus::new(StatusLabel::Low, SeverityTier::Medium, COLOR_CRITICAL);
        }
        if value < low * 1.1 {
            return ParameterStatus::new(
                StatusLabel::LowWarning,
                SeverityTier::Low,
                COLOR_WARNING,
            );
        }
    }

    if let Some(high) = bounds.high {
        if value > high * 1.2 {
            return ParameterStatus::new(
                StatusLabel::CriticalHigh,
                SeverityTier::High,
                COLOR_CRITICAL,
            );
        }
        if value > high {
            return ParameterStatus::new(StatusLabel::High, SeverityTier::Medium, COLOR_WARNING);
        }
        if value > high * 0.9 {
            return ParameterStatus::new(
                StatusLabel::HighWarning,
                SeverityTier::Low,
                COLOR_WARNING,
            );
        }
    }

    ParameterStatus::new(StatusLabel::Normal, SeverityTier::Normal, COLOR_NORMAL)
}

/// Classify a possibly-missing value for a parameter kind, preferring an
/// override from backend-configured thresholds over the built-in defaults.
#[must_use]
pub fn classify_parameter(
    kind: ParameterKind,
    value: Option<f64>,
    override_bounds: Option<Bounds>,
) -> ParameterStatus {
    match value {
        Some(v) => classify(v, override_bounds.unwrap_or_else(|| default_bounds(kind))),
        None => ParameterStatus::unknown(),
    }
}

/// Device liveness derived from its last report time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnlineStatus {
    /// Reported within the last five minutes
    Online,
    /// Reported within the last thirty minutes
    Stale,
    /// Silent for longer
    Offline,
    /// Has never reported at all
    NeverReported,
}

impl OnlineStatus {
    /// Display color for this liveness state.
    ///
    /// A device that went silent is red; one that has never reported is
    /// gray, since there is nothing to be late relative to.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Online => COLOR_NORMAL,
            Self::Stale => COLOR_WARNING,
            Self::Offline => COLOR_CRITICAL,
            Self::NeverReported => COLOR_UNKNOWN,
        }
    }
}

impl std::fmt::Display for OnlineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "Online"),
            Self::Stale => write!(f, "Warning"),
            Self::Offline | Self::NeverReported => write!(f, "Offline"),
        }
    }
}

/// Classify device liveness from its last-seen timestamp
#[must_use]
pub fn online_status(last_seen: Option<DateTime<Utc>>, now: DateTime<Utc>) -> OnlineStatus {
    let Some(last_seen) = last_seen else {
        return OnlineStatus::NeverReported;
    };

    let elapsed = now.signed_duration_since(last_seen);
    if elapsed < chrono::Duration::minutes(5) {
        OnlineStatus::Online
    } else if elapsed < chrono::Duration::minutes(30) {
        OnlineStatus::Stale
    } else {
        OnlineStatus::Offline
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_parameter_kind_roundtrip() {
        for kind in ParameterKind::ALL {
            assert_eq!(ParameterKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ParameterKind::parse("wind_speed"), None);
    }

    #[test]
    fn test_classify_no_bounds_is_unknown() {
        let status = classify(42.0, Bounds::default());
        assert_eq!(status.label, StatusLabel::Unknown);
        assert_eq!(status.color, COLOR_UNKNOWN);
    }

    #[test]
    fn test_classify_low_side_bands() {
        let bounds = Bounds::new(100.0, 900.0);

        assert_eq!(classify(50.0, bounds).label, StatusLabel::Critical);
        assert_eq!(classify(79.9, bounds).label, StatusLabel::Critical);
        assert_eq!(classify(80.0, bounds).label, StatusLabel::Low);
        assert_eq!(classify(99.9, bounds).label, StatusLabel::Low);
        assert_eq!(classify(100.0, bounds).label, StatusLabel::LowWarning);
        assert_eq!(classify(109.9, bounds).label, StatusLabel::LowWarning);
        assert_eq!(classify(110.0, bounds).label, StatusLabel::Normal);
    }

    #[test]
    fn test_classify_high_side_bands() {
        let bounds = Bounds::new(100.0, 900.0);

        assert_eq!(classify(500.0, bounds).label, StatusLabel::Normal);
        assert_eq!(classify(810.0, bounds).label, StatusLabel::Normal);
        assert_eq!(classify(810.1, bounds).label, StatusLabel::HighWarning);
        assert_eq!(classify(900.0, bounds).label, StatusLabel::HighWarning);
        assert_eq!(classify(900.1, bounds).label, StatusLabel::High);
        assert_eq!(classify(1080.0, bounds).label, StatusLabel::High);
        assert_eq!(classify(1080.1, bounds).label, StatusLabel::CriticalHigh);
    }

    #[test]
    fn test_classify_severity_and_color() {
        let bounds = Bounds::new(100.0, 900.0);

        let critical = classify(10.0, bounds);
        assert_eq!(critical.severity, SeverityTier::High);
        assert_eq!(critical.color, COLOR_CRITICAL);

        let warning = classify(850.0, bounds);
        assert_eq!(warning.severity, SeverityTier::Low);
        assert_eq!(warning.color, COLOR_WARNING);

        let normal = classify(400.0, bounds);
        assert_eq!(normal.severity, SeverityTier::Normal);
        assert_eq!(normal.color, COLOR_NORMAL);
    }

    #[test]
    fn test_classify_high_only_bounds() {
        let bounds = Bounds::high_only(2000.0);

        assert_eq!(classify(0.0, bounds).label, StatusLabel::Normal);
        assert_eq!(classify(1900.0, bounds).label, StatusLabel::HighWarning);
        assert_eq!(classify(2500.0, bounds).label, StatusLabel::CriticalHigh);
    }

    #[test]
    fn test_classify_parameter_missing_value() {
        let status = classify_parameter(ParameterKind::Battery, None, None);
        assert_eq!(status.label, StatusLabel::Unknown);
    }

    #[test]
    fn test_classify_parameter_override_wins() {
        // Default battery low bound is 11.5; the override lowers it
        let relaxed = Bounds::new(10.0, 15.0);
        let with_default = classify_parameter(ParameterKind::Battery, Some(11.0), None);
        let with_override = classify_parameter(ParameterKind::Battery, Some(11.0), Some(relaxed));

        assert_eq!(with_default.label, StatusLabel::Low);
        assert_eq!(with_override.label, StatusLabel::LowWarning);
    }

    #[test]
    fn test_default_bounds_cover_all_kinds() {
        for kind in ParameterKind::ALL {
            let bounds = default_bounds(kind);
            assert!(bounds.low.is_some() || bounds.high.is_some());
        }
    }

    #[test]
    fn test_online_status_bands() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(online_status(None, now), OnlineStatus::NeverReported);
        assert_eq!(
            online_status(Some(now - chrono::Duration::minutes(2)), now),
            OnlineStatus::Online
        );
        assert_eq!(
            online_status(Some(now - chrono::Duration::minutes(15)), now),
            OnlineStatus::Stale
        );
        assert_eq!(
            online_status(Some(now - chrono::Duration::hours(2)), now),
            OnlineStatus::Offline
        );
    }

    #[test]
    fn test_online_status_colors() {
        assert_eq!(OnlineStatus::Online.color(), COLOR_NORMAL);
        assert_eq!(OnlineStatus::Stale.color(), COLOR_WARNING);
        assert_eq!(OnlineStatus::Offline.color(), COLOR_CRITICAL);
        assert_eq!(OnlineStatus::NeverReported.color(), COLOR_UNKNOWN);
    }

    #[test]
    fn test_never_reported_displays_as_offline() {
        // Same label as a silent device, but the gray color tells it apart
        assert_eq!(OnlineStatus::NeverReported.to_string(), "Offline");
        assert_ne!(
            OnlineStatus::NeverReported.color(),
            OnlineStatus::Offline.color()
        );
    }

    /// Band rank for monotonicity checks: lower values must never land in a
    /// higher-side band than higher values.
    fn band_rank(label: StatusLabel) -> i8 {
        match label {
            StatusLabel::Critical => -3,
            StatusLabel::Low => -2,
            StatusLabel::LowWarning => -1,
            StatusLabel::Normal | StatusLabel::Unknown => 0,
            StatusLabel::HighWarning => 1,
            StatusLabel::High => 2,
            StatusLabel::CriticalHigh => 3,
        }
    }

    proptest! {
        #[test]
        fn test_classification_is_total(value in -1.0e6_f64..1.0e6, low in 1.0_f64..500.0, span in 1.0_f64..1000.0) {
            let bounds = Bounds::new(low, low + span);
            let status = classify(value, bounds);
            // Every finite value lands in exactly one band with a color
            prop_assert!(!status.color.is_empty());
        }

        #[test]
        fn test_classification_is_monotonic(
            a in -1.0e4_f64..1.0e4,
            b in -1.0e4_f64..1.0e4,
            low in 10.0_f64..100.0,
        ) {
            // Keep the warning bands disjoint: 1.1 * low < 0.9 * high
            let high = low * 2.0;
            let bounds = Bounds::new(low, high);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let rank_lo = band_rank(classify(lo, bounds).label);
            let rank_hi = band_rank(classify(hi, bounds).label);
            prop_assert!(rank_lo <= rank_hi);
        }
    }
}
