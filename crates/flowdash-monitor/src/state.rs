//! Shared in-memory view of the backend's data
//!
//! Each collection lives in its own [`Versioned`] slot. Pollers draw a
//! ticket before issuing a request and commit the response against it;
//! a commit whose ticket is older than the last committed one is
//! discarded, so a slow response can never overwrite fresher data.

use chrono::{DateTime, Utc};
use flowdash_client::{AlarmStats, SectionStatsResponse};
use flowdash_core::types::{
    Alarm, AlarmThreshold, DashboardStats, Device, DeviceReading, OdorantDrum,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Slot<T> {
    value: Option<Arc<T>>,
    committed_ticket: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            committed_ticket: 0,
            updated_at: None,
        }
    }
}

/// A single collection slot with out-of-order commit protection
#[derive(Debug)]
pub struct Versioned<T> {
    inner: RwLock<Slot<T>>,
    next_ticket: AtomicU64,
}

impl<T> Default for Versioned<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Slot::default()),
            next_ticket: AtomicU64::new(1),
        }
    }
}

impl<T> Versioned<T> {
    /// Draw a ticket for an in-flight refresh
    pub fn ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    /// Commit a fetched value against its ticket.
    ///
    /// Returns `false` when a newer refresh already committed, in which
    /// case the value is dropped.
    pub fn commit(&self, ticket: u64, value: T) -> bool {
        let mut slot = self.inner.write();
        if ticket <= slot.committed_ticket {
            return false;
        }
        slot.committed_ticket = ticket;
        slot.value = Some(Arc::new(value));
        slot.updated_at = Some(Utc::now());
        true
    }

    /// Current value, if any refresh has ever succeeded
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.read().value.clone()
    }

    /// When the slot last committed
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().updated_at
    }

    /// Age of the current value in seconds, if present
    pub fn age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.updated_at()
            .map(|at| now.signed_duration_since(at).num_seconds())
    }
}

/// All backend collections the dashboard is built from
#[derive(Debug, Default)]
pub struct ViewState {
    /// Device list with latest readings
    pub devices: Versioned<Vec<Device>>,

    /// Trailing window of readings across the fleet
    pub readings: Versioned<Vec<DeviceReading>>,

    /// Alarm list
    pub alarms: Versioned<Vec<Alarm>>,

    /// Fleet-wide alarm counters
    pub alarm_stats: Versioned<AlarmStats>,

    /// Configured alarm thresholds
    pub thresholds: Versioned<Vec<AlarmThreshold>>,

    /// Backend-computed section statistics
    pub sections: Versioned<SectionStatsResponse>,

    /// Headline dashboard counters
    pub dashboard: Versioned<DashboardStats>,

    /// Odorant drum inventory
    pub drums: Versioned<Vec<OdorantDrum>>,
}

impl ViewState {
    /// Names of collections whose data is older than `max_age_seconds`.
    ///
    /// Slots that never committed do not count as stale; they show up as
    /// missing data instead and are expected right after startup.
    #[must_use]
    pub fn stale_collections(&self, now: DateTime<Utc>, max_age_seconds: i64) -> Vec<&'static str> {
        let ages: [(&'static str, Option<i64>); 8] = [
            ("devices", self.devices.age_seconds(now)),
            ("readings", self.readings.age_seconds(now)),
            ("alarms", self.alarms.age_seconds(now)),
            ("alarm_stats", self.alarm_stats.age_seconds(now)),
            ("thresholds", self.thresholds.age_seconds(now)),
            ("sections", self.sections.age_seconds(now)),
            ("dashboard", self.dashboard.age_seconds(now)),
            ("drums", self.drums.age_seconds(now)),
        ];

        ages.into_iter()
            .filter_map(|(name, age)| match age {
                Some(age) if age > max_age_seconds => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Whether any collection has ever committed
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.devices.get().is_some()
            || self.readings.get().is_some()
            || self.alarms.get().is_some()
            || self.sections.get().is_some()
            || self.dashboard.get().is_some()
            || self.drums.get().is_some()
    }
}
