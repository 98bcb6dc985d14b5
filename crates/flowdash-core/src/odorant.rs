//! Odorant drum depletion estimation
//!
//! Advisory arithmetic only: the backend's drum state is authoritative and
//! is mutated by explicit refill operations. These helpers let the
//! dashboard project a drum's level from the latest flow figures between
//! polls.

use serde::{Deserialize, Serialize};

/// Default consumption rate (liters of odorant per MMCF of gas)
pub const DEFAULT_CONSUMPTION_RATE: f64 = 0.5;

/// Estimated liquid state of a drum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DrumLevel {
    /// Estimated liters remaining, never negative
    pub remaining: f64,

    /// Estimated liters used since the last refill
    pub used: f64,

    /// Whole-number percentage of capacity remaining
    pub percent_remaining: u8,
}

/// Estimate a drum's level from cumulative flow consumption.
///
/// `remaining = max(0, initial - consumed_mmcf * rate)`; the percentage is
/// rounded to a whole number. A drum with zero (or negative) capacity
/// reports empty rather than dividing by zero.
#[must_use]
pub fn estimate_level(initial: f64, rate: f64, consumed_mmcf: f64) -> DrumLevel {
    let used = (consumed_mmcf * rate).max(0.0);
    let remaining = (initial - used).max(0.0);

    let percent_remaining = if initial > 0.0 {
        percent_of(remaining, initial)
    } else {
        0
    };

    DrumLevel {
        remaining,
        used: used.min(initial.max(0.0)),
        percent_remaining,
    }
}

// Clamp before narrowing; estimates can momentarily exceed capacity
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent_of(part: f64, whole: f64) -> u8 {
    (part / whole * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Project the level after a refill: a drum cannot hold more than its
/// installed capacity.
#[must_use]
pub fn project_refill(previous_level: f64, refilled_amount: f64, capacity: f64) -> f64 {
    (previous_level + refilled_amount.max(0.0)).min(capacity)
}
