//! Core simulation types: simulated time and unit conversions.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Hours in a (non-leap) simulation year.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Non-negative offset from project start, in hours.
///
/// `SimTime` is totally ordered (via [`f64::total_cmp`]) so it can key the
/// scheduler's priority queue.
///
/// # Examples
///
/// ```
/// use owf_appraisal::sim::types::SimTime;
///
/// let t = SimTime::from_hours(8760.0);
/// assert_eq!(t.years(), 1.0);
/// assert_eq!(t.after(24.0).hours(), 8784.0);
/// ```
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(f64);

impl SimTime {
    /// Project start.
    pub const ZERO: Self = Self(0.0);

    /// Creates a time from an hour offset.
    ///
    /// # Panics
    ///
    /// Panics if `hours` is negative or not finite.
    pub fn from_hours(hours: f64) -> Self {
        assert!(
            hours.is_finite() && hours >= 0.0,
            "simulated time must be finite and >= 0, got {hours}"
        );
        Self(hours)
    }

    /// Creates a time from a year offset (8760 h per year).
    pub fn from_years(years: f64) -> Self {
        Self::from_hours(years * HOURS_PER_YEAR)
    }

    /// Hour offset from project start.
    pub fn hours(self) -> f64 {
        self.0
    }

    /// Year offset from project start.
    pub fn years(self) -> f64 {
        self.0 / HOURS_PER_YEAR
    }

    /// Returns the time `duration_hours` later. Negative or NaN durations
    /// are treated as zero so time never runs backwards.
    pub fn after(self, duration_hours: f64) -> Self {
        let d = duration_hours.max(0.0);
        if d.is_finite() {
            Self(self.0 + d)
        } else {
            Self(f64::MAX)
        }
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} h", self.0)
    }
}
