//! Virtual time model.
//!
//! # Design
//!
//! Simulation time is a real number of minutes since the simulation start
//! (the earliest scheduled arrival in the dataset).  It has no relation to
//! wall-clock time; a run over a month of trips finishes in milliseconds.
//!
//! `SimTime` wraps an `f64` and orders values with `f64::total_cmp`, so it can
//! key a `BinaryHeap` directly.  `-0.0` is folded onto `+0.0` before
//! comparing, so the two zeros are the same instant.  Engine-facing code only ever creates valid
//! times (finite, ≥ 0); [`SimTime::is_valid`] is the check the engine applies
//! before accepting a due time.

use std::cmp::Ordering;
use std::fmt;

/// Seats per bus when the configuration does not say otherwise.
pub const DEFAULT_BUS_CAPACITY: u32 = 60;

/// Multiplier applied to `latest arrival + longest trip` to derive the
/// default run bound.
pub const DEFAULT_HORIZON_FACTOR: f64 = 1.2;

// ── SimTime ──────────────────────────────────────────────────────────────────

/// A point in virtual time, in minutes since simulation start.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    /// Later than every valid time.  Useful as an open-ended `run` bound.
    pub const NEVER: SimTime = SimTime(f64::INFINITY);

    /// `true` if this is a legal event due time: finite and non-negative.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }

    /// Return the time `minutes` after `self`.
    #[inline]
    pub fn offset(self, minutes: f64) -> SimTime {
        SimTime(self.0 + minutes)
    }

    /// Minutes elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
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
        // `x + 0.0` maps -0.0 to +0.0 and leaves every other value alone.
        (self.0 + 0.0).total_cmp(&(other.0 + 0.0))
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl From<f64> for SimTime {
    fn from(minutes: f64) -> Self {
        SimTime(minutes)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.2}min", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Maximum passengers boarded per trip.  Default: 60.
    pub bus_capacity: u32,

    /// Scales the dataset horizon (`latest arrival + longest trip`) to give
    /// the default run bound.  Default: 1.2.
    pub horizon_factor: f64,

    /// Explicit run bound.  When set it replaces the derived horizon.
    pub until: Option<SimTime>,

    /// Seed for the synthetic dataset generator.  The simulation itself
    /// draws no random numbers.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bus_capacity:   DEFAULT_BUS_CAPACITY,
            horizon_factor: DEFAULT_HORIZON_FACTOR,
            until:          None,
            seed:           42,
        }
    }
}

impl SimConfig {
    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> crate::BlResult<()> {
        if self.bus_capacity == 0 {
            return Err(crate::BlError::Config("bus_capacity must be > 0".into()));
        }
        if !self.horizon_factor.is_finite() || self.horizon_factor <= 0.0 {
            return Err(crate::BlError::Config(format!(
                "horizon_factor must be finite and > 0, got {}",
                self.horizon_factor
            )));
        }
        if let Some(until) = self.until {
            if !until.is_valid() {
                return Err(crate::BlError::Config(format!(
                    "until must be finite and >= 0, got {}",
                    until.0
                )));
            }
        }
        Ok(())
    }

    /// The run bound for a dataset whose last arrival is at `latest_arrival`
    /// and whose longest trip lasts `longest_trip` minutes.
    ///
    /// Returns `until` if set, otherwise
    /// `(latest_arrival + longest_trip) * horizon_factor`.
    pub fn run_bound(&self, latest_arrival: SimTime, longest_trip: f64) -> SimTime {
        match self.until {
            Some(until) => until,
            None => SimTime((latest_arrival.0 + longest_trip) * self.horizon_factor),
        }
    }
}
