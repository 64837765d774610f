//! Trip types: the raw `TripRecord` and the engine-ready `Trip`, `Itinerary`
//! and `Arrival`.
//!
//! `TripRecord` is what the loader (or a generator) produces: names and a
//! wall-clock start.  [`TripDataset`][crate::TripDataset] turns a batch of
//! records into interned terminals, simulation-relative offsets, and per-bus
//! itineraries, which are the only forms the simulation core consumes.

use bl_core::{BusId, SimTime, TerminalId};
use chrono::NaiveDateTime;

// ── TripRecord ────────────────────────────────────────────────────────────────

/// One row of the trip dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct TripRecord {
    pub bus_id: BusId,
    pub start_terminal: String,
    pub end_terminal: String,
    /// Travel time in minutes.  Must be finite and ≥ 0.
    pub duration_mins: f64,
    /// Scheduled departure; also the arrival time of the record's passenger.
    pub scheduled_start: NaiveDateTime,
}

impl TripRecord {
    pub fn new(
        bus_id: BusId,
        start_terminal: impl Into<String>,
        end_terminal: impl Into<String>,
        duration_mins: f64,
        scheduled_start: NaiveDateTime,
    ) -> Self {
        Self {
            bus_id,
            start_terminal: start_terminal.into(),
            end_terminal: end_terminal.into(),
            duration_mins,
            scheduled_start,
        }
    }
}

// ── Trip ──────────────────────────────────────────────────────────────────────

/// One leg of a bus itinerary, with terminals resolved to registry ids.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    pub bus_id: BusId,
    pub origin: TerminalId,
    pub destination: TerminalId,
    /// Travel time in minutes.
    pub duration: f64,
}

// ── Itinerary ─────────────────────────────────────────────────────────────────

/// All trips of one bus, in scheduled-start order.
///
/// An itinerary may be empty: the bus still exists and reports zero
/// passengers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Itinerary {
    pub bus_id: BusId,
    trips: Vec<Trip>,
}

impl Itinerary {
    /// Build an itinerary from trips already in travel order.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if any trip belongs to a different bus.
    pub fn new(bus_id: BusId, trips: Vec<Trip>) -> Self {
        debug_assert!(
            trips.iter().all(|t| t.bus_id == bus_id),
            "all trips must belong to {bus_id}"
        );
        Self { bus_id, trips }
    }

    /// An itinerary with no trips.
    pub fn empty(bus_id: BusId) -> Self {
        Self { bus_id, trips: Vec::new() }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Total travel time across all trips, in minutes.
    pub fn total_duration(&self) -> f64 {
        self.trips.iter().map(|t| t.duration).sum()
    }
}

// ── Arrival ───────────────────────────────────────────────────────────────────

/// A passenger due to appear at `terminal` at `offset` after simulation start.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arrival {
    pub offset: SimTime,
    pub terminal: TerminalId,
}
