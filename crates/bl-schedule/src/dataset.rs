//! `TripDataset` — validated, simulation-ready view of a batch of trip records.
//!
//! # Normalisation
//!
//! 1. Every record is validated (finite, non-negative duration; non-empty
//!    terminal names).  The first bad record aborts construction.
//! 2. Records are stable-sorted by `scheduled_start`.  Ties keep input order.
//! 3. Terminal names are interned into dense `TerminalId`s in order of first
//!    appearance (start terminal before end terminal) after sorting.
//! 4. Each record yields one [`Arrival`] at its start terminal, offset from the
//!    earliest `scheduled_start` in the batch.
//! 5. Trips are grouped by bus into [`Itinerary`]s, ascending by `BusId`, each
//!    in scheduled-start order.

use std::collections::BTreeMap;

use bl_core::{BusId, SimTime, TerminalId};
use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;

use crate::trip::{Arrival, Itinerary, Trip, TripRecord};
use crate::{ScheduleError, ScheduleResult};

// ── TerminalRegistry ──────────────────────────────────────────────────────────

/// Bidirectional mapping between terminal names and dense `TerminalId`s.
#[derive(Clone, Debug, Default)]
pub struct TerminalRegistry {
    names: Vec<String>,
    ids:   FxHashMap<String, TerminalId>,
}

impl TerminalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, registering it if unseen.
    pub fn intern(&mut self, name: &str) -> TerminalId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = TerminalId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<TerminalId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: TerminalId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TerminalId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (TerminalId(i as u32), n.as_str()))
    }
}

// ── TripDataset ───────────────────────────────────────────────────────────────

/// Validated trip data, ready to seed a simulation.
#[derive(Clone, Debug, Default)]
pub struct TripDataset {
    terminals:   TerminalRegistry,
    arrivals:    Vec<Arrival>,
    itineraries: Vec<Itinerary>,
    start:       Option<NaiveDateTime>,
}

impl TripDataset {
    /// Validate and normalise `records`.  See the module docs for the steps.
    pub fn new(mut records: Vec<TripRecord>) -> ScheduleResult<Self> {
        for (index, r) in records.iter().enumerate() {
            validate(index, r)?;
        }

        records.sort_by_key(|r| r.scheduled_start);

        let Some(start) = records.first().map(|r| r.scheduled_start) else {
            return Ok(Self::default());
        };

        let mut terminals = TerminalRegistry::new();
        let mut arrivals = Vec::with_capacity(records.len());
        let mut by_bus: BTreeMap<BusId, Vec<Trip>> = BTreeMap::new();

        for r in &records {
            let origin = terminals.intern(&r.start_terminal);
            let destination = terminals.intern(&r.end_terminal);

            arrivals.push(Arrival {
                offset:   SimTime(minutes_between(start, r.scheduled_start)),
                terminal: origin,
            });

            by_bus.entry(r.bus_id).or_default().push(Trip {
                bus_id: r.bus_id,
                origin,
                destination,
                duration: r.duration_mins,
            });
        }

        let itineraries = by_bus
            .into_iter()
            .map(|(bus_id, trips)| Itinerary::new(bus_id, trips))
            .collect();

        Ok(Self {
            terminals,
            arrivals,
            itineraries,
            start: Some(start),
        })
    }

    /// A dataset with no trips.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a bus that operates no trips.  It still appears in the
    /// utilization output with a zero count.
    ///
    /// Does nothing if the bus already has an itinerary.
    pub fn add_idle_bus(&mut self, bus_id: BusId) {
        if let Err(pos) = self.itineraries.binary_search_by_key(&bus_id, |i| i.bus_id) {
            self.itineraries.insert(pos, Itinerary::empty(bus_id));
        }
    }

    pub fn terminals(&self) -> &TerminalRegistry {
        &self.terminals
    }

    /// One arrival per record, in scheduled-start order.
    pub fn arrivals(&self) -> &[Arrival] {
        &self.arrivals
    }

    /// One itinerary per bus, ascending by `BusId`.
    pub fn itineraries(&self) -> &[Itinerary] {
        &self.itineraries
    }

    /// Wall-clock time of simulation offset zero, or `None` when empty.
    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.start
    }

    /// Number of trip records (equivalently, passengers).
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    pub fn bus_count(&self) -> usize {
        self.itineraries.len()
    }

    /// Offset of the last scheduled arrival (`ZERO` when empty).
    pub fn latest_arrival(&self) -> SimTime {
        self.arrivals
            .iter()
            .map(|a| a.offset)
            .max()
            .unwrap_or(SimTime::ZERO)
    }

    /// Duration of the longest single trip, in minutes (0 when empty).
    pub fn longest_trip(&self) -> f64 {
        self.itineraries
            .iter()
            .flat_map(|i| i.trips())
            .map(|t| t.duration)
            .fold(0.0, f64::max)
    }

    /// `(latest arrival + longest trip) * factor`.
    pub fn default_horizon(&self, factor: f64) -> SimTime {
        SimTime((self.latest_arrival().0 + self.longest_trip()) * factor)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn validate(index: usize, r: &TripRecord) -> ScheduleResult<()> {
    if !r.duration_mins.is_finite() || r.duration_mins < 0.0 {
        return Err(ScheduleError::InvalidRecord {
            index,
            reason: format!("duration must be finite and >= 0, got {}", r.duration_mins),
        });
    }
    if r.start_terminal.trim().is_empty() || r.end_terminal.trim().is_empty() {
        return Err(ScheduleError::InvalidRecord {
            index,
            reason: "terminal name is empty".into(),
        });
    }
    Ok(())
}

fn minutes_between(earlier: NaiveDateTime, later: NaiveDateTime) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}
