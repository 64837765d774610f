//! Append-only run outputs.

use std::collections::{BTreeMap, BTreeSet};

use bl_core::BusId;

/// One wait (minutes) per boarded passenger, in boarding order.
pub type WaitingTimes = Vec<f64>;

/// Passengers boarded per bus, ascending by `BusId`.
pub type BusUtilization = BTreeMap<BusId, u64>;

/// Collects waits and per-bus boardings during a run.
///
/// Processes only ever append; nothing in the simulation reads these values
/// back.  Aggregation (means, ranges, histograms) belongs to the reporting
/// layer.
///
/// Every spawned bus has a utilization entry from the moment it is
/// registered, and each boarding increments it together with appending its
/// wait.  So `waiting_times().len()` always equals the sum of
/// `bus_utilization()`, including after a run stopped early.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metrics {
    waiting_times:   WaitingTimes,
    bus_utilization: BusUtilization,
    finished:        BTreeSet<BusId>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `bus` a zero entry if it has none.
    pub(crate) fn register_bus(&mut self, bus: BusId) {
        self.bus_utilization.entry(bus).or_insert(0);
    }

    pub(crate) fn record_boarding(&mut self, bus: BusId, wait: f64) {
        self.waiting_times.push(wait);
        *self.bus_utilization.entry(bus).or_insert(0) += 1;
    }

    pub(crate) fn finish_bus(&mut self, bus: BusId) {
        self.finished.insert(bus);
    }

    pub fn waiting_times(&self) -> &[f64] {
        &self.waiting_times
    }

    pub fn bus_utilization(&self) -> &BusUtilization {
        &self.bus_utilization
    }

    /// `true` once `bus` has completed its last trip.
    pub fn is_finished(&self, bus: BusId) -> bool {
        self.finished.contains(&bus)
    }

    /// Buses whose totals are final.
    pub fn finished_buses(&self) -> impl Iterator<Item = BusId> + '_ {
        self.finished.iter().copied()
    }

    /// Total passengers boarded across all buses.
    pub fn total_boarded(&self) -> u64 {
        self.bus_utilization.values().sum()
    }

    /// Split into the two raw outputs.
    pub fn into_parts(self) -> (WaitingTimes, BusUtilization) {
        (self.waiting_times, self.bus_utilization)
    }
}
