//! Plain data row types written by output backends.

use bl_sim::BusUtilization;
use serde::Serialize;

/// One passenger boarding one bus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoardingRow {
    /// 0-based position in boarding order; matches the index into
    /// `Metrics::waiting_times`.
    pub seq:      u64,
    /// Boarding time, minutes since the first scheduled trip.
    pub time:     f64,
    pub bus_id:   u64,
    pub terminal: u32,
    /// Minutes between arrival and boarding.
    pub wait:     f64,
}

/// Final passenger count for one bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UtilizationRow {
    pub bus_id:     u64,
    pub passengers: u64,
}

/// One row per bus, ascending by bus id.
pub fn utilization_rows(utilization: &BusUtilization) -> Vec<UtilizationRow> {
    utilization
        .iter()
        .map(|(bus, &passengers)| UtilizationRow { bus_id: bus.0, passengers })
        .collect()
}
