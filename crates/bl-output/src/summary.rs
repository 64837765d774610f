//! Headline statistics for one run.

use std::fmt;

use bl_sim::{BusUtilization, Metrics};
use serde::Serialize;

/// Aggregates over a run's waiting times and bus utilization.
///
/// Empty inputs never divide by zero: means fall back to `0.0` and the
/// extremes to `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub passengers_served: usize,
    /// Mean wait in minutes.
    pub mean_wait:         f64,
    pub min_wait:          Option<f64>,
    pub max_wait:          Option<f64>,
    pub bus_count:         usize,
    /// Mean passengers per bus, counting buses that boarded nobody.
    pub mean_utilization:  f64,
    /// `(least, most)` passengers boarded by a single bus.
    pub utilization_range: Option<(u64, u64)>,
}

impl Summary {
    pub fn from_metrics(metrics: &Metrics) -> Self {
        Self::from_parts(metrics.waiting_times(), metrics.bus_utilization())
    }

    pub fn from_parts(waits: &[f64], utilization: &BusUtilization) -> Self {
        let passengers_served = waits.len();
        let mean_wait = if waits.is_empty() {
            0.0
        } else {
            waits.iter().sum::<f64>() / passengers_served as f64
        };
        let min_wait = waits.iter().copied().reduce(f64::min);
        let max_wait = waits.iter().copied().reduce(f64::max);

        let bus_count = utilization.len();
        let mean_utilization = if bus_count == 0 {
            0.0
        } else {
            utilization.values().sum::<u64>() as f64 / bus_count as f64
        };
        let utilization_range = utilization
            .values()
            .copied()
            .min()
            .zip(utilization.values().copied().max());

        Self {
            passengers_served,
            mean_wait,
            min_wait,
            max_wait,
            bus_count,
            mean_utilization,
            utilization_range,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Passengers served      : {}", self.passengers_served)?;
        writeln!(f, "Average waiting time   : {:.2} min", self.mean_wait)?;
        match (self.min_wait, self.max_wait) {
            (Some(lo), Some(hi)) => writeln!(f, "Waiting time range     : {lo:.2} - {hi:.2} min")?,
            _ => writeln!(f, "Waiting time range     : n/a")?,
        }
        writeln!(f, "Buses                  : {}", self.bus_count)?;
        writeln!(f, "Average bus utilization: {:.2} passengers", self.mean_utilization)?;
        match self.utilization_range {
            Some((lo, hi)) => write!(f, "Utilization range      : {lo} - {hi} passengers"),
            None => write!(f, "Utilization range      : n/a"),
        }
    }
}
