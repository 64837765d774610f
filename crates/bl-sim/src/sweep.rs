//! Capacity sweep: one independent run per candidate bus capacity.
//!
//! Runs share nothing but the read-only dataset, so with the `parallel`
//! feature they execute on Rayon's pool.  Each run is still single-threaded
//! and deterministic, so the parallel and sequential paths return identical
//! results in the same order.

use bl_core::SimConfig;
use bl_schedule::TripDataset;

use crate::{Metrics, NoopObserver, SimBuilder, SimResult};

/// Run `dataset` once per entry in `capacities`, each to its own horizon.
///
/// Every field of `base` except `bus_capacity` is shared by all runs.
/// Results come back in `capacities` order.
pub fn capacity_sweep(
    dataset:    &TripDataset,
    base:       &SimConfig,
    capacities: &[u32],
) -> SimResult<Vec<(u32, Metrics)>> {
    #[cfg(not(feature = "parallel"))]
    {
        capacities
            .iter()
            .map(|&c| run_one(dataset, base, c).map(|m| (c, m)))
            .collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        capacities
            .par_iter()
            .map(|&c| run_one(dataset, base, c).map(|m| (c, m)))
            .collect()
    }
}

fn run_one(dataset: &TripDataset, base: &SimConfig, capacity: u32) -> SimResult<Metrics> {
    let config = SimConfig { bus_capacity: capacity, ..base.clone() };
    let mut sim = SimBuilder::new(config, dataset).build()?;
    sim.run_to_horizon(&mut NoopObserver)?;
    Ok(sim.into_metrics())
}
