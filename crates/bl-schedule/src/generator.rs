//! Synthetic trip generator for demos and tests.
//!
//! Each bus shuttles between randomly chosen terminals: a trip ends where
//! the next one begins, and consecutive trips are separated by a random
//! layover.  Bus `i` draws from its own child stream of the root `SimRng`,
//! so the same seed always reproduces the same dataset.

use bl_core::{BusId, SimRng};
use chrono::{NaiveDateTime, TimeDelta};

use crate::trip::TripRecord;

/// Upper bound on the records reserved up front.
const MAX_PREALLOC: usize = 1 << 20;

/// Shape of a generated dataset.
#[derive(Clone, Debug)]
pub struct SyntheticSpec {
    pub buses:         u32,
    pub terminals:     u32,
    pub trips_per_bus: u32,
    /// Trip duration range in minutes, `[min, max)`.
    pub duration_mins: (f64, f64),
    /// Layover between consecutive trips in minutes, `[min, max)`.  The first
    /// departure of each bus is drawn from the same range.
    pub layover_mins:  (f64, f64),
    /// Wall-clock time of the earliest possible departure.
    pub start:         NaiveDateTime,
    /// `BusId` of the first bus; the rest are numbered consecutively.
    pub first_bus_id:  u64,
}

impl SyntheticSpec {
    /// Name of terminal `i` in generated records.
    pub fn terminal_name(i: u32) -> String {
        format!("T{i}")
    }
}

/// Generate trip records according to `spec`.
///
/// Returns an empty vec if `spec.terminals == 0`.
pub fn generate_trips(spec: &SyntheticSpec, rng: &mut SimRng) -> Vec<TripRecord> {
    if spec.terminals == 0 {
        return Vec::new();
    }
    let terminals: Vec<u32> = (0..spec.terminals).collect();
    let mut records = Vec::with_capacity(record_capacity(spec));

    for b in 0..spec.buses {
        let mut bus_rng = rng.child(b as u64);
        let bus_id = BusId(spec.first_bus_id + b as u64);

        let mut at = spec.start + minutes(sample(&mut bus_rng, spec.layover_mins));
        let mut origin = *bus_rng.choose(&terminals).unwrap_or(&0);

        for _ in 0..spec.trips_per_bus {
            let destination = pick_other(&mut bus_rng, &terminals, origin);
            let duration = sample(&mut bus_rng, spec.duration_mins);

            records.push(TripRecord::new(
                bus_id,
                SyntheticSpec::terminal_name(origin),
                SyntheticSpec::terminal_name(destination),
                duration,
                at,
            ));

            at = at + minutes(duration + sample(&mut bus_rng, spec.layover_mins));
            origin = destination;
        }
    }
    records
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// `buses * trips_per_bus` without overflow, capped at [`MAX_PREALLOC`].
pub(crate) fn record_capacity(spec: &SyntheticSpec) -> usize {
    (spec.buses as usize)
        .saturating_mul(spec.trips_per_bus as usize)
        .min(MAX_PREALLOC)
}

/// Uniform draw from `[lo, hi)`; returns `lo` for an empty range.
fn sample(rng: &mut SimRng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

fn pick_other(rng: &mut SimRng, terminals: &[u32], current: u32) -> u32 {
    if terminals.len() < 2 {
        return current;
    }
    loop {
        let t = *rng.choose(terminals).unwrap_or(&current);
        if t != current {
            return t;
        }
    }
}

fn minutes(m: f64) -> TimeDelta {
    TimeDelta::milliseconds((m * 60_000.0).round() as i64)
}
