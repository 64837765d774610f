//! Fluent builder for constructing a [`Sim`] from a trip dataset.

use bl_core::{SimConfig, SimTime};
use bl_schedule::TripDataset;

use crate::{Sim, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`] — capacity, horizon factor, optional explicit bound
/// - [`TripDataset`] — validated arrivals and per-bus itineraries
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                                       |
/// |------------------------|-----------------------------------------------|
/// | `.extra_terminals(n)`  | 0: one queue per dataset terminal             |
/// | `.without_passengers()`| Passengers spawned from every arrival         |
///
/// # Registration order
///
/// All passenger processes are spawned first, in the dataset's arrival
/// order, then one bus process per itinerary in ascending `BusId` order.
/// Every process starts at time zero, so this is also the order in which
/// they first run.
///
/// # Example
///
/// ```rust,ignore
/// let dataset = load_trips_csv(Path::new("trips.csv"))?;
/// let mut sim = SimBuilder::new(SimConfig::default(), &dataset).build()?;
/// sim.run_to_horizon(&mut NoopObserver)?;
/// let (waits, utilization) = sim.into_metrics().into_parts();
/// ```
pub struct SimBuilder<'a> {
    config:          SimConfig,
    dataset:         &'a TripDataset,
    extra_terminals: usize,
    passengers:      bool,
}

impl<'a> SimBuilder<'a> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, dataset: &'a TripDataset) -> Self {
        Self {
            config,
            dataset,
            extra_terminals: 0,
            passengers:      true,
        }
    }

    /// Register `n` additional empty terminals after the dataset's own,
    /// for callers that spawn extra processes by hand.
    pub fn extra_terminals(mut self, n: usize) -> Self {
        self.extra_terminals = n;
        self
    }

    /// Spawn bus processes only.  Useful for driving arrivals manually.
    pub fn without_passengers(mut self) -> Self {
        self.passengers = false;
        self
    }

    /// The run bound `build` will install: `config.until`, or the dataset
    /// horizon scaled by `config.horizon_factor`.
    pub fn horizon(&self) -> SimTime {
        self.config
            .run_bound(self.dataset.latest_arrival(), self.dataset.longest_trip())
    }

    /// Validate the config, create one queue per terminal, and spawn every
    /// passenger and bus process.
    pub fn build(self) -> SimResult<Sim> {
        let horizon = self.horizon();
        let terminal_count = self.dataset.terminals().len() + self.extra_terminals;
        let mut sim = Sim::new(self.config, terminal_count)?;

        if self.passengers {
            for arrival in self.dataset.arrivals() {
                sim.spawn_passenger(arrival.offset, arrival.terminal)?;
            }
        }
        for itinerary in self.dataset.itineraries() {
            sim.spawn_bus(itinerary.clone())?;
        }

        sim.set_horizon(horizon);
        Ok(sim)
    }
}
