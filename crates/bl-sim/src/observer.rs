//! Simulation observer trait for progress reporting and data collection.

use bl_core::{BusId, SimTime, TerminalId};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] as processes act.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Observers see events; they cannot change
/// the simulation.
///
/// # Example — boarding counter
///
/// ```rust,ignore
/// struct BoardingCounter(usize);
///
/// impl SimObserver for BoardingCounter {
///     fn on_boarding(&mut self, _t: SimTime, _bus: BusId, _at: TerminalId, _wait: f64) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// A passenger joined `terminal`'s queue.  `queue_len` includes them.
    fn on_arrival(&mut self, _time: SimTime, _terminal: TerminalId, _queue_len: usize) {}

    /// `bus` took a passenger from `terminal` after `wait` minutes.
    fn on_boarding(&mut self, _time: SimTime, _bus: BusId, _terminal: TerminalId, _wait: f64) {}

    /// `bus` finished boarding for trip `trip` and started travelling.
    fn on_departure(
        &mut self,
        _time:    SimTime,
        _bus:     BusId,
        _trip:    usize,
        _origin:  TerminalId,
        _boarded: u32,
    ) {}

    /// `bus` completed its last trip; `total` is final.
    fn on_bus_finished(&mut self, _time: SimTime, _bus: BusId, _total: u64) {}

    /// Called once when `run` returns.  `pending` is the number of events
    /// left unprocessed because they fall after the run bound.
    fn on_sim_end(&mut self, _final_time: SimTime, _pending: usize) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
