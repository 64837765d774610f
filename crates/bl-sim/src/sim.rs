//! The `Sim` struct and its event loop.

use bl_core::{BusId, ProcessId, SimConfig, SimTime, TerminalId};
use bl_schedule::Itinerary;
use tracing::{info, trace};

use crate::engine::EventQueue;
use crate::metrics::Metrics;
use crate::process::{BusProcess, PassengerProcess, Process, ProcessState, Step, StepContext};
use crate::terminal::TerminalQueues;
use crate::{SimError, SimObserver, SimResult};

// ── Process table ─────────────────────────────────────────────────────────────

/// A live process and its lifecycle state.  Finished processes leave `None`
/// behind so ids stay stable.
struct Slot {
    process: Process,
    state:   ProcessState,
}

/// What one call to [`Sim::run`] did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunStats {
    /// Events resumed during this call.
    pub events:     u64,
    /// Clock value when the call returned.
    pub final_time: SimTime,
    /// Events still pending (due after the bound).
    pub pending:    usize,
    /// Processes not yet finished.
    pub live:       usize,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` owns the clock, the event heap, the terminal queues, every live
/// process, and the metrics.  It drives a single-threaded loop:
///
/// 1. Pop the earliest event `(at, seq)` with `at <= until`; the clock jumps
///    to `at`.
/// 2. Resume that event's process.  The process runs to its next suspension
///    point and returns a [`Step`].
/// 3. Apply the step: `Timeout(d)` files a new event at `now + d`, `Yield`
///    files one at `now`, `Park` leaves the process on a terminal queue, and
///    `Finished` drops it.  Processes woken by an enqueue are filed at `now`.
///
/// Create via [`Sim::new`] and the `spawn_*` methods, or via
/// [`SimBuilder`][crate::SimBuilder] from a `TripDataset`.
pub struct Sim {
    /// Validated configuration.
    pub config: SimConfig,

    events:    EventQueue,
    terminals: TerminalQueues,
    processes: Vec<Option<Slot>>,
    metrics:   Metrics,
    horizon:   SimTime,
    wakes:     Vec<ProcessId>,
}

impl Sim {
    /// An engine at time zero with `terminal_count` empty terminal queues.
    pub fn new(config: SimConfig, terminal_count: usize) -> SimResult<Self> {
        config.validate()?;
        let horizon = config.until.unwrap_or(SimTime::NEVER);
        Ok(Self {
            config,
            events:    EventQueue::new(),
            terminals: TerminalQueues::new(terminal_count),
            processes: Vec::new(),
            metrics:   Metrics::new(),
            horizon,
            wakes:     Vec::new(),
        })
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register a passenger who will appear at `terminal` `offset` minutes
    /// from now.  The process starts at the current instant.
    pub fn spawn_passenger(&mut self, offset: SimTime, terminal: TerminalId) -> SimResult<ProcessId> {
        if !self.terminals.contains(terminal) {
            return Err(SimError::UnknownTerminal(terminal));
        }
        let pid = self.next_pid();
        let at = self.events.now().offset(offset.0);
        if !offset.is_valid() || !at.is_valid() {
            return Err(SimError::InvalidDueTime { process: pid, at, now: self.events.now() });
        }
        self.insert(Process::Passenger(PassengerProcess::new(offset, terminal)))
    }

    /// Register a bus that will run `itinerary`.  The process starts at the
    /// current instant, and the bus gets a zero utilization entry right away.
    pub fn spawn_bus(&mut self, itinerary: Itinerary) -> SimResult<ProcessId> {
        for (i, trip) in itinerary.trips().iter().enumerate() {
            for terminal in [trip.origin, trip.destination] {
                if !self.terminals.contains(terminal) {
                    return Err(SimError::UnknownTerminal(terminal));
                }
            }
            if !trip.duration.is_finite() || trip.duration < 0.0 {
                return Err(SimError::InvalidDuration {
                    bus:      itinerary.bus_id,
                    trip:     i,
                    duration: trip.duration,
                });
            }
        }
        self.metrics.register_bus(itinerary.bus_id);
        self.insert(Process::Bus(BusProcess::new(itinerary)))
    }

    fn next_pid(&self) -> ProcessId {
        ProcessId(self.processes.len() as u32)
    }

    fn insert(&mut self, process: Process) -> SimResult<ProcessId> {
        let pid = self.next_pid();
        self.events.schedule(pid, self.events.now())?;
        trace!(%pid, kind = process.kind(), "spawned");
        self.processes.push(Some(Slot { process, state: ProcessState::Pending }));
        Ok(pid)
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Resume events in `(due time, seq)` order until none remain with due
    /// time `<= until`.
    ///
    /// Stopping with processes still pending is a normal outcome.  When
    /// `until` is finite the clock ends at `until`, so a later call continues
    /// from there.
    pub fn run<O: SimObserver>(&mut self, until: SimTime, observer: &mut O) -> SimResult<RunStats> {
        if until.0.is_nan() || until.0 < 0.0 {
            return Err(SimError::InvalidBound(until));
        }
        // -0.0 is time zero.
        let until = SimTime(until.0 + 0.0);
        info!(
            until = until.0,
            pending = self.events.len(),
            now = self.events.now().0,
            "run started"
        );

        let mut events = 0u64;
        while let Some(event) = self.events.pop_due(until) {
            events += 1;
            self.resume(event.process, observer)?;
        }
        self.events.advance_to(until);

        let stats = RunStats {
            events,
            final_time: self.events.now(),
            pending:    self.events.len(),
            live:       self.live_processes(),
        };
        observer.on_sim_end(stats.final_time, stats.pending);
        info!(
            events,
            final_time = stats.final_time.0,
            pending = stats.pending,
            live = stats.live,
            boarded = self.metrics.total_boarded(),
            "run finished"
        );
        Ok(stats)
    }

    /// Run to the configured horizon: `config.until` when set (or the
    /// dataset horizon when built by [`SimBuilder`][crate::SimBuilder]),
    /// otherwise until the event set is exhausted.
    pub fn run_to_horizon<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunStats> {
        self.run(self.horizon, observer)
    }

    pub fn now(&self) -> SimTime {
        self.events.now()
    }

    /// The bound used by [`run_to_horizon`][Self::run_to_horizon].
    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    pub(crate) fn set_horizon(&mut self, horizon: SimTime) {
        self.horizon = horizon;
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn into_metrics(self) -> Metrics {
        self.metrics
    }

    pub fn terminals(&self) -> &TerminalQueues {
        &self.terminals
    }

    /// Number of pending events.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Number of processes not yet finished.
    pub fn live_processes(&self) -> usize {
        self.processes.iter().filter(|s| s.is_some()).count()
    }

    /// Lifecycle state of `pid`, or `None` if it was never spawned.
    pub fn process_state(&self, pid: ProcessId) -> Option<ProcessState> {
        match self.processes.get(pid.index())? {
            Some(slot) => Some(slot.state),
            None => Some(ProcessState::Finished),
        }
    }

    /// The bus driven by `pid`, if it is a live bus process.
    pub fn bus_of(&self, pid: ProcessId) -> Option<BusId> {
        match self.processes.get(pid.index())? {
            Some(Slot { process: Process::Bus(b), .. }) => Some(b.bus_id()),
            _ => None,
        }
    }

    // ── Core event processing ─────────────────────────────────────────────

    /// Resume `pid` for one step.  The process keeps its slot and its last
    /// successful state when the step fails, and pending wakes never outlive
    /// the call.
    fn resume<O: SimObserver>(&mut self, pid: ProcessId, observer: &mut O) -> SimResult<()> {
        let mut slot = self
            .processes
            .get_mut(pid.index())
            .and_then(Option::take)
            .ok_or(SimError::UnknownProcess(pid))?;

        self.wakes.clear();
        let outcome = self.step(pid, &mut slot, observer);
        if outcome.is_err() || slot.state != ProcessState::Finished {
            self.processes[pid.index()] = Some(slot);
        }
        let outcome = outcome.and_then(|()| self.schedule_wakes());
        self.wakes.clear();
        outcome
    }

    fn step<O: SimObserver>(&mut self, pid: ProcessId, slot: &mut Slot, observer: &mut O) -> SimResult<()> {
        let now = self.events.now();
        trace!(%pid, kind = slot.process.kind(), now = now.0, "resumed");

        let step = {
            let mut ctx = StepContext {
                pid,
                now,
                capacity: self.config.bus_capacity,
                queues:   &mut self.terminals,
                metrics:  &mut self.metrics,
                observer: &mut *observer,
                wakes:    &mut self.wakes,
            };
            slot.process.resume(&mut ctx)?
        };

        slot.state = match step {
            Step::Timeout(delay) => {
                self.events.schedule_in(pid, delay)?;
                ProcessState::WaitingOnTimeout
            }
            Step::Yield => {
                self.events.schedule(pid, now)?;
                ProcessState::Runnable
            }
            Step::Park => ProcessState::WaitingOnQueue,
            Step::Finished => ProcessState::Finished,
        };
        Ok(())
    }

    /// File every waiter released during the last step at the current
    /// instant.  Buses abandon any dequeue that would park, so a bus-route run
    /// never releases anyone here.
    fn schedule_wakes(&mut self) -> SimResult<()> {
        let now = self.events.now();
        for i in 0..self.wakes.len() {
            let waiter = self.wakes[i];
            self.events.schedule(waiter, now)?;
            if let Some(Some(s)) = self.processes.get_mut(waiter.index()) {
                s.state = ProcessState::Runnable;
            }
        }
        Ok(())
    }
}
