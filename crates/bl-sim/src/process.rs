//! Passenger and bus processes as explicit state machines.
//!
//! A process never blocks.  The engine calls [`Process::resume`], the process
//! does whatever it can at the current instant, and returns a [`Step`] saying
//! how it wants to be resumed next.  The enum state stored in each process
//! records *where* it was suspended, so the next `resume` continues from
//! there.
//!
//! ```text
//! Passenger:  Pending ──Timeout(offset)──▶ Arriving ──enqueue──▶ Finished
//!
//! Bus:   Pending ──▶ board
//!                      │ seats left: dequeue(origin)
//!                      │   Ready  ──Yield──▶ Holding ──record wait──▶ board
//!                      │   Parked ──abandon──▶ depart
//!                      │ full: depart
//!                      ▼
//!        depart ──Timeout(duration)──▶ Traveling ──next trip──▶ board
//!        no trips left ──▶ Finished
//! ```
//!
//! Boarding is a snapshot drain: the bus only takes passengers already
//! queued when it looks, and departs as soon as the queue is empty or the
//! bus is full.  It never waits for later arrivals: a dequeue that would
//! park is abandoned on the spot, so a bus never returns [`Step::Park`].
//! `Park` and the wake path belong to the queue contract of the engine.

use bl_core::{BusId, ProcessId, SimTime, TerminalId};
use bl_schedule::Itinerary;
use tracing::debug;

use crate::metrics::Metrics;
use crate::terminal::{Dequeue, Passenger, TerminalQueues};
use crate::{SimObserver, SimResult};

// ── Step ──────────────────────────────────────────────────────────────────────

/// How a process wants to continue after a `resume`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Step {
    /// Resume after `delay` minutes of virtual time.
    Timeout(f64),
    /// Resume at the current instant, after events already filed for it.
    Yield,
    /// Parked on a terminal queue; an enqueue will wake it.
    Park,
    /// Done.  The process is dropped.
    Finished,
}

/// Externally visible lifecycle state of a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    /// Spawned, first resumption not yet reached.
    Pending,
    WaitingOnTimeout,
    WaitingOnQueue,
    /// Due to resume at the current instant.
    Runnable,
    Finished,
}

// ── StepContext ───────────────────────────────────────────────────────────────

/// Everything a process may touch while it runs.
pub struct StepContext<'a, O: SimObserver> {
    pub pid:      ProcessId,
    pub now:      SimTime,
    pub capacity: u32,
    pub queues:   &'a mut TerminalQueues,
    pub metrics:  &'a mut Metrics,
    pub observer: &'a mut O,
    /// Parked processes woken during this step, in wake order.
    pub wakes:    &'a mut Vec<ProcessId>,
}

// ── Process ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Process {
    Passenger(PassengerProcess),
    Bus(BusProcess),
}

impl Process {
    pub fn resume<O: SimObserver>(&mut self, ctx: &mut StepContext<'_, O>) -> SimResult<Step> {
        match self {
            Process::Passenger(p) => p.resume(ctx),
            Process::Bus(b) => b.resume(ctx),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Process::Passenger(_) => "passenger",
            Process::Bus(_) => "bus",
        }
    }
}

// ── PassengerProcess ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PassengerState {
    Pending,
    Arriving,
}

/// Appears at `terminal` `offset` minutes after it starts, then finishes.
#[derive(Debug)]
pub struct PassengerProcess {
    offset:   f64,
    terminal: TerminalId,
    state:    PassengerState,
}

impl PassengerProcess {
    pub fn new(offset: SimTime, terminal: TerminalId) -> Self {
        Self {
            offset: offset.0,
            terminal,
            state: PassengerState::Pending,
        }
    }

    fn resume<O: SimObserver>(&mut self, ctx: &mut StepContext<'_, O>) -> SimResult<Step> {
        match self.state {
            PassengerState::Pending => {
                self.state = PassengerState::Arriving;
                Ok(Step::Timeout(self.offset))
            }
            PassengerState::Arriving => {
                let passenger = Passenger { arrival_time: ctx.now, terminal: self.terminal };
                if let Some(waiter) = ctx.queues.enqueue(self.terminal, passenger)? {
                    ctx.wakes.push(waiter);
                }
                let queue_len = ctx.queues.len(self.terminal)?;
                ctx.observer.on_arrival(ctx.now, self.terminal, queue_len);
                Ok(Step::Finished)
            }
        }
    }
}

// ── BusProcess ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
enum BusState {
    Pending,
    /// Dequeued this passenger; records the wait on the next resume.
    Holding(Passenger),
    Traveling,
}

/// Works through one bus's itinerary, boarding at each origin.
#[derive(Debug)]
pub struct BusProcess {
    itinerary: Itinerary,
    /// Index of the current trip.
    trip:      usize,
    boarded:   u32,
    total:     u64,
    state:     BusState,
}

impl BusProcess {
    pub fn new(itinerary: Itinerary) -> Self {
        Self {
            itinerary,
            trip:    0,
            boarded: 0,
            total:   0,
            state:   BusState::Pending,
        }
    }

    pub fn bus_id(&self) -> BusId {
        self.itinerary.bus_id
    }

    fn resume<O: SimObserver>(&mut self, ctx: &mut StepContext<'_, O>) -> SimResult<Step> {
        match self.state {
            BusState::Pending => {}
            BusState::Holding(passenger) => {
                let wait = ctx.now.since(passenger.arrival_time);
                ctx.metrics.record_boarding(self.bus_id(), wait);
                ctx.observer.on_boarding(ctx.now, self.bus_id(), passenger.terminal, wait);
                self.boarded += 1;
                self.total += 1;
            }
            BusState::Traveling => {
                self.trip += 1;
                self.boarded = 0;
            }
        }
        self.board_or_depart(ctx)
    }

    /// Take the next passenger for the current trip, or leave on it, or
    /// finish if the itinerary is exhausted.
    fn board_or_depart<O: SimObserver>(&mut self, ctx: &mut StepContext<'_, O>) -> SimResult<Step> {
        let bus = self.bus_id();
        let Some(&trip) = self.itinerary.trips().get(self.trip) else {
            ctx.metrics.finish_bus(bus);
            ctx.observer.on_bus_finished(ctx.now, bus, self.total);
            debug!(%bus, total = self.total, now = ctx.now.0, "bus finished");
            return Ok(Step::Finished);
        };

        if self.boarded < ctx.capacity {
            match ctx.queues.dequeue(trip.origin, ctx.pid)? {
                Dequeue::Ready(passenger) => {
                    self.state = BusState::Holding(passenger);
                    return Ok(Step::Yield);
                }
                // Snapshot drain: an empty origin ends boarding for this trip.
                Dequeue::Parked => {
                    ctx.queues.abandon(trip.origin, ctx.pid)?;
                }
            }
        }

        ctx.observer.on_departure(ctx.now, bus, self.trip, trip.origin, self.boarded);
        debug!(
            %bus,
            trip = self.trip,
            boarded = self.boarded,
            duration = trip.duration,
            now = ctx.now.0,
            "departed"
        );
        self.state = BusState::Traveling;
        Ok(Step::Timeout(trip.duration))
    }
}
