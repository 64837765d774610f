//! Per-terminal passenger queues.
//!
//! Each terminal owns two FIFOs: the passengers waiting there and the
//! processes parked on an empty queue.  Queues are the only state shared
//! between passenger and bus processes; the engine's one-process-at-a-time
//! rule serialises every access, so there is no locking.
//!
//! # Wake protocol
//!
//! ```text
//! dequeue(empty)  → caller parked (FIFO among parked waiters) → Dequeue::Parked
//! enqueue(item)   → item appended; oldest parked waiter (if any) returned
//!                   for the engine to resume.  The waiter is NOT handed the
//!                   item: it must dequeue again when it runs.
//! abandon(caller) → caller removed from the parked list
//! ```

use std::collections::VecDeque;

use bl_core::{ProcessId, SimTime, TerminalId};

use crate::{SimError, SimResult};

/// A passenger waiting at a terminal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Passenger {
    pub arrival_time: SimTime,
    pub terminal:     TerminalId,
}

/// Result of a [`TerminalQueues::dequeue`] call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Dequeue {
    /// The oldest waiting passenger, now removed from the queue.
    Ready(Passenger),
    /// The queue was empty; the caller is parked until an enqueue wakes it.
    Parked,
}

/// One terminal's waiting passengers and parked processes.
#[derive(Debug, Default)]
pub struct TerminalQueue {
    waiting: VecDeque<Passenger>,
    parked:  VecDeque<ProcessId>,
}

impl TerminalQueue {
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Passengers in queue order, oldest first.
    pub fn waiting(&self) -> impl Iterator<Item = &Passenger> {
        self.waiting.iter()
    }

    /// Processes parked on this terminal, oldest first.
    pub fn parked(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.parked.iter().copied()
    }
}

/// Queues for every registered terminal, indexed by `TerminalId`.
#[derive(Debug, Default)]
pub struct TerminalQueues {
    queues: Vec<TerminalQueue>,
}

impl TerminalQueues {
    /// Register terminals `0..count`.
    pub fn new(count: usize) -> Self {
        Self {
            queues: (0..count).map(|_| TerminalQueue::default()).collect(),
        }
    }

    /// Number of registered terminals.
    pub fn terminal_count(&self) -> usize {
        self.queues.len()
    }

    pub fn contains(&self, terminal: TerminalId) -> bool {
        terminal.index() < self.queues.len()
    }

    pub fn get(&self, terminal: TerminalId) -> SimResult<&TerminalQueue> {
        self.queues
            .get(terminal.index())
            .ok_or(SimError::UnknownTerminal(terminal))
    }

    fn get_mut(&mut self, terminal: TerminalId) -> SimResult<&mut TerminalQueue> {
        self.queues
            .get_mut(terminal.index())
            .ok_or(SimError::UnknownTerminal(terminal))
    }

    /// Append `passenger` to `terminal`'s queue.
    ///
    /// Returns the oldest parked waiter, which the caller must resume.
    pub fn enqueue(
        &mut self,
        terminal:  TerminalId,
        passenger: Passenger,
    ) -> SimResult<Option<ProcessId>> {
        let queue = self.get_mut(terminal)?;
        queue.waiting.push_back(passenger);
        Ok(queue.parked.pop_front())
    }

    /// Remove the oldest passenger at `terminal`, or park `caller` if there is
    /// none.
    pub fn dequeue(&mut self, terminal: TerminalId, caller: ProcessId) -> SimResult<Dequeue> {
        let queue = self.get_mut(terminal)?;
        match queue.waiting.pop_front() {
            Some(p) => Ok(Dequeue::Ready(p)),
            None => {
                queue.parked.push_back(caller);
                Ok(Dequeue::Parked)
            }
        }
    }

    /// Withdraw a parked `caller`.  Returns `false` if it was not parked here.
    pub fn abandon(&mut self, terminal: TerminalId, caller: ProcessId) -> SimResult<bool> {
        let queue = self.get_mut(terminal)?;
        match queue.parked.iter().position(|&p| p == caller) {
            Some(pos) => {
                queue.parked.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Waiting passengers at `terminal`.
    pub fn len(&self, terminal: TerminalId) -> SimResult<usize> {
        self.get(terminal).map(TerminalQueue::len)
    }

    pub fn is_empty(&self, terminal: TerminalId) -> SimResult<bool> {
        self.get(terminal).map(TerminalQueue::is_empty)
    }

    /// Waiting passengers across all terminals.
    pub fn total_waiting(&self) -> usize {
        self.queues.iter().map(TerminalQueue::len).sum()
    }

    /// Iterate `(terminal, queue)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TerminalId, &TerminalQueue)> {
        self.queues
            .iter()
            .enumerate()
            .map(|(i, q)| (TerminalId(i as u32), q))
    }
}
