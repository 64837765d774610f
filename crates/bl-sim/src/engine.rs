//! `EventQueue` — virtual clock plus the pending-event heap.
//!
//! # Ordering
//!
//! Events are popped by ascending `(at, seq)`.  `seq` is a counter stamped at
//! scheduling time, so events due at the same instant resume in the order
//! they were filed.  This is what makes two runs over the same input
//! bit-identical: no ordering decision depends on heap internals.
//!
//! # Invariants
//!
//! - `now` never decreases.
//! - Every pending event has `at >= now`; [`EventQueue::schedule`] rejects
//!   anything else instead of clamping it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bl_core::{ProcessId, SimTime};
use tracing::trace;

use crate::{SimError, SimResult};

// ── Scheduled ─────────────────────────────────────────────────────────────────

/// A pending resumption of `process` at `at`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub at:      SimTime,
    pub seq:     u64,
    pub process: ProcessId,
}

// BinaryHeap is a max-heap; reverse so the earliest (at, seq) is on top.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .cmp(&other.at)
            .then_with(|| self.seq.cmp(&other.seq))
            .reverse()
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── EventQueue ────────────────────────────────────────────────────────────────

/// The simulation clock and its min-priority event set.
#[derive(Debug, Default)]
pub struct EventQueue {
    now:      SimTime,
    next_seq: u64,
    heap:     BinaryHeap<Scheduled>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time.
    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// File a resumption of `process` at absolute time `at`.
    ///
    /// Fails with [`SimError::InvalidDueTime`] if `at` is negative, not
    /// finite, or earlier than `now`.
    pub fn schedule(&mut self, process: ProcessId, at: SimTime) -> SimResult<u64> {
        if !at.is_valid() || at < self.now {
            return Err(SimError::InvalidDueTime { process, at, now: self.now });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(%process, at = at.0, seq, "scheduled");
        self.heap.push(Scheduled { at, seq, process });
        Ok(seq)
    }

    /// File a resumption `delay` minutes from now.
    pub fn schedule_in(&mut self, process: ProcessId, delay: f64) -> SimResult<u64> {
        self.schedule(process, self.now + delay)
    }

    /// Pop the earliest event if it is due at or before `until`, advancing
    /// the clock to its due time.
    pub fn pop_due(&mut self, until: SimTime) -> Option<Scheduled> {
        if self.heap.peek()?.at > until {
            return None;
        }
        let event = self.heap.pop()?;
        self.now = event.at;
        Some(event)
    }

    /// Move the clock forward to `to` without resuming anything.
    ///
    /// Ignored if `to` is earlier than `now` or not a valid time, so the clock
    /// stays monotone.
    pub fn advance_to(&mut self, to: SimTime) {
        if to.is_valid() && to > self.now {
            debug_assert!(
                self.heap.peek().is_none_or(|e| e.at >= to),
                "advancing past a pending event"
            );
            self.now = to;
        }
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<SimTime> {
        self.heap.peek().map(|e| e.at)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Sequence number the next scheduled event will receive.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}
