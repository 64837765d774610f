use bl_core::{BlError, BusId, ProcessId, SimTime, TerminalId};
use thiserror::Error;

/// Engine invariant violations.  All are fatal: the run stops at the first
/// one rather than skipping the offending event.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] BlError),

    #[error("cannot schedule {process} at {at}: due time must be finite and >= now ({now})")]
    InvalidDueTime {
        process: ProcessId,
        at:      SimTime,
        now:     SimTime,
    },

    #[error("invalid run bound {0}: must be >= 0")]
    InvalidBound(SimTime),

    #[error("{0} has no registered queue")]
    UnknownTerminal(TerminalId),

    #[error("{0} is not a live process")]
    UnknownProcess(ProcessId),

    #[error("{bus} trip {trip} has invalid duration {duration}")]
    InvalidDuration {
        bus:      BusId,
        trip:     usize,
        duration: f64,
    },
}

pub type SimResult<T> = Result<T, SimError>;
