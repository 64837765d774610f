//! Base error type.
//!
//! Sub-crates define their own error enums (`ScheduleError`, `SimError`,
//! `OutputError`) and wrap `BlError` as one variant where configuration
//! problems can surface.

use thiserror::Error;

/// The top-level error type for `bl-core`.
#[derive(Debug, Error)]
pub enum BlError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `bl-core`.
pub type BlResult<T> = Result<T, BlError>;
