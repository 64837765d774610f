use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("trip parse error: {0}")]
    Parse(String),

    #[error("invalid trip record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
