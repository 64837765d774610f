//! The `OutputWriter` trait implemented by all backend writers.

use crate::{BoardingRow, OutputResult, UtilizationRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// When driven by [`SimOutputObserver`][crate::SimOutputObserver], errors
/// are stored and retrieved with
/// [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Append a batch of boardings.
    fn write_boardings(&mut self, rows: &[BoardingRow]) -> OutputResult<()>;

    /// Append per-bus passenger totals.
    fn write_utilization(&mut self, rows: &[UtilizationRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
