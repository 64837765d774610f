//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use bl_core::{BusId, SimTime, TerminalId};
use bl_sim::{Metrics, SimObserver};

use crate::row::{BoardingRow, utilization_rows};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// Rows buffered before a boarding batch is handed to the writer.
pub const DEFAULT_BATCH_SIZE: usize = 4_096;

/// A [`SimObserver`] that streams boardings to any [`OutputWriter`] backend.
///
/// Boarding rows are buffered and written in batches, and whatever is left
/// is flushed when a run returns.  The writer is not closed at that point so
/// a stopped run can be resumed with the same observer; call
/// [`finish`][Self::finish] once the simulation is over to write per-bus
/// totals and close the backend.
///
/// Errors from the writer are stored because `SimObserver` methods have no
/// return value.  Check them with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    buffer:     Vec<BoardingRow>,
    batch_size: usize,
    next_seq:   u64,
    last_error: Option<OutputError>,
    finished:   bool,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self::with_batch_size(writer, DEFAULT_BATCH_SIZE)
    }

    /// Flush every `batch_size` boardings (at least 1).
    pub fn with_batch_size(writer: W, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            writer,
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            next_seq: 0,
            last_error: None,
            finished: false,
        }
    }

    /// Boardings seen so far.
    pub fn boardings(&self) -> u64 {
        self.next_seq
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush buffered boardings, write one utilization row per bus in
    /// `metrics`, and close the writer.
    ///
    /// Returns the first error stored during the run, if any, before
    /// attempting the final writes.  Only the first call does anything;
    /// later calls return `Ok(())`.
    pub fn finish(&mut self, metrics: &Metrics) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        if let Some(e) = self.last_error.take() {
            return Err(e);
        }
        self.flush()?;
        self.writer.write_utilization(&utilization_rows(metrics.bus_utilization()))?;
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush(&mut self) -> OutputResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let result = self.writer.write_boardings(&self.buffer);
        self.buffer.clear();
        result
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_boarding(&mut self, time: SimTime, bus: BusId, terminal: TerminalId, wait: f64) {
        self.buffer.push(BoardingRow {
            seq: self.next_seq,
            time: time.0,
            bus_id: bus.0,
            terminal: terminal.0,
            wait,
        });
        self.next_seq += 1;
        if self.buffer.len() >= self.batch_size {
            let result = self.flush();
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_time: SimTime, _pending: usize) {
        let result = self.flush();
        self.store_err(result);
    }
}
