//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `boardings.csv`
//! - `bus_utilization.csv`

use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::writer::OutputWriter;
use crate::{BoardingRow, OutputResult, UtilizationRow};

/// Writes run output to two CSV files.
pub struct CsvWriter {
    boardings:   Writer<File>,
    utilization: Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Create both files in `dir` and write their header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut boardings = open(&dir.join("boardings.csv"))?;
        boardings.write_record(["seq", "time", "bus_id", "terminal", "wait"])?;

        let mut utilization = open(&dir.join("bus_utilization.csv"))?;
        utilization.write_record(["bus_id", "passengers"])?;

        Ok(Self { boardings, utilization, finished: false })
    }
}

// Headers are written up front so an empty run still yields readable files.
fn open(path: &Path) -> OutputResult<Writer<File>> {
    Ok(WriterBuilder::new().has_headers(false).from_path(path)?)
}

impl OutputWriter for CsvWriter {
    fn write_boardings(&mut self, rows: &[BoardingRow]) -> OutputResult<()> {
        for row in rows {
            self.boardings.serialize(row)?;
        }
        Ok(())
    }

    fn write_utilization(&mut self, rows: &[UtilizationRow]) -> OutputResult<()> {
        for row in rows {
            self.utilization.serialize(row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.boardings.flush()?;
        self.utilization.flush()?;
        Ok(())
    }
}
