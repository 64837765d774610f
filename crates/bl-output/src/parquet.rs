//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `boardings.parquet`
//! - `bus_utilization.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{BoardingRow, OutputResult, UtilizationRow};

fn boarding_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("seq",      DataType::UInt64,  false),
        Field::new("time",     DataType::Float64, false),
        Field::new("bus_id",   DataType::UInt64,  false),
        Field::new("terminal", DataType::UInt32,  false),
        Field::new("wait",     DataType::Float64, false),
    ]))
}

fn utilization_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("bus_id",     DataType::UInt64, false),
        Field::new("passengers", DataType::UInt64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes run output to two Parquet files.
///
/// `finish()` **must** be called to write the Parquet footers; files written
/// without it cannot be opened by Parquet readers.
pub struct ParquetWriter {
    boardings:          Option<ArrowWriter<File>>,
    utilization:        Option<ArrowWriter<File>>,
    boarding_schema:    Arc<Schema>,
    utilization_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create both Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let boarding_schema = boarding_schema();
        let utilization_schema = utilization_schema();

        let boardings = ArrowWriter::try_new(
            File::create(dir.join("boardings.parquet"))?,
            Arc::clone(&boarding_schema),
            Some(snappy_props()),
        )?;
        let utilization = ArrowWriter::try_new(
            File::create(dir.join("bus_utilization.parquet"))?,
            Arc::clone(&utilization_schema),
            Some(snappy_props()),
        )?;

        Ok(Self {
            boardings: Some(boardings),
            utilization: Some(utilization),
            boarding_schema,
            utilization_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_boardings(&mut self, rows: &[BoardingRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.boardings.as_mut() else {
            return Ok(());
        };

        let mut seqs      = UInt64Builder::with_capacity(rows.len());
        let mut times     = Float64Builder::with_capacity(rows.len());
        let mut buses     = UInt64Builder::with_capacity(rows.len());
        let mut terminals = UInt32Builder::with_capacity(rows.len());
        let mut waits     = Float64Builder::with_capacity(rows.len());

        for row in rows {
            seqs.append_value(row.seq);
            times.append_value(row.time);
            buses.append_value(row.bus_id);
            terminals.append_value(row.terminal);
            waits.append_value(row.wait);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.boarding_schema),
            vec![
                Arc::new(seqs.finish()),
                Arc::new(times.finish()),
                Arc::new(buses.finish()),
                Arc::new(terminals.finish()),
                Arc::new(waits.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_utilization(&mut self, rows: &[UtilizationRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.utilization.as_mut() else {
            return Ok(());
        };

        let mut buses      = UInt64Builder::with_capacity(rows.len());
        let mut passengers = UInt64Builder::with_capacity(rows.len());
        for row in rows {
            buses.append_value(row.bus_id);
            passengers.append_value(row.passengers);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.utilization_schema),
            vec![Arc::new(buses.finish()), Arc::new(passengers.finish())],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.boardings.take() {
            w.close()?;
        }
        if let Some(w) = self.utilization.take() {
            w.close()?;
        }
        Ok(())
    }
}
