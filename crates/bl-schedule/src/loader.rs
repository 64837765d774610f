//! CSV trip loader.
//!
//! # CSV format
//!
//! One row per trip.  Columns not listed below are ignored, so a raw export
//! with extra fields loads unchanged.
//!
//! ```csv
//! deviceid,date,start_time,start_terminal,end_terminal,duration_in_mins
//! 654,2021-10-04,06:05:00,Pettah,Kaduwela,52.5
//! 654,2021-10-04,07:10:00,Kaduwela,Pettah,61
//! 655,2021-10-04,06:20:00,Pettah,Kaduwela,49
//! ```
//!
//! `date` and `start_time` are joined and parsed as `%Y-%m-%d %H:%M:%S`
//! (seconds optional).  A row with an unparseable timestamp or a negative
//! duration fails the whole load; nothing is silently dropped.

use std::io::Read;
use std::path::Path;

use bl_core::BusId;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::trip::TripRecord;
use crate::{ScheduleError, ScheduleResult, TripDataset};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TripRow {
    deviceid:         u64,
    date:             String,
    start_time:       String,
    start_terminal:   String,
    end_terminal:     String,
    duration_in_mins: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and normalise a trip dataset from a CSV file.
pub fn load_trips_csv(path: &Path) -> ScheduleResult<TripDataset> {
    let file = std::fs::File::open(path)
        .map_err(ScheduleError::Io)?;
    load_trips_reader(file)
}

/// Like [`load_trips_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or for embedded datasets.
pub fn load_trips_reader<R: Read>(reader: R) -> ScheduleResult<TripDataset> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (i, result) in csv_reader.deserialize::<TripRow>().enumerate() {
        // Data rows are 1-based after the header line.
        let line = i + 2;
        let row = result.map_err(|e| ScheduleError::Parse(format!("line {line}: {e}")))?;

        let scheduled_start = parse_timestamp(&row.date, &row.start_time)
            .ok_or_else(|| {
                ScheduleError::Parse(format!(
                    "line {line}: invalid timestamp {:?} {:?}",
                    row.date, row.start_time
                ))
            })?;

        if !row.duration_in_mins.is_finite() || row.duration_in_mins < 0.0 {
            return Err(ScheduleError::Parse(format!(
                "line {line}: duration_in_mins must be >= 0, got {}",
                row.duration_in_mins
            )));
        }

        records.push(TripRecord {
            bus_id:          BusId(row.deviceid),
            start_terminal:  row.start_terminal.trim().to_owned(),
            end_terminal:    row.end_terminal.trim().to_owned(),
            duration_mins:   row.duration_in_mins,
            scheduled_start,
        });
    }

    TripDataset::new(records)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
}
