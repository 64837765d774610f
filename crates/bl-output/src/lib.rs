//! `bl-output` — reporting for busline runs.
//!
//! Two halves:
//!
//! - **Aggregation** over the raw [`Metrics`][bl_sim::Metrics]:
//!   [`Summary`] and [`wait_histogram`].
//! - **Persistence** through the [`OutputWriter`] trait.  Three backends are
//!   provided behind Cargo features:
//!
//! | Feature   | Backend  | Files created                                   |
//! |-----------|----------|-------------------------------------------------|
//! | *(none)*  | CSV      | `boardings.csv`, `bus_utilization.csv`          |
//! | `sqlite`  | SQLite   | `output.db`                                     |
//! | `parquet` | Parquet  | `boardings.parquet`, `bus_utilization.parquet`  |
//!
//! [`SimOutputObserver`] implements `bl_sim::SimObserver` and streams one
//! [`BoardingRow`] per boarding to any backend.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bl_output::{CsvWriter, SimOutputObserver, Summary};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run_to_horizon(&mut obs)?;
//! obs.finish(sim.metrics())?;
//! println!("{}", Summary::from_metrics(sim.metrics()));
//! ```

pub mod csv;
pub mod error;
pub mod histogram;
pub mod observer;
pub mod row;
pub mod summary;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use histogram::{HistogramBin, wait_histogram};
pub use observer::SimOutputObserver;
pub use row::{BoardingRow, UtilizationRow, utilization_rows};
pub use summary::Summary;
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
