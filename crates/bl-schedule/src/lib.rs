//! `bl-schedule` — trip data preparation for the simulation core.
//!
//! Everything here runs *before* the engine is built: parsing the trip
//! dataset, rejecting malformed rows, converting timestamps to simulation
//! offsets, and grouping trips into per-bus itineraries.  The simulation core
//! assumes its input was validated here.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`trip`]      | `TripRecord`, `Trip`, `Itinerary`, `Arrival`              |
//! | [`dataset`]   | `TripDataset`, `TerminalRegistry`                         |
//! | [`loader`]    | `load_trips_csv`, `load_trips_reader`                     |
//! | [`generator`] | `SyntheticSpec`, `generate_trips`                         |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Dataset model (summary)
//!
//! Every trip record contributes two things:
//!
//! ```text
//! one passenger  → arrives at start_terminal at (scheduled_start − earliest start)
//! one trip       → appended to its bus's itinerary, in scheduled-start order
//! ```

pub mod dataset;
pub mod error;
pub mod generator;
pub mod loader;
pub mod trip;


pub use dataset::{TerminalRegistry, TripDataset};
pub use error::{ScheduleError, ScheduleResult};
pub use generator::{SyntheticSpec, generate_trips};
pub use loader::{load_trips_csv, load_trips_reader};
pub use trip::{Arrival, Itinerary, Trip, TripRecord};
