//! `bl-sim` — discrete-event core of the busline route simulator.
//!
//! # Event loop
//!
//! ```text
//! while next event (at, seq) has at <= until:
//!   ① clock ← at
//!   ② resume the event's process (passenger or bus state machine)
//!   ③ apply its Step:
//!        Timeout(d) → file event at now + d
//!        Yield      → file event at now (after same-instant events already filed)
//!        Park       → wait on a terminal queue; an enqueue files it at now
//!        Finished   → drop the process
//! ```
//!
//! Ties at the same instant resume in scheduling order, so a given input
//! always produces the same waiting times and utilization.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs [`sweep::capacity_sweep`] on Rayon's thread pool. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use bl_core::SimConfig;
//! use bl_schedule::load_trips_csv;
//! use bl_sim::{NoopObserver, SimBuilder};
//!
//! let dataset = load_trips_csv(Path::new("bus_trips.csv"))?;
//! let mut sim = SimBuilder::new(SimConfig::default(), &dataset).build()?;
//! sim.run_to_horizon(&mut NoopObserver)?;
//! println!("{} passengers boarded", sim.metrics().total_boarded());
//! ```

pub mod builder;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod process;
pub mod sim;
pub mod sweep;
pub mod terminal;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use engine::{EventQueue, Scheduled};
pub use error::{SimError, SimResult};
pub use metrics::{BusUtilization, Metrics, WaitingTimes};
pub use observer::{NoopObserver, SimObserver};
pub use process::{ProcessState, Step};
pub use sim::{RunStats, Sim};
pub use sweep::capacity_sweep;
pub use terminal::{Dequeue, Passenger, TerminalQueue, TerminalQueues};
