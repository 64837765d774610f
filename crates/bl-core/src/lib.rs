//! `bl-core` — foundational types for the `busline` route simulator.
//!
//! This crate is a dependency of every other `bl-*` crate.  It has no `bl-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `BusId`, `TerminalId`, `ProcessId`                    |
//! | [`time`]        | `SimTime`, `SimConfig`                                |
//! | [`rng`]         | `SimRng` (seeded, splittable)                         |
//! | [`error`]       | `BlError`, `BlResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types; needed |
//! |         | to load `SimConfig` from a file.                           |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{BlError, BlResult};
pub use ids::{BusId, ProcessId, TerminalId};
pub use rng::SimRng;
pub use time::{DEFAULT_BUS_CAPACITY, DEFAULT_HORIZON_FACTOR, SimConfig, SimTime};
