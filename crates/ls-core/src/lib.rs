//! `ls-core` — foundational types for the line-sim workspace.
//!
//! This crate is a dependency of every other `ls-*` crate.  It has no `ls-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                    |
//! |-----------|-------------------------------------------------------------|
//! | [`ids`]   | `StationId`, `BufferId`, `PoolId`, `PartId`, `OrderId`, `FlowId`, `NodeRef` |
//! | [`time`]  | `SimTime` (hours since start), `TimeOfDay`                  |
//! | [`rng`]   | `SimRng` (seeded, deterministic)                            |
//! | [`error`] | `CoreError`, `CoreResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{BufferId, FlowId, NodeRef, OrderId, PartId, PoolId, StationId};
pub use rng::SimRng;
pub use time::{SimTime, TimeOfDay};
