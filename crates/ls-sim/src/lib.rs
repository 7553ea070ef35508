//! `ls-sim` — discrete-event engine for the line-sim workspace.
//!
//! # Event loop
//!
//! ```text
//! reset: release every order at its arrival (snapped to working time)
//! while an event is pending:
//!   ① Clock     — advance to the event time; charge station starvation.
//!   ② Sample    — record WIP when a sampling instant has passed.
//!   ③ Dispatch  — OrderArrival | PartArrives | WorkerArrives |
//!                 OperationComplete changes the state it owns.
//!   ④ Settle    — drain the follow-up work-list: buffers push their head
//!                 part, stations start operations, assembly stations pull
//!                 complete kits, until nothing moves.
//!   ⑤ Emit      — hand replay records to the observer.
//! ```
//!
//! Ties in time are broken by insertion order, so a run is fully
//! reproducible from its seed.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs replications on Rayon's thread pool.              |
//! | `serde`    | Serialize/Deserialize on reports and replay records.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ls_config::Scenario;
//! use ls_sim::{NoopObserver, SimBuilder};
//!
//! let scenario = Scenario::from_json(&request_text)?;
//! let mut sim = SimBuilder::from_scenario(scenario).build()?;
//! let report = sim.run(&mut NoopObserver)?;
//! println!("{} parts in {:.1} h", report.produced, report.end.hours());
//! ```

pub mod assembly;
pub mod builder;
pub mod error;
pub mod event;
pub mod handler;
pub mod observer;
pub mod replay;
pub mod replicate;
pub mod router;
pub mod sim;
pub mod state;
pub mod stats;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use event::Event;
pub use observer::{NoopObserver, SimObserver};
pub use replay::{ReplayEvent, StationStatus, UsageKind};
pub use replicate::{run_replications, summarize};
pub use sim::Sim;
pub use state::{BufferState, StationState};
pub use stats::{
    BufferReport, ComponentStatus, OrderReport, OrderStatus, PoolReport, SimReport, StationReport,
    WipSample,
};
