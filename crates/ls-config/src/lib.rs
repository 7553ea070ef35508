//! `ls-config` — the engine's input boundary.
//!
//! The planning front end sends one loosely-typed JSON message.  This crate
//! deserializes it ([`raw`]), checks it once ([`validate`]) and hands the
//! engine a fully typed [`Scenario`]: a [`Line`], the orders with dates
//! converted to simulation hours, and the run [`Settings`].
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`raw`]      | `SimRequest` and the serde input types                     |
//! | [`line`]     | `Line`, `Station`, `Buffer`, `Flow`, `Settings`, …         |
//! | [`validate`] | `validate`, `Scenario`                                     |
//! | [`date`]     | `DD-MM-YYYY` / `YYYY-MM-DD` parsing                        |
//! | [`error`]    | `ConfigError`, `ConfigResult<T>`                           |

pub mod date;
pub mod error;
pub mod line;
pub mod raw;
pub mod validate;

#[cfg(test)]
mod tests;

pub use error::{ConfigError, ConfigResult};
pub use line::{
    Buffer, Flow, Line, OrderSpec, PoolSpec, Settings, Station, StationKind, TimeRule, WorkerFlow,
};
pub use raw::SimRequest;
pub use validate::{Scenario, validate};
