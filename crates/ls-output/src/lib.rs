//! `ls-output` — sinks for what a line-sim run produces.
//!
//! A run yields two things: the replay trace, delivered record by record
//! through `SimObserver::on_replay`, and the final `SimReport`.
//!
//! | Type                | Sink                                                    |
//! |---------------------|---------------------------------------------------------|
//! | [`ReplayRecorder`]  | Keeps every replay record in memory.                    |
//! | [`ReplayStream`]    | Writes each record as one JSON line to any `Write`.     |
//! | [`SimResponse`]     | Report plus replay, the message the worker sends back.  |
//!
//! # Usage
//!
//! ```rust,ignore
//! use ls_output::ReplayRecorder;
//!
//! let mut recorder = ReplayRecorder::new();
//! let report = sim.run(&mut recorder)?;
//! recorder.into_response(report).write_json(std::io::stdout().lock())?;
//! ```

pub mod error;
pub mod recorder;
pub mod response;
pub mod stream;


pub use error::{OutputError, OutputResult};
pub use recorder::ReplayRecorder;
pub use response::{ErrorResponse, SimResponse};
pub use stream::ReplayStream;
