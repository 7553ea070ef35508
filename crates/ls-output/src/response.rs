//! The message a worker sends back after a run.

use std::io::Write;

use ls_sim::{ReplayEvent, SimReport};
use serde::Serialize;

use crate::OutputResult;

/// Final report plus the full replay trace.
#[derive(Clone, Debug, Serialize)]
pub struct SimResponse {
    pub report: SimReport,
    pub replay: Vec<ReplayEvent>,
}

impl SimResponse {
    /// Write as a single JSON document followed by a newline.
    pub fn write_json<W: Write>(&self, mut writer: W) -> OutputResult<()> {
        serde_json::to_writer(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Sent instead of a [`SimResponse`] when the request could not be run.
#[derive(Clone, Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self { error: error.to_string() }
    }

    pub fn write_json<W: Write>(&self, mut writer: W) -> OutputResult<()> {
        serde_json::to_writer(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
