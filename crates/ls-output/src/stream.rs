//! `ReplayStream<W>` — replay records as JSON lines.

use std::io::Write;

use ls_sim::{ReplayEvent, SimObserver, SimReport};
use tracing::debug;

use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes each replay record as one JSON object per
/// line to `W`.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].  Once a write has failed, later records
/// are dropped.
pub struct ReplayStream<W: Write> {
    writer:     W,
    written:    u64,
    last_error: Option<OutputError>,
}

impl<W: Write> ReplayStream<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0, last_error: None }
    }

    /// Records written successfully.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, event: &ReplayEvent) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: Write> SimObserver for ReplayStream<W> {
    fn on_replay(&mut self, event: &ReplayEvent) {
        if self.last_error.is_some() {
            return;
        }
        let result = self.write_line(event);
        if result.is_ok() {
            self.written += 1;
        }
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _report: &SimReport) {
        let result = self.writer.flush().map_err(OutputError::from);
        self.store_err(result);
        debug!(records = self.written, "replay stream flushed");
    }
}
