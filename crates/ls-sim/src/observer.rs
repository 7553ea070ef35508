//! Simulation observer trait for progress reporting and data collection.

use ls_core::SimTime;

use crate::{ReplayEvent, SimReport, WipSample};

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// event loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { every: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_event(&mut self, time: SimTime, processed: u64) {
///         if processed % self.every == 0 {
///             println!("{time}: {processed} events");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once after the initial order releases are scheduled.
    fn on_sim_start(&mut self, _orders: usize) {}

    /// Called after every dispatched event and the follow-up checks it
    /// triggered.  `processed` counts events so far, this one included.
    fn on_event(&mut self, _time: SimTime, _processed: u64) {}

    /// Called for every replay record, in emission order.
    fn on_replay(&mut self, _event: &ReplayEvent) {}

    /// Called at every WIP sampling instant.
    fn on_wip_sample(&mut self, _sample: WipSample) {}

    /// Called once when the event list is exhausted, with the final report.
    fn on_sim_end(&mut self, _report: &SimReport) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
