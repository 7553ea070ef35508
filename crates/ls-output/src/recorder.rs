//! In-memory replay capture.

use ls_core::SimTime;
use ls_sim::{ReplayEvent, SimObserver, SimReport, WipSample};

use crate::SimResponse;

/// A [`SimObserver`] that keeps the whole replay trace in memory.
///
/// Suited to bounded runs whose trace is sent back in one message.  For long
/// runs prefer [`ReplayStream`][crate::ReplayStream].
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    replay:    Vec<ReplayEvent>,
    wip:       Vec<WipSample>,
    orders:    usize,
    processed: u64,
    last:      SimTime,
}

impl ReplayRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replay(&self) -> &[ReplayEvent] {
        &self.replay
    }

    /// WIP samples in the order they were taken.
    pub fn wip(&self) -> &[WipSample] {
        &self.wip
    }

    /// Orders released at the start of the run.
    pub fn orders(&self) -> usize {
        self.orders
    }

    /// Events dispatched so far and the time of the latest one.
    pub fn progress(&self) -> (u64, SimTime) {
        (self.processed, self.last)
    }

    /// Package the captured trace with the run's report.
    pub fn into_response(self, report: SimReport) -> SimResponse {
        SimResponse { report, replay: self.replay }
    }
}

impl SimObserver for ReplayRecorder {
    fn on_sim_start(&mut self, orders: usize) {
        self.orders = orders;
    }

    fn on_event(&mut self, time: SimTime, processed: u64) {
        self.processed = processed;
        self.last = time;
    }

    fn on_replay(&mut self, event: &ReplayEvent) {
        self.replay.push(event.clone());
    }

    fn on_wip_sample(&mut self, sample: WipSample) {
        self.wip.push(sample);
    }
}
