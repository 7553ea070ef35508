//! Engine-owned per-node state tables.

use std::collections::VecDeque;

use ls_core::{PartId, SimTime};

/// Queue-depth statistics shared by stations and buffers.
#[derive(Clone, Debug, Default)]
pub struct QueueStats {
    pub peak:    usize,
    sum:         f64,
    samples:     u64,
}

impl QueueStats {
    pub fn record(&mut self, depth: usize) {
        self.peak = self.peak.max(depth);
        self.sum += depth as f64;
        self.samples += 1;
    }

    pub fn mean(&self) -> f64 {
        if self.samples == 0 { 0.0 } else { self.sum / self.samples as f64 }
    }
}

/// A failure drawn while starting an operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Breakdown {
    pub time:         SimTime,
    pub part:         PartId,
    pub repair_hours: f64,
}

#[derive(Clone, Debug, Default)]
pub struct StationState {
    /// Parts waiting to start, head first.
    pub queue:         VecDeque<PartId>,
    /// Slots currently processing (or holding a part whose operator walks).
    pub busy:          u32,
    /// Parts in transport towards this station.
    pub incoming:      u32,
    pub busy_hours:    f64,
    /// Idle slot-hours during working time with nothing queued.
    pub starved_hours: f64,
    pub operations:    u64,
    pub scrapped:      u64,
    pub breakdowns:    Vec<Breakdown>,
    pub queue_stats:   QueueStats,
}

impl StationState {
    pub fn record_queue(&mut self) {
        self.queue_stats.record(self.queue.len());
    }
}

#[derive(Clone, Debug, Default)]
pub struct BufferState {
    pub queue:       VecDeque<PartId>,
    pub received:    u64,
    pub queue_stats: QueueStats,
}

impl BufferState {
    pub fn record_queue(&mut self) {
        self.queue_stats.record(self.queue.len());
    }

    /// Remove `part` wherever it sits in the queue.
    pub fn remove(&mut self, part: PartId) -> bool {
        match self.queue.iter().position(|&p| p == part) {
            Some(i) => {
                self.queue.remove(i);
                true
            }
            None => false,
        }
    }
}
