//! `EventQueue` — the time-ordered future event list.
//!
//! A binary min-heap keyed on `(time, seq)`.  `seq` is a monotonically
//! increasing insertion counter, so events scheduled for the same instant pop
//! in the order they were pushed.  That makes a run fully reproducible for a
//! given configuration and seed.
//!
//! There is no cancellation.  Anything scheduled will be popped; handlers
//! re-check state when an event fires and ignore it if it has gone stale.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ls_core::SimTime;

struct Scheduled<E> {
    time:  SimTime,
    seq:   u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A priority queue of future events, earliest first.
pub struct EventQueue<E> {
    heap:     BinaryHeap<Scheduled<E>>,
    next_seq: u64,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self { heap: BinaryHeap::new(), next_seq: 0 }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at `time`.  O(log n).
    pub fn push(&mut self, time: SimTime, event: E) {
        self.heap.push(Scheduled { time, seq: self.next_seq, event });
        self.next_seq += 1;
    }

    /// Remove and return the earliest event.  O(log n).
    pub fn pop(&mut self) -> Option<(SimTime, E)> {
        self.heap.pop().map(|s| (s.time, s.event))
    }

    /// Time of the earliest queued event, or `None` if empty.  O(1).
    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|s| s.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every pending event and restart the insertion counter.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}
