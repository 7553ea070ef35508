//! Destination choice for a part leaving a buffer.
//!
//! Each capable station is scored by how loaded it is.  A station with every
//! slot busy scores [`FULL_PENALTY`] on top of its queue and in-transit
//! count, so any station with a free slot wins over a full one.  Exact ties
//! rotate through a caller-held counter.  The winner is still refused when
//! `queue + incoming + 1` would exceed `capacity × backpressure`; the part
//! then stays where it is.

use ls_core::{FlowId, StationId};

pub const FULL_PENALTY: u64 = 1_000_000;

/// One station a buffer could push its head part to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    pub flow:     FlowId,
    pub station:  StationId,
    pub capacity: u32,
    pub busy:     u32,
    pub queued:   usize,
    pub incoming: u32,
}

impl Candidate {
    pub fn score(&self) -> u64 {
        let full = if self.busy >= self.capacity { FULL_PENALTY } else { 0 };
        full + self.load()
    }

    fn load(&self) -> u64 {
        self.queued as u64 + u64::from(self.incoming)
    }

    /// Whether one more part may be sent under the backpressure limit.
    pub fn admits(&self, backpressure: f64) -> bool {
        (self.load() + 1) as f64 <= f64::from(self.capacity) * backpressure
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    /// Push to `candidates[i]`.
    Push(usize),
    /// The best candidate is saturated; hold the part.
    Hold(usize),
    /// No candidate at all.
    Nowhere,
}

/// Pick among `candidates`.  `rotation` advances only on a push.
pub fn choose(candidates: &[Candidate], rotation: &mut usize, backpressure: f64) -> RouteDecision {
    let Some(best) = candidates.iter().map(Candidate::score).min() else {
        return RouteDecision::Nowhere;
    };
    let ties: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.score() == best)
        .map(|(i, _)| i)
        .collect();
    let pick = ties[*rotation % ties.len()];
    if candidates[pick].admits(backpressure) {
        *rotation = rotation.wrapping_add(1);
        RouteDecision::Push(pick)
    } else {
        RouteDecision::Hold(pick)
    }
}
