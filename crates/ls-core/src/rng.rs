//! Deterministic simulation RNG.
//!
//! The engine is single-threaded and owns exactly one `SimRng`, seeded from
//! the run settings.  Every stochastic draw (operation-time variance,
//! breakdowns, scrap) goes through it in event order, so the same seed and
//! configuration always reproduce the same run.  Independent replications
//! get independent seeds rather than sharing a generator.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform draw from the closed interval `[lo, hi]`.  Returns `lo` when
    /// the interval is empty or degenerate.
    #[inline]
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi > lo { self.0.gen_range(lo..=hi) } else { lo }
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// `true` with probability `pct` percent (clamped to [0, 100]).
    #[inline]
    pub fn chance_pct(&mut self, pct: f64) -> bool {
        pct > 0.0 && self.gen_bool(pct / 100.0)
    }
}
