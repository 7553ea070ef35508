//! Independent replications of one scenario under different seeds.
//!
//! Each replication owns its `Sim`, so with the `parallel` feature they run
//! on Rayon's thread pool with no shared state.  Results come back in seed
//! order either way.

use ls_config::Scenario;

use crate::{NoopObserver, SimBuilder, SimReport, SimResult};

/// Run `scenario` once per seed.
pub fn run_replications(scenario: &Scenario, seeds: &[u64]) -> Vec<SimResult<SimReport>> {
    let one = |&seed: &u64| -> SimResult<SimReport> {
        let mut sim = SimBuilder::from_scenario(scenario.clone()).seed(seed).build()?;
        sim.run(&mut NoopObserver)
    };

    #[cfg(feature = "parallel")]
    let reports: Vec<_> = {
        use rayon::prelude::*;
        seeds.par_iter().map(one).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let reports: Vec<_> = seeds.iter().map(one).collect();

    reports
}

/// Mean and sample standard deviation of `f` over the successful reports.
pub fn summarize(reports: &[SimResult<SimReport>], f: impl Fn(&SimReport) -> f64) -> Option<(f64, f64)> {
    let values: Vec<f64> = reports.iter().filter_map(|r| r.as_ref().ok()).map(f).collect();
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = if values.len() > 1 {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };
    Some((mean, var.sqrt()))
}
