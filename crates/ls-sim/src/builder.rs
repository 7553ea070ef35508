//! Fluent builder for constructing a [`Sim`].

use ls_config::{Line, OrderSpec, Scenario, Settings};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`Line`] — stations, buffers, flows, pools, routings and the calendar,
///   usually from [`ls_config::validate`]
///
/// # Optional inputs (have defaults)
///
/// | Method                     | Default                         |
/// |----------------------------|---------------------------------|
/// | `.orders(v)`               | No orders                       |
/// | `.settings(s)`             | `Settings::default()`           |
/// | `.seed(n)`                 | `settings.seed` (42)            |
/// | `.max_events(n)`           | `settings.max_events` (800 000) |
/// | `.backpressure_factor(f)`  | `settings.backpressure_factor`  |
///
/// # Example
///
/// ```rust,ignore
/// let scenario = Scenario::from_json(&text)?;
/// let mut sim = SimBuilder::from_scenario(scenario).seed(7).build()?;
/// let report = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    line:     Line,
    orders:   Vec<OrderSpec>,
    settings: Settings,
}

impl SimBuilder {
    pub fn new(line: Line) -> Self {
        Self { line, orders: Vec::new(), settings: Settings::default() }
    }

    /// Take line, orders and settings from a validated request.
    pub fn from_scenario(scenario: Scenario) -> Self {
        Self { line: scenario.line, orders: scenario.orders, settings: scenario.settings }
    }

    pub fn orders(mut self, orders: Vec<OrderSpec>) -> Self {
        self.orders = orders;
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = seed;
        self
    }

    pub fn max_events(mut self, cap: u64) -> Self {
        self.settings.max_events = cap;
        self
    }

    /// Multiple of station capacity a buffer may send ahead (queued plus in
    /// transit) before holding parts back.
    pub fn backpressure_factor(mut self, factor: f64) -> Self {
        self.settings.backpressure_factor = factor;
        self
    }

    /// Check the settings and cross-references and return a ready-to-run
    /// [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        let s = &self.settings;
        if !(s.backpressure_factor.is_finite() && s.backpressure_factor > 0.0) {
            return Err(SimError::Config(format!(
                "backpressure factor must be positive, got {}",
                s.backpressure_factor
            )));
        }
        if !(s.wip_sample_hours.is_finite() && s.wip_sample_hours > 0.0) {
            return Err(SimError::Config(format!(
                "WIP sampling interval must be positive, got {}",
                s.wip_sample_hours
            )));
        }
        let (lo, hi) = s.repair_hours;
        if lo.is_nan() || hi.is_nan() || lo < 0.0 || hi < lo {
            return Err(SimError::Config(format!("invalid repair range {lo}..{hi}")));
        }
        if s.max_events == 0 {
            return Err(SimError::Config("event cap must be at least 1".into()));
        }
        if let Some(st) = self.line.stations.iter().find(|st| st.capacity == 0) {
            return Err(SimError::Config(format!("station {:?} has zero capacity", st.key)));
        }
        if let Some(p) = self.line.pools.iter().find(|p| p.capacity == 0) {
            return Err(SimError::Config(format!("pool {:?} has zero capacity", p.key)));
        }
        if let Some(o) = self.orders.iter().find(|o| !o.arrival.is_finite()) {
            return Err(SimError::Config(format!("order {:?} has no valid arrival", o.name)));
        }
        Ok(Sim::new(self.line, self.orders, self.settings))
    }
}
