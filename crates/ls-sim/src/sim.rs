//! The `Sim` struct and its event loop.

use std::collections::VecDeque;

use ls_config::{Line, OrderSpec, Settings};
use ls_core::{BufferId, FlowId, NodeRef, OrderId, PartId, SimRng, SimTime, StationId};
use ls_model::{OrderBook, PartStore, ResourcePool};
use ls_schedule::EventQueue;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{info, trace, warn};

use crate::event::Event;
use crate::state::{BufferState, StationState};
use crate::stats::{self, SimReport, WipSample};
use crate::{ReplayEvent, SimError, SimObserver, SimResult};

/// Follow-up checks one event may trigger before the run is declared stuck.
pub const MAX_RECHECKS: usize = 100_000;

/// A node whose state changed and should try to make progress again.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Recheck {
    /// Push the head part onwards.
    Buffer(BufferId),
    /// Start the next operation if a slot is free.
    Station(StationId),
    /// Pull a complete kit into the assembly station.
    Assembly(StationId),
}

/// A transport waiting for a tool unit.
#[derive(Copy, Clone, Debug)]
pub(crate) struct PendingMove {
    pub from: NodeRef,
    pub flow: FlowId,
}

/// The production-line simulation.
///
/// Created via [`SimBuilder`][crate::SimBuilder].  Call [`Sim::run`] to
/// play every scheduled order through the line.  A `Sim` can be run again;
/// each run starts from a clean state with the configured seed.
pub struct Sim {
    pub(crate) line:     Line,
    pub(crate) orders:   Vec<OrderSpec>,
    pub(crate) settings: Settings,

    pub(crate) now:      SimTime,
    pub(crate) events:   EventQueue<Event>,
    pub(crate) rng:      SimRng,
    pub(crate) parts:    PartStore,
    pub(crate) book:     OrderBook,
    pub(crate) pools:    Vec<ResourcePool>,
    pub(crate) stations: Vec<StationState>,
    pub(crate) buffers:  Vec<BufferState>,
    /// Round-robin position per buffer.
    pub(crate) rotation: Vec<usize>,
    pub(crate) pending_moves: FxHashMap<PartId, PendingMove>,
    pub(crate) outbox:   Vec<ReplayEvent>,
    pub(crate) wip:      Vec<WipSample>,
    pub(crate) processed: u64,

    rechecks: VecDeque<Recheck>,
    queued:   FxHashSet<Recheck>,
    next_wip: SimTime,
}

impl Sim {
    pub(crate) fn new(line: Line, orders: Vec<OrderSpec>, settings: Settings) -> Self {
        let rng = SimRng::new(settings.seed);
        let mut sim = Self {
            line,
            orders,
            settings,
            now: SimTime::ZERO,
            events: EventQueue::new(),
            rng,
            parts: PartStore::new(),
            book: OrderBook::new(),
            pools: Vec::new(),
            stations: Vec::new(),
            buffers: Vec::new(),
            rotation: Vec::new(),
            pending_moves: FxHashMap::default(),
            outbox: Vec::new(),
            wip: Vec::new(),
            processed: 0,
            rechecks: VecDeque::new(),
            queued: FxHashSet::default(),
            next_wip: SimTime::ZERO,
        };
        sim.clear_state();
        sim
    }

    // ── Run ───────────────────────────────────────────────────────────────

    /// Play the scenario to completion.
    ///
    /// Resets all run state, releases every order at its arrival instant and
    /// processes events in time order until none remain.
    ///
    /// # Errors
    ///
    /// - [`SimError::NoActiveShift`] when shifts are configured but none can
    ///   ever be worked.
    /// - [`SimError::EventCapExceeded`] past `settings.max_events`.
    /// - [`SimError::RecheckOverflow`] when one event cascades without end.
    /// - [`SimError::NothingToSimulate`] when no event was ever scheduled.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<SimReport> {
        if !self.line.calendar.has_active_shift() {
            return Err(SimError::NoActiveShift);
        }
        self.reset()?;
        info!(
            orders   = self.orders.len(),
            stations = self.line.stations.len(),
            seed     = self.settings.seed,
            "simulation started"
        );
        observer.on_sim_start(self.orders.len());

        let cap = self.settings.max_events;
        while let Some((time, event)) = self.events.pop() {
            self.processed += 1;
            if self.processed > cap {
                warn!(cap, %time, "event cap exceeded");
                return Err(SimError::EventCapExceeded { cap, time });
            }
            self.advance_to(time);
            self.sample_wip(observer);

            trace!(%time, kind = event.kind(), "dispatch");
            self.dispatch(event)?;
            self.settle()?;

            for record in self.outbox.drain(..) {
                observer.on_replay(&record);
            }
            observer.on_event(self.now, self.processed);
        }

        if self.processed == 0 {
            return Err(SimError::NothingToSimulate);
        }
        let report = stats::build(self);
        info!(
            end      = %self.now,
            events   = self.processed,
            produced = report.produced,
            scrapped = report.scrapped,
            "simulation finished"
        );
        observer.on_sim_end(&report);
        Ok(report)
    }

    /// Clear all run state and schedule the order releases.
    ///
    /// Arrivals before the start are clamped to it, and every release is
    /// moved to the next working instant.
    pub fn reset(&mut self) -> SimResult<()> {
        self.clear_state();
        for (i, order) in self.orders.iter().enumerate() {
            let arrival = self.line.calendar.next_working_time(SimTime(order.arrival.max(0.0)))?;
            self.book.insert(
                order.name.clone(),
                order.bom.clone(),
                order.size.clone(),
                arrival,
                order.due.map(SimTime),
            );
            self.events.push(arrival, Event::OrderArrival { order: i });
        }
        Ok(())
    }

    fn clear_state(&mut self) {
        self.now = SimTime::ZERO;
        self.events.clear();
        self.rng = SimRng::new(self.settings.seed);
        self.parts.clear();
        self.book.clear();
        self.pools = self
            .line
            .pools
            .iter()
            .map(|p| ResourcePool::new(p.id, p.name.clone(), p.kind, p.capacity, p.speed, p.cost_per_hour))
            .collect();
        self.stations = vec![StationState::default(); self.line.stations.len()];
        self.buffers = vec![BufferState::default(); self.line.buffers.len()];
        self.rotation = vec![0; self.line.buffers.len()];
        self.pending_moves.clear();
        self.outbox.clear();
        self.wip.clear();
        self.processed = 0;
        self.rechecks.clear();
        self.queued.clear();
        self.next_wip = SimTime::ZERO;
    }

    // ── Clock ─────────────────────────────────────────────────────────────

    /// Move the clock to `time`, charging starvation for the interval.
    ///
    /// A station starves while its queue is empty, per idle slot, and only
    /// when the interval starts in working time.
    fn advance_to(&mut self, time: SimTime) {
        let delta = time.since(self.now);
        if delta > 0.0 && self.line.calendar.is_working_time(self.now) {
            for (state, spec) in self.stations.iter_mut().zip(&self.line.stations) {
                if state.queue.is_empty() && state.busy < spec.capacity {
                    state.starved_hours += delta * f64::from(spec.capacity - state.busy);
                }
            }
        }
        self.now = self.now.max(time);
    }

    fn sample_wip<O: SimObserver>(&mut self, observer: &mut O) {
        if self.now < self.next_wip {
            return;
        }
        let sample = WipSample { time: self.now, count: self.parts.active_count() };
        self.wip.push(sample);
        observer.on_wip_sample(sample);

        let interval = self.settings.wip_sample_hours;
        let skipped = (self.now.since(self.next_wip) / interval).floor();
        self.next_wip = self.next_wip + (skipped + 1.0) * interval;
    }

    // ── Follow-up checks ──────────────────────────────────────────────────

    /// Queue a node for another look after the current event.  A node
    /// already queued is not queued twice.
    pub(crate) fn recheck(&mut self, node: Recheck) {
        if self.queued.insert(node) {
            self.rechecks.push_back(node);
        }
    }

    fn settle(&mut self) -> SimResult<()> {
        let mut steps = 0usize;
        while let Some(node) = self.rechecks.pop_front() {
            self.queued.remove(&node);
            steps += 1;
            if steps > MAX_RECHECKS {
                warn!(time = %self.now, limit = MAX_RECHECKS, "follow-up checks do not settle");
                self.rechecks.clear();
                self.queued.clear();
                return Err(SimError::RecheckOverflow { limit: MAX_RECHECKS, time: self.now });
            }
            match node {
                Recheck::Buffer(b) => self.push_from_buffer(b)?,
                Recheck::Station(s) => self.try_start(s)?,
                Recheck::Assembly(s) => self.try_assemble(s)?,
            }
        }
        Ok(())
    }

    // ── Naming helpers ────────────────────────────────────────────────────

    pub(crate) fn node_key(&self, node: NodeRef) -> String {
        match node {
            NodeRef::Station(s) => self.line.station(s).key.clone(),
            NodeRef::Buffer(b) => self.line.buffer(b).key.clone(),
        }
    }

    pub(crate) fn order_name(&self, order: OrderId) -> String {
        self.book.get(order).map(|o| o.name.clone()).unwrap_or_default()
    }

    // ── Read access ───────────────────────────────────────────────────────

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn parts(&self) -> &PartStore {
        &self.parts
    }

    pub fn orders(&self) -> &OrderBook {
        &self.book
    }

    pub fn pools(&self) -> &[ResourcePool] {
        &self.pools
    }

    pub fn station_state(&self, id: StationId) -> &StationState {
        &self.stations[id.index()]
    }

    pub fn buffer_state(&self, id: BufferId) -> &BufferState {
        &self.buffers[id.index()]
    }

    pub fn wip_samples(&self) -> &[WipSample] {
        &self.wip
    }

    /// Events dispatched in the current or last run.
    pub fn events_processed(&self) -> u64 {
        self.processed
    }
}
