//! Event handlers and the progress probes they trigger.
//!
//! Handlers change state for the event at hand and queue [`Recheck`]s for
//! every node that might now make progress.  The probes (`push_from_buffer`,
//! `try_start`, `try_assemble`) run from the work-list after the handler
//! returns, never recursively.

use ls_config::{StationKind, TimeRule};
use ls_core::time::SECS_PER_HOUR;
use ls_core::{BufferId, FlowId, NodeRef, OrderId, PartId, PoolId, SimTime, StationId};
use ls_model::{
    AttachedChild, DEFAULT_OPERATION_HOURS, NewPart, Operation, Part, PartKind, PartState,
    RequestOutcome, ResourceError, Routing, parse_order_string, routing_key,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::assembly;
use crate::event::Event;
use crate::replay::{BUFFER_CONTENT_LIMIT, BufferItem, ReplayEvent, StationStatus, StationWork, UsageKind};
use crate::router::{self, Candidate, RouteDecision};
use crate::sim::{PendingMove, Recheck};
use crate::state::Breakdown;
use crate::{Sim, SimResult};

/// Hours between the releases of consecutive BOM sections of one order.
pub const SECTION_STAGGER_HOURS: f64 = 0.05;

/// Metres per second for transports that do not use a tool.
pub const UNAIDED_TRANSPORT_SPEED: f64 = 1.0;

fn travel_hours(distance: f64, speed: f64) -> f64 {
    if speed > 0.0 { distance.max(0.0) / speed / SECS_PER_HOUR } else { 0.0 }
}

fn rule_time(rules: &FxHashMap<String, TimeRule>, part: &Part) -> Option<f64> {
    rules
        .get(&part.size)
        .map(|r| r.time_for(part.attached.iter().map(|c| c.code.as_str())))
        .filter(|t| *t > 0.0)
}

impl Sim {
    pub(crate) fn dispatch(&mut self, event: Event) -> SimResult<()> {
        match event {
            Event::OrderArrival { order } => self.on_order_arrival(order),
            Event::PartArrives { part, node, tool, departed } => {
                self.on_part_arrives(part, node, tool, departed)
            }
            Event::WorkerArrives { part, station, pool, operators, claimed } => {
                self.begin_processing(part, station, pool, operators, claimed)
            }
            Event::OperationComplete { part, station, pool, operators, claimed, work_hours } => {
                self.on_operation_complete(part, station, pool, operators, claimed, work_hours)
            }
        }
    }

    // ── Orders ────────────────────────────────────────────────────────────

    fn on_order_arrival(&mut self, index: usize) -> SimResult<()> {
        let order = OrderId(index as u32);
        let Some(record) = self.book.get(order) else {
            return Ok(());
        };
        let (bom, size, due) = (record.bom.clone(), record.size.clone(), record.due);
        let parents = match parse_order_string(&bom) {
            Ok(parents) => parents,
            Err(err) => {
                warn!(order = %record.name, %err, "order skipped: unreadable BOM");
                return Ok(());
            }
        };
        debug!(order = %record.name, sections = parents.len(), "order released");

        let mut release = self.now;
        for parent in parents {
            self.release_part(order, PartKind::Parent, &parent.code, parent.children.clone(), &size, due, release);
            for child in &parent.children {
                self.release_part(order, PartKind::Child, child, Vec::new(), &size, due, release);
            }
            release = release + SECTION_STAGGER_HOURS;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn release_part(
        &mut self,
        order: OrderId,
        kind: PartKind,
        code: &str,
        bom: Vec<String>,
        size: &str,
        due: Option<SimTime>,
        created: SimTime,
    ) {
        let key = routing_key(kind, size, code, 0);
        let routing: Routing = match self.line.routing(&key) {
            Some(r) => r.clone(),
            None => {
                debug!(%key, "no routing; part has no operations of its own");
                Vec::new().into()
            }
        };
        let product = format!("{}_{size}_{code}", kind.type_prefix());
        let Some(start) = self.line.start_buffer_for(&product) else {
            warn!(%product, "no start buffer; part not created");
            return;
        };
        let part = self.parts.create(NewPart {
            order,
            kind,
            code: code.to_owned(),
            size: size.to_owned(),
            routing,
            bom,
            created,
            due,
        });
        self.events.push(
            created,
            Event::PartArrives { part, node: NodeRef::Buffer(start), tool: None, departed: created },
        );
    }

    // ── Arrivals ──────────────────────────────────────────────────────────

    fn on_part_arrives(
        &mut self,
        part: PartId,
        node: NodeRef,
        tool: Option<PoolId>,
        departed: SimTime,
    ) -> SimResult<()> {
        if let Some(pool) = tool {
            self.release_tool(part, pool, departed)?;
        }
        match node {
            NodeRef::Buffer(b) => self.land_in_buffer(part, b),
            NodeRef::Station(s) => self.land_at_station(part, s),
        }
        Ok(())
    }

    fn land_in_buffer(&mut self, part: PartId, b: BufferId) {
        let now = self.now;
        let spec = self.line.buffer(b);
        let state = &mut self.buffers[b.index()];
        state.queue.push_back(part);
        state.received += 1;
        state.record_queue();

        let p = &mut self.parts[part];
        p.location = Some(NodeRef::Buffer(b));
        if spec.is_end {
            p.transition(PartState::Finished, now);
            debug!(part = %part, code = %p.code, buffer = %spec.key, "part finished");
            self.emit_buffer(b);
            return;
        }
        p.transition(PartState::IdleInBuffer, now);
        self.emit_buffer(b);

        if let Some(station) = self.line.assembly_fed_by(b) {
            self.recheck(Recheck::Assembly(station));
        }
        self.recheck(Recheck::Buffer(b));
    }

    fn land_at_station(&mut self, part: PartId, s: StationId) {
        let state = &mut self.stations[s.index()];
        state.incoming = state.incoming.saturating_sub(1);
        state.queue.push_back(part);
        state.record_queue();

        let p = &mut self.parts[part];
        p.location = Some(NodeRef::Station(s));
        p.transition(PartState::IdleAtStation, self.now);
        self.recheck(Recheck::Station(s));
    }

    // ── Buffer push ───────────────────────────────────────────────────────

    pub(crate) fn push_from_buffer(&mut self, b: BufferId) -> SimResult<()> {
        if self.line.buffer(b).is_end {
            return Ok(());
        }
        let Some(&head) = self.buffers[b.index()].queue.front() else {
            return Ok(());
        };
        let Some(op) = self.parts[head].current_op() else {
            return self.forward_done(head, b);
        };

        let candidates: Vec<Candidate> = self
            .line
            .outgoing(NodeRef::Buffer(b))
            .iter()
            .filter_map(|&f| {
                let s = self.line.flow(f).to.station()?;
                let spec = self.line.station(s);
                if spec.is_assembly() || !spec.allows(op) {
                    return None;
                }
                let state = &self.stations[s.index()];
                Some(Candidate {
                    flow:     f,
                    station:  s,
                    capacity: spec.capacity,
                    busy:     state.busy,
                    queued:   state.queue.len(),
                    incoming: state.incoming,
                })
            })
            .collect();

        let factor = self.settings.backpressure_factor;
        match router::choose(&candidates, &mut self.rotation[b.index()], factor) {
            RouteDecision::Push(i) => {
                self.take_head(b);
                self.start_transport(head, NodeRef::Buffer(b), candidates[i].flow)?;
                self.recheck(Recheck::Buffer(b));
            }
            RouteDecision::Hold(i) => {
                trace!(buffer = %b, station = %candidates[i].station, "held by backpressure");
            }
            RouteDecision::Nowhere => {
                trace!(buffer = %b, part = %head, "no station can take the next operation");
            }
        }
        Ok(())
    }

    /// A head part with no operations left moves on to a downstream buffer,
    /// unless this buffer feeds an assembly station that will pull it.
    fn forward_done(&mut self, head: PartId, b: BufferId) -> SimResult<()> {
        if self.line.assembly_fed_by(b).is_some() {
            return Ok(());
        }
        let line = &self.line;
        let target = line
            .outgoing(NodeRef::Buffer(b))
            .iter()
            .copied()
            .filter_map(|f| line.flow(f).to.buffer().map(|to| (f, line.buffer(to).is_end)))
            .min_by_key(|&(_, is_end)| !is_end)
            .map(|(f, _)| f);
        let Some(flow) = target else {
            return Ok(());
        };
        self.take_head(b);
        self.start_transport(head, NodeRef::Buffer(b), flow)?;
        self.recheck(Recheck::Buffer(b));
        Ok(())
    }

    fn take_head(&mut self, b: BufferId) {
        let state = &mut self.buffers[b.index()];
        state.queue.pop_front();
        state.record_queue();
        self.emit_buffer(b);
    }

    // ── Transport ─────────────────────────────────────────────────────────

    /// Send `part` along `flow`.  The destination station counts it as
    /// incoming from now on, even while the move waits for a tool.
    pub(crate) fn start_transport(&mut self, part: PartId, from: NodeRef, flow: FlowId) -> SimResult<()> {
        let (to, tool) = {
            let f = self.line.flow(flow);
            (f.to, f.tool)
        };
        if let NodeRef::Station(s) = to {
            self.stations[s.index()].incoming += 1;
        }
        let Some(pool) = tool else {
            return self.dispatch_move(part, from, flow, None);
        };
        match self.pools[pool.index()].request(part, 1)? {
            RequestOutcome::Granted => self.dispatch_move(part, from, flow, Some(pool)),
            RequestOutcome::Pending => {
                self.parts[part].transition(PartState::WaitingForTool, self.now);
                self.pending_moves.insert(part, PendingMove { from, flow });
                trace!(part = %part, pool = %pool, "waiting for a tool");
                Ok(())
            }
        }
    }

    fn dispatch_move(&mut self, part: PartId, from: NodeRef, flow: FlowId, tool: Option<PoolId>) -> SimResult<()> {
        let now = self.now;
        let (to, distance) = {
            let f = self.line.flow(flow);
            (f.to, f.distance)
        };
        let speed = tool.map_or(UNAIDED_TRANSPORT_SPEED, |t| self.pools[t.index()].speed);
        let end = self.line.calendar.completion_time(now, travel_hours(distance, speed))?;

        let p = &mut self.parts[part];
        p.transition(PartState::InTransport, now);
        let (code, order, assembled) = (p.code.clone(), p.order, !p.attached.is_empty());

        let record = ReplayEvent::Transport {
            start: now,
            end,
            from: self.node_key(from),
            to: self.node_key(to),
            part: part.0,
            order: self.order_name(order),
            code,
            assembled,
        };
        self.outbox.push(record);
        self.events.push(end, Event::PartArrives { part, node: to, tool, departed: now });
        Ok(())
    }

    fn release_tool(&mut self, part: PartId, pool: PoolId, departed: SimTime) -> SimResult<()> {
        let now = self.now;
        let mut served = self.pools[pool.index()].release(part, 1, now.since(departed))?;
        self.outbox.push(ReplayEvent::ResourceUsage {
            pool:  self.line.pool(pool).key.clone(),
            usage: UsageKind::Transport,
            part:  part.0,
            start: departed,
            end:   now,
        });
        while let Some(waiter) = served.take() {
            match self.pending_moves.remove(&waiter) {
                Some(mv) => self.dispatch_move(waiter, mv.from, mv.flow, Some(pool))?,
                None => {
                    warn!(part = %waiter, pool = %pool, "tool granted to a part with no pending move");
                    served = self.pools[pool.index()].release(waiter, 1, 0.0)?;
                }
            }
        }
        Ok(())
    }

    // ── Station start ─────────────────────────────────────────────────────

    pub(crate) fn try_start(&mut self, s: StationId) -> SimResult<()> {
        let now = self.now;
        let capacity = self.line.station(s).capacity;
        let worker = self.line.worker_flow(s).map(|wf| (wf.pool, wf.distance));

        let state = &mut self.stations[s.index()];
        if state.busy >= capacity || state.queue.is_empty() {
            return Ok(());
        }
        // A part that already holds its operators goes first.
        if let Some((pool, _)) = worker {
            let pool = &self.pools[pool.index()];
            if let Some(i) = state.queue.iter().position(|&p| pool.holds(p)) {
                if let Some(holder) = state.queue.remove(i) {
                    state.queue.push_front(holder);
                }
            }
        }
        let Some(&head) = state.queue.front() else {
            return Ok(());
        };
        let operators = self.parts[head].current_op().map_or(1, |op| op.operators);

        let staffed = match worker {
            Some((pool, distance)) if operators > 0 => {
                let rp = &mut self.pools[pool.index()];
                if !rp.holds(head) {
                    match rp.request(head, operators) {
                        Ok(RequestOutcome::Granted) => {}
                        Ok(RequestOutcome::Pending) => {
                            let p = &mut self.parts[head];
                            if p.state() != PartState::WaitingForWorker {
                                p.transition(PartState::WaitingForWorker, now);
                            }
                            return Ok(());
                        }
                        Err(err @ ResourceError::ExceedsCapacity { .. }) => {
                            warn!(station = %self.line.station(s).key, part = %head, %err, "operation can never be staffed; part blocked");
                            let state = &mut self.stations[s.index()];
                            state.queue.pop_front();
                            state.record_queue();
                            self.parts[head].transition(PartState::Blocked, now);
                            self.recheck(Recheck::Station(s));
                            return Ok(());
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                Some((pool, distance))
            }
            _ => None,
        };

        let state = &mut self.stations[s.index()];
        state.queue.pop_front();
        state.busy += 1;
        state.record_queue();
        self.notify_upstream(s);
        self.recheck(Recheck::Station(s));

        let Some((pool, distance)) = staffed else {
            return self.begin_processing(head, s, None, 0, now);
        };
        let speed = self.pools[pool.index()].speed;
        let arrive = self.line.calendar.completion_time(now, travel_hours(distance, speed))?;
        self.parts[head].transition(PartState::WaitingForWorkerTravel, now);
        self.outbox.push(ReplayEvent::WorkerTravel {
            start:   now,
            end:     arrive,
            pool:    self.line.pool(pool).key.clone(),
            station: self.line.station(s).key.clone(),
        });
        self.events.push(
            arrive,
            Event::WorkerArrives { part: head, station: s, pool: Some(pool), operators, claimed: now },
        );
        Ok(())
    }

    /// A slot freed at `s`: whatever feeds it may move again.
    fn notify_upstream(&mut self, s: StationId) {
        if self.line.station(s).is_assembly() {
            self.recheck(Recheck::Assembly(s));
            return;
        }
        let feeders: Vec<BufferId> = self
            .line
            .incoming(NodeRef::Station(s))
            .iter()
            .filter_map(|&f| self.line.flow(f).from.buffer())
            .collect();
        for b in feeders {
            self.recheck(Recheck::Buffer(b));
        }
    }

    // ── Processing ────────────────────────────────────────────────────────

    fn begin_processing(
        &mut self,
        part: PartId,
        s: StationId,
        pool: Option<PoolId>,
        operators: u32,
        claimed: SimTime,
    ) -> SimResult<()> {
        let now = self.now;
        let spec = self.line.station(s);
        let p = &self.parts[part];

        let base = match spec.kind {
            StationKind::Quality => rule_time(&self.settings.quality_rules, p),
            StationKind::Packing => rule_time(&self.settings.packing_rules, p),
            _ => None,
        }
        .unwrap_or_else(|| p.current_op().map_or(DEFAULT_OPERATION_HOURS, Operation::base_time));

        let mut work = base;
        if spec.variance_pct > 0.0 {
            let v = spec.variance_pct / 100.0;
            work = (work * (1.0 + self.rng.uniform(-v, v))).max(0.0);
        }
        if self.rng.chance_pct(spec.failure_pct) {
            let (lo, hi) = self.settings.repair_hours;
            let repair = self.rng.uniform(lo, hi);
            work += repair;
            debug!(station = %spec.key, part = %part, repair_hours = repair, "breakdown");
            self.stations[s.index()].breakdowns.push(Breakdown { time: now, part, repair_hours: repair });
            self.outbox.push(ReplayEvent::StationState {
                time:    now,
                station: spec.key.clone(),
                status:  StationStatus::Breakdown,
                work:    None,
            });
        }

        let end = self.line.calendar.completion_time(now, work)?;
        let p = &mut self.parts[part];
        p.transition(PartState::Processing, now);
        let (code, order_id) = (p.code.clone(), p.order);
        let operation = p.current_op().map(|op| op.name.clone());
        let work_meta = StationWork { part: part.0, code, order: self.order_name(order_id), operation, end };
        self.outbox.push(ReplayEvent::StationState {
            time:    now,
            station: self.line.station(s).key.clone(),
            status:  StationStatus::Run,
            work:    Some(work_meta),
        });
        self.events.push(
            end,
            Event::OperationComplete { part, station: s, pool, operators, claimed, work_hours: work },
        );
        Ok(())
    }

    fn on_operation_complete(
        &mut self,
        part: PartId,
        s: StationId,
        pool: Option<PoolId>,
        operators: u32,
        claimed: SimTime,
        work_hours: f64,
    ) -> SimResult<()> {
        let now = self.now;
        let state = &mut self.stations[s.index()];
        state.busy = state.busy.saturating_sub(1);
        state.busy_hours += work_hours;
        state.operations += 1;

        if let Some(pool) = pool {
            let served = self.pools[pool.index()].release(part, operators, now.since(claimed))?;
            self.outbox.push(ReplayEvent::ResourceUsage {
                pool:  self.line.pool(pool).key.clone(),
                usage: UsageKind::Work,
                part:  part.0,
                start: claimed,
                end:   now,
            });
            // The served head first, then everyone still waiting: a smaller
            // request further back may fit the units left over.
            let waiters: Vec<PartId> = served.into_iter().chain(self.pools[pool.index()].waiting()).collect();
            for waiter in waiters {
                let at = self.parts[waiter].location.and_then(NodeRef::station);
                if let Some(at) = at {
                    self.recheck(Recheck::Station(at));
                }
            }
        }

        if self.rng.chance_pct(self.line.station(s).scrap_pct) {
            self.stations[s.index()].scrapped += 1;
            self.parts[part].transition(PartState::Scrapped, now);
            debug!(station = %self.line.station(s).key, part = %part, "part scrapped");
            self.emit_station_idle(s);
            self.recheck(Recheck::Station(s));
            self.notify_upstream(s);
            return Ok(());
        }

        let p = &mut self.parts[part];
        p.advance();
        let stays = p.current_op().is_some_and(|op| self.line.station(s).allows(op));
        if stays {
            p.transition(PartState::IdleAtStation, now);
            let state = &mut self.stations[s.index()];
            state.queue.push_front(part);
            state.record_queue();
            self.recheck(Recheck::Station(s));
            return Ok(());
        }

        self.emit_station_idle(s);
        self.recheck(Recheck::Station(s));
        self.notify_upstream(s);

        match self.exit_flow(s, part) {
            Some(flow) => self.start_transport(part, NodeRef::Station(s), flow),
            None if self.parts[part].has_remaining_ops() => {
                warn!(station = %self.line.station(s).key, part = %part, "no outgoing flow; part blocked");
                self.parts[part].transition(PartState::Blocked, now);
                Ok(())
            }
            None => {
                self.parts[part].transition(PartState::Finished, now);
                debug!(station = %self.line.station(s).key, part = %part, "part finished at last station");
                Ok(())
            }
        }
    }

    /// First outgoing flow to a buffer or to a station allowing the part's
    /// next operation, else the first outgoing flow.
    fn exit_flow(&self, s: StationId, part: PartId) -> Option<FlowId> {
        let out = self.line.outgoing(NodeRef::Station(s));
        let next = self.parts[part].current_op();
        out.iter()
            .copied()
            .find(|&f| match self.line.flow(f).to {
                NodeRef::Buffer(_) => true,
                NodeRef::Station(t) => next.is_some_and(|op| self.line.station(t).allows(op)),
            })
            .or_else(|| out.first().copied())
    }

    // ── Assembly ──────────────────────────────────────────────────────────

    /// Pull at most one complete kit into assembly station `s`, if it has
    /// room counting busy slots, queue and parts on the way.
    pub(crate) fn try_assemble(&mut self, s: StationId) -> SimResult<()> {
        let capacity = self.line.station(s).capacity as usize;
        let state = &self.stations[s.index()];
        if state.busy as usize + state.queue.len() + state.incoming as usize >= capacity {
            return Ok(());
        }
        let inputs: Vec<BufferId> = self
            .line
            .incoming(NodeRef::Station(s))
            .iter()
            .filter_map(|&f| self.line.flow(f).from.buffer())
            .collect();
        let Some(kit) = assembly::find_kit(&inputs, &self.buffers, &self.parts) else {
            return Ok(());
        };
        let (parent, from) = kit.parent;
        let Some(flow) = self.line.flow_between(NodeRef::Buffer(from), NodeRef::Station(s)).map(|f| f.id) else {
            return Ok(());
        };

        let now = self.now;
        let mut touched = vec![from];
        for &(child, at) in &kit.children {
            self.buffers[at.index()].remove(child);
            self.buffers[at.index()].record_queue();
            if !touched.contains(&at) {
                touched.push(at);
            }
            let c = &mut self.parts[child];
            c.transition(PartState::Assembled, now);
            let code = c.code.clone();
            self.parts[parent].attached.push(AttachedChild { id: child, code });
        }
        self.buffers[from.index()].remove(parent);
        self.buffers[from.index()].record_queue();
        for b in touched {
            self.emit_buffer(b);
        }

        let routing = assembly::assembled_routing(&self.parts[parent], &self.settings.assembly_sequence, &self.line);
        debug!(
            station  = %self.line.station(s).key,
            parent   = %parent,
            children = kit.children.len(),
            ops      = routing.len(),
            "kit assembled"
        );
        self.parts[parent].reroute(routing);
        self.start_transport(parent, NodeRef::Buffer(from), flow)?;
        self.recheck(Recheck::Assembly(s));
        Ok(())
    }

    // ── Replay records ────────────────────────────────────────────────────

    fn emit_buffer(&mut self, b: BufferId) {
        let queue = &self.buffers[b.index()].queue;
        let content = queue
            .iter()
            .take(BUFFER_CONTENT_LIMIT)
            .map(|&id| {
                let p = &self.parts[id];
                BufferItem { code: p.code.clone(), order: self.order_name(p.order) }
            })
            .collect();
        self.outbox.push(ReplayEvent::BufferState {
            time: self.now,
            buffer: self.line.buffer(b).key.clone(),
            count: queue.len(),
            content,
        });
    }

    fn emit_station_idle(&mut self, s: StationId) {
        if self.stations[s.index()].busy > 0 {
            return;
        }
        self.outbox.push(ReplayEvent::StationState {
            time:    self.now,
            station: self.line.station(s).key.clone(),
            status:  StationStatus::Idle,
            work:    None,
        });
    }
}
