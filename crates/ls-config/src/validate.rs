//! `SimRequest` → `Scenario`: interning, cross-reference checks, defaults.
//!
//! Structural defects fail the whole request with a [`ConfigError`].
//! Defects that only affect one order (missing fields, unparsable dates)
//! are logged and that order is dropped.

use std::sync::Arc;

use ls_core::{BufferId, FlowId, NodeRef, PoolId, StationId};
use ls_model::{Operation, PoolKind, Routing};
use ls_schedule::{Shift, ShiftCalendar};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::date::{hours_since, parse_date};
use crate::line::{
    Buffer, Flow, Line, OrderSpec, PoolSpec, Settings, Station, StationKind, TimeRule, WorkerFlow,
};
use crate::raw::{RawOperation, RawOrder, RawSettings, RawTimeRule, SimRequest};
use crate::{ConfigError, ConfigResult};

/// A validated request, ready to hand to the engine builder.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub line:     Line,
    pub orders:   Vec<OrderSpec>,
    pub settings: Settings,
}

impl Scenario {
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        validate(&SimRequest::from_json(text)?)
    }
}

pub fn validate(request: &SimRequest) -> ConfigResult<Scenario> {
    let raw = &request.config;

    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut nodes: FxHashMap<&str, NodeRef> = FxHashMap::default();

    let mut stations = Vec::with_capacity(raw.stations.len());
    for (i, s) in raw.stations.iter().enumerate() {
        let id = StationId(i as u32);
        if nodes.insert(&s.id, NodeRef::Station(id)).is_some() {
            return Err(ConfigError::DuplicateId { kind: "node", id: s.id.clone() });
        }
        if s.capacity == 0 {
            return Err(ConfigError::ZeroCapacity { kind: "station", id: s.id.clone() });
        }
        stations.push(Station {
            id,
            key: s.id.clone(),
            name: display_name(&s.name, &s.id),
            kind: StationKind::from_type(&s.kind),
            capacity: s.capacity,
            allowed_ops: s.allowed_ops.iter().map(operation).collect(),
            variance_pct: s.variance.max(0.0),
            failure_pct: s.failure_prob.clamp(0.0, 100.0),
            scrap_pct: s.scrap_rate.clamp(0.0, 100.0),
        });
    }

    let mut buffers = Vec::with_capacity(raw.buffers.len());
    for (i, b) in raw.buffers.iter().enumerate() {
        let id = BufferId(i as u32);
        if nodes.insert(&b.id, NodeRef::Buffer(id)).is_some() {
            return Err(ConfigError::DuplicateId { kind: "node", id: b.id.clone() });
        }
        buffers.push(Buffer {
            id,
            key: b.id.clone(),
            name: display_name(&b.name, &b.id),
            capacity: b.capacity,
            is_start: b.is_start_buffer,
            is_end: b.is_end_buffer,
            allowed_product_types: b.allowed_product_types.clone(),
        });
    }

    // ── Pools ─────────────────────────────────────────────────────────────
    let mut pool_ids: FxHashMap<&str, PoolId> = FxHashMap::default();
    let mut pools = Vec::new();
    let tagged = raw
        .worker_pools
        .iter()
        .map(|p| (p, PoolKind::Worker))
        .chain(raw.tool_pools.iter().map(|p| (p, PoolKind::Tool)));
    for (p, kind) in tagged {
        let id = PoolId(pools.len() as u32);
        if pool_ids.insert(&p.id, id).is_some() {
            return Err(ConfigError::DuplicateId { kind: "pool", id: p.id.clone() });
        }
        if p.capacity == 0 {
            return Err(ConfigError::ZeroCapacity { kind: "pool", id: p.id.clone() });
        }
        if p.speed.is_nan() || p.speed <= 0.0 {
            return Err(ConfigError::Setting {
                name:   "pool speed",
                reason: format!("pool {:?} has non-positive speed {}", p.id, p.speed),
            });
        }
        pools.push(PoolSpec {
            id,
            key: p.id.clone(),
            name: display_name(&p.name, &p.id),
            kind,
            capacity: p.capacity,
            speed: p.speed,
            cost_per_hour: p.cost_per_hour.max(0.0),
        });
    }

    // ── Flows ─────────────────────────────────────────────────────────────
    let mut flow_keys: FxHashMap<String, FlowId> = FxHashMap::default();
    let mut flows = Vec::with_capacity(raw.flows.len());
    for (i, f) in raw.flows.iter().enumerate() {
        let id = FlowId(i as u32);
        let key = f.id.clone().unwrap_or_else(|| format!("flow_{i}"));
        let resolve = |node: &str| {
            nodes.get(node).copied().ok_or_else(|| ConfigError::UnknownNode {
                flow: key.clone(),
                node: node.to_string(),
            })
        };
        let from = resolve(&f.from)?;
        let to = resolve(&f.to)?;
        flows.push(Flow { id, from, to, distance: f.distance.max(0.0), tool: None });
        if flow_keys.insert(key.clone(), id).is_some() {
            return Err(ConfigError::DuplicateId { kind: "flow", id: key });
        }
    }
    for p in &raw.tool_pools {
        let pool = pool_ids[p.id.as_str()];
        for fk in &p.assigned_flows {
            let flow = flow_keys.get(fk).ok_or_else(|| ConfigError::UnknownFlow {
                pool: p.id.clone(),
                flow: fk.clone(),
            })?;
            flows[flow.index()].tool = Some(pool);
        }
    }

    let mut worker_flows = Vec::with_capacity(raw.worker_flows.len());
    for wf in &raw.worker_flows {
        let pool = pool_ids
            .get(wf.from.as_str())
            .copied()
            .filter(|p| pools[p.index()].kind == PoolKind::Worker)
            .ok_or_else(|| ConfigError::UnknownWorkerFlowEnd {
                kind: "worker pool",
                id:   wf.from.clone(),
            })?;
        let station = nodes
            .get(wf.to.as_str())
            .and_then(|n| n.station())
            .ok_or_else(|| ConfigError::UnknownWorkerFlowEnd { kind: "station", id: wf.to.clone() })?;
        worker_flows.push(WorkerFlow { pool, station, distance: wf.distance.max(0.0) });
    }

    // ── Routings and calendar ─────────────────────────────────────────────
    let routings: FxHashMap<String, Routing> = raw
        .routings
        .iter()
        .map(|(k, ops)| (k.clone(), Arc::from(ops.iter().map(operation).collect::<Vec<_>>())))
        .collect();

    let shifts = request
        .settings
        .shifts
        .iter()
        .map(|(name, s)| Shift::parse(name.clone(), &s.start, &s.end, s.active, s.days.min(7)))
        .collect::<Result<Vec<_>, _>>()?;
    let calendar = ShiftCalendar::new(shifts);

    // ── Orders and settings ───────────────────────────────────────────────
    let settings = settings(&request.settings)?;
    let orders = orders(&request.orders, &request.settings.start_date)?;
    if !orders.is_empty() && !buffers.iter().any(|b| b.is_start) {
        return Err(ConfigError::NoStartBuffer);
    }

    let line = Line::new(stations, buffers, pools, flows, worker_flows, routings, calendar);
    debug!(
        stations = line.stations.len(),
        buffers = line.buffers.len(),
        pools = line.pools.len(),
        flows = line.flows.len(),
        orders = orders.len(),
        "request validated"
    );
    Ok(Scenario { line, orders, settings })
}

fn display_name(name: &str, id: &str) -> String {
    if name.trim().is_empty() { id.to_string() } else { name.to_string() }
}

fn operation(raw: &RawOperation) -> Operation {
    Operation {
        id:        raw.id.clone(),
        name:      display_name(&raw.name, &raw.id),
        time:      raw.time.max(0.0),
        operators: raw.operators.unwrap_or(1),
        assembly:  raw.montaz,
    }
}

fn time_rules(raw: &std::collections::BTreeMap<String, RawTimeRule>) -> FxHashMap<String, TimeRule> {
    raw.iter()
        .map(|(size, r)| {
            let rule = TimeRule {
                base_time:      r.base_time.max(0.0),
                function_times: r.function_times.iter().map(|(c, t)| (c.clone(), t.max(0.0))).collect(),
            };
            (size.clone(), rule)
        })
        .collect()
}

fn settings(raw: &RawSettings) -> ConfigResult<Settings> {
    let bad = |name, reason: String| Err(ConfigError::Setting { name, reason });

    if raw.backpressure_factor.is_nan() || raw.backpressure_factor <= 0.0 {
        return bad("backpressureFactor", format!("must be positive, got {}", raw.backpressure_factor));
    }
    if raw.wip_sample_hours.is_nan() || raw.wip_sample_hours <= 0.0 {
        return bad("wipSampleHours", format!("must be positive, got {}", raw.wip_sample_hours));
    }
    if raw.max_events == 0 {
        return bad("maxEvents", "must be positive".to_string());
    }
    let [lo, hi] = raw.repair_hours;
    if lo.is_nan() || hi.is_nan() || lo < 0.0 || hi < lo {
        return bad("repairHours", format!("expected 0 <= min <= max, got [{lo}, {hi}]"));
    }

    Ok(Settings {
        quality_rules:        time_rules(&raw.quality_settings),
        packing_rules:        time_rules(&raw.packing_settings),
        assembly_sequence:    raw.assembly_sequence.clone(),
        target_takt_minutes:  raw.target_takt.max(0.0),
        seed:                 raw.seed,
        max_events:           raw.max_events,
        backpressure_factor:  raw.backpressure_factor,
        repair_hours:         (lo, hi),
        energy_cost_per_hour: raw.energy_cost_per_hour.max(0.0),
        wip_sample_hours:     raw.wip_sample_hours,
    })
}

fn orders(raw: &[RawOrder], start_date: &str) -> ConfigResult<Vec<OrderSpec>> {
    let start = parse_date(start_date)?;
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut out = Vec::with_capacity(raw.len());

    for (i, o) in raw.iter().enumerate() {
        let size = o.size.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let name = match o.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => format!("{}. {}", i + 1, size.unwrap_or("unknown")),
        };
        let (Some(bom), Some(size), Some(ordered)) = (o.order_string.as_deref(), size, o.order_date.as_deref())
        else {
            warn!(order = %name, "order skipped: needs orderString, size and orderDate");
            continue;
        };
        let arrival = match parse_date(ordered) {
            Ok(d) => hours_since(start, d),
            Err(e) => {
                warn!(order = %name, error = %e, "order skipped");
                continue;
            }
        };
        let due = match o.due_date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(text) => match parse_date(text) {
                Ok(d) => {
                    let due = hours_since(start, d);
                    Some(if due < arrival { arrival + 24.0 } else { due })
                }
                Err(e) => {
                    warn!(order = %name, error = %e, "order skipped");
                    continue;
                }
            },
        };
        if !seen.insert(name.clone()) {
            warn!(order = %name, "duplicate order id; both orders are simulated");
        }
        out.push(OrderSpec { name, bom: bom.to_string(), size: size.to_string(), arrival, due });
    }
    Ok(out)
}
