//! The validated production line.
//!
//! Every string id from the request has been interned into a dense typed id
//! (`StationId`, `BufferId`, `PoolId`, `FlowId`).  Adjacency lists are built
//! once so the engine never scans the flow list.

use ls_core::{BufferId, FlowId, NodeRef, PoolId, StationId};
use ls_model::{Operation, PoolKind, Routing};
use ls_schedule::ShiftCalendar;
use rustc_hash::FxHashMap;

// ── Stations ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StationKind {
    Standard,
    SubAssembly,
    Assembly,
    Quality,
    Packing,
}

impl StationKind {
    /// Classify the free-form station type string.
    pub fn from_type(raw: &str) -> Self {
        let t = raw.to_lowercase();
        if t.contains("podmontaz") || t.contains("subassembly") || t.contains("sub-assembly") {
            StationKind::SubAssembly
        } else if t.contains("montaz") || t.contains("assembly") {
            StationKind::Assembly
        } else if t.contains("jakosc") || t.contains("jakosci") || t.contains("quality") {
            StationKind::Quality
        } else if t.contains("pakowanie") || t.contains("packing") {
            StationKind::Packing
        } else {
            StationKind::Standard
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StationKind::Standard => "standard",
            StationKind::SubAssembly => "sub-assembly",
            StationKind::Assembly => "assembly",
            StationKind::Quality => "quality",
            StationKind::Packing => "packing",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Station {
    pub id:           StationId,
    /// Id as given in the request.
    pub key:          String,
    pub name:         String,
    pub kind:         StationKind,
    pub capacity:     u32,
    pub allowed_ops:  Vec<Operation>,
    pub variance_pct: f64,
    pub failure_pct:  f64,
    pub scrap_pct:    f64,
}

impl Station {
    /// Assembly stations pull complete kits instead of being pushed to.
    pub fn is_assembly(&self) -> bool {
        matches!(self.kind, StationKind::Assembly | StationKind::SubAssembly)
            || self.allowed_ops.iter().any(|o| o.assembly)
    }

    pub fn allows(&self, op: &Operation) -> bool {
        self.allowed_ops.iter().any(|o| o.id == op.id)
    }
}

// ── Buffers ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Buffer {
    pub id:                    BufferId,
    pub key:                   String,
    pub name:                  String,
    /// Nominal capacity; reported against, not enforced.
    pub capacity:              u32,
    pub is_start:              bool,
    pub is_end:                bool,
    pub allowed_product_types: Vec<String>,
}

// ── Pools and flows ───────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct PoolSpec {
    pub id:            PoolId,
    pub key:           String,
    pub name:          String,
    pub kind:          PoolKind,
    pub capacity:      u32,
    pub speed:         f64,
    pub cost_per_hour: f64,
}

#[derive(Clone, Debug)]
pub struct Flow {
    pub id:       FlowId,
    pub from:     NodeRef,
    pub to:       NodeRef,
    /// Metres.
    pub distance: f64,
    /// Tool pool whose unit every move along this flow needs.
    pub tool:     Option<PoolId>,
}

#[derive(Clone, Debug)]
pub struct WorkerFlow {
    pub pool:     PoolId,
    pub station:  StationId,
    pub distance: f64,
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Quality/packing operation time for one size.
#[derive(Clone, Debug, Default)]
pub struct TimeRule {
    pub base_time:      f64,
    pub function_times: FxHashMap<String, f64>,
}

impl TimeRule {
    /// Base time plus the configured time of every attached child code.
    pub fn time_for<'a>(&self, child_codes: impl IntoIterator<Item = &'a str>) -> f64 {
        self.base_time
            + child_codes
                .into_iter()
                .filter_map(|c| self.function_times.get(c))
                .sum::<f64>()
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub quality_rules:        FxHashMap<String, TimeRule>,
    pub packing_rules:        FxHashMap<String, TimeRule>,
    pub assembly_sequence:    Vec<String>,
    pub target_takt_minutes:  f64,
    pub seed:                 u64,
    pub max_events:           u64,
    pub backpressure_factor:  f64,
    pub repair_hours:         (f64, f64),
    pub energy_cost_per_hour: f64,
    pub wip_sample_hours:     f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality_rules:        FxHashMap::default(),
            packing_rules:        FxHashMap::default(),
            assembly_sequence:    Vec::new(),
            target_takt_minutes:  0.0,
            seed:                 42,
            max_events:           800_000,
            backpressure_factor:  2.0,
            repair_hours:         (0.5, 2.0),
            energy_cost_per_hour: 0.5,
            wip_sample_hours:     1.0,
        }
    }
}

/// One order, with dates already converted to hours since the start date.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderSpec {
    pub name:    String,
    pub bom:     String,
    pub size:    String,
    /// May be negative for orders placed before the start date.
    pub arrival: f64,
    pub due:     Option<f64>,
}

// ── Line ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Line {
    pub stations:     Vec<Station>,
    pub buffers:      Vec<Buffer>,
    pub pools:        Vec<PoolSpec>,
    pub flows:        Vec<Flow>,
    pub worker_flows: Vec<WorkerFlow>,
    pub routings:     FxHashMap<String, Routing>,
    pub calendar:     ShiftCalendar,

    station_out:    Vec<Vec<FlowId>>,
    station_in:     Vec<Vec<FlowId>>,
    buffer_out:     Vec<Vec<FlowId>>,
    buffer_in:      Vec<Vec<FlowId>>,
    station_worker: Vec<Option<usize>>,
}

impl Line {
    /// Assemble a line and build its adjacency lists.  Ids inside `flows`
    /// and `worker_flows` must index `stations`, `buffers` and `pools`.
    pub fn new(
        stations: Vec<Station>,
        buffers: Vec<Buffer>,
        pools: Vec<PoolSpec>,
        flows: Vec<Flow>,
        worker_flows: Vec<WorkerFlow>,
        routings: FxHashMap<String, Routing>,
        calendar: ShiftCalendar,
    ) -> Self {
        let mut station_out = vec![Vec::new(); stations.len()];
        let mut station_in = vec![Vec::new(); stations.len()];
        let mut buffer_out = vec![Vec::new(); buffers.len()];
        let mut buffer_in = vec![Vec::new(); buffers.len()];
        for f in &flows {
            match f.from {
                NodeRef::Station(s) => station_out[s.index()].push(f.id),
                NodeRef::Buffer(b) => buffer_out[b.index()].push(f.id),
            }
            match f.to {
                NodeRef::Station(s) => station_in[s.index()].push(f.id),
                NodeRef::Buffer(b) => buffer_in[b.index()].push(f.id),
            }
        }
        // First worker flow wins when a station is wired to several pools.
        let mut station_worker = vec![None; stations.len()];
        for (i, wf) in worker_flows.iter().enumerate() {
            station_worker[wf.station.index()].get_or_insert(i);
        }
        Self {
            stations,
            buffers,
            pools,
            flows,
            worker_flows,
            routings,
            calendar,
            station_out,
            station_in,
            buffer_out,
            buffer_in,
            station_worker,
        }
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.index()]
    }

    pub fn buffer(&self, id: BufferId) -> &Buffer {
        &self.buffers[id.index()]
    }

    pub fn pool(&self, id: PoolId) -> &PoolSpec {
        &self.pools[id.index()]
    }

    pub fn flow(&self, id: FlowId) -> &Flow {
        &self.flows[id.index()]
    }

    pub fn outgoing(&self, node: NodeRef) -> &[FlowId] {
        match node {
            NodeRef::Station(s) => &self.station_out[s.index()],
            NodeRef::Buffer(b) => &self.buffer_out[b.index()],
        }
    }

    pub fn incoming(&self, node: NodeRef) -> &[FlowId] {
        match node {
            NodeRef::Station(s) => &self.station_in[s.index()],
            NodeRef::Buffer(b) => &self.buffer_in[b.index()],
        }
    }

    /// The flow from `from` to `to`, if one exists.
    pub fn flow_between(&self, from: NodeRef, to: NodeRef) -> Option<&Flow> {
        self.outgoing(from).iter().map(|&f| self.flow(f)).find(|f| f.to == to)
    }

    /// The worker pool feeding `station`, with its walking distance.
    pub fn worker_flow(&self, station: StationId) -> Option<&WorkerFlow> {
        self.station_worker[station.index()].map(|i| &self.worker_flows[i])
    }

    pub fn routing(&self, key: &str) -> Option<&Routing> {
        self.routings.get(key)
    }

    /// A start buffer accepting `product_type`, else any start buffer.
    pub fn start_buffer_for(&self, product_type: &str) -> Option<BufferId> {
        self.buffers
            .iter()
            .find(|b| b.is_start && b.allowed_product_types.iter().any(|t| t == product_type))
            .or_else(|| self.buffers.iter().find(|b| b.is_start))
            .map(|b| b.id)
    }

    /// Assembly station fed directly by `buffer`, if any.
    pub fn assembly_fed_by(&self, buffer: BufferId) -> Option<StationId> {
        self.outgoing(NodeRef::Buffer(buffer))
            .iter()
            .filter_map(|&f| self.flow(f).to.station())
            .find(|&s| self.station(s).is_assembly())
    }
}
