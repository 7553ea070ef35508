//! Part entity and its lifecycle state machine.
//!
//! # Time accounting
//!
//! Every call to [`Part::transition`] charges the time since the previous
//! transition to the bucket of the state being *left*:
//!
//! | Left state                                                   | Bucket       |
//! |--------------------------------------------------------------|--------------|
//! | `Processing`                                                 | `processing` |
//! | `InTransport`, `WaitingForWorkerTravel`                      | `transport`  |
//! | `Created`, `IdleInBuffer`, `IdleAtStation`, `WaitingForWorker`, `WaitingForTool` | `wait` |
//! | `Blocked`                                                    | `blocked`    |
//!
//! Entering a terminal state stamps `finished`, so for any finished part
//! the four buckets sum to `finished - created`.

use ls_core::{NodeRef, OrderId, PartId, SimTime};

use crate::{NewPart, Operation, Routing};

// ── PartKind ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartKind {
    /// A casing: the part other components get assembled into.
    Parent,
    /// A function component consumed by assembly.
    Child,
}

impl PartKind {
    /// Prefix used in product-type and routing keys.
    pub fn type_prefix(self) -> &'static str {
        match self {
            PartKind::Parent => "casings",
            PartKind::Child => "functions",
        }
    }
}

// ── PartState ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartState {
    Created,
    IdleInBuffer,
    IdleAtStation,
    WaitingForWorker,
    WaitingForWorkerTravel,
    Processing,
    InTransport,
    WaitingForTool,
    /// Remaining routing but nowhere to go.
    Blocked,
    Finished,
    Scrapped,
    /// Consumed into a parent by assembly.
    Assembled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Bucket {
    Wait,
    Processing,
    Transport,
    Blocked,
}

impl PartState {
    fn bucket(self) -> Option<Bucket> {
        use PartState::*;
        match self {
            Processing => Some(Bucket::Processing),
            InTransport | WaitingForWorkerTravel => Some(Bucket::Transport),
            Created | IdleInBuffer | IdleAtStation | WaitingForWorker | WaitingForTool => {
                Some(Bucket::Wait)
            }
            Blocked => Some(Bucket::Blocked),
            Finished | Scrapped | Assembled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PartState::Finished | PartState::Scrapped | PartState::Assembled)
    }
}

// ── StateDurations ────────────────────────────────────────────────────────────

/// Accumulated hours per lifecycle bucket.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDurations {
    pub wait:       f64,
    pub processing: f64,
    pub transport:  f64,
    pub blocked:    f64,
}

impl StateDurations {
    pub fn total(&self) -> f64 {
        self.wait + self.processing + self.transport + self.blocked
    }

    fn charge(&mut self, bucket: Bucket, hours: f64) {
        match bucket {
            Bucket::Wait => self.wait += hours,
            Bucket::Processing => self.processing += hours,
            Bucket::Transport => self.transport += hours,
            Bucket::Blocked => self.blocked += hours,
        }
    }
}

impl std::ops::AddAssign for StateDurations {
    fn add_assign(&mut self, rhs: Self) {
        self.wait += rhs.wait;
        self.processing += rhs.processing;
        self.transport += rhs.transport;
        self.blocked += rhs.blocked;
    }
}

// ── Part ──────────────────────────────────────────────────────────────────────

/// A child attached to a parent by assembly.
#[derive(Clone, Debug, PartialEq)]
pub struct AttachedChild {
    pub id:   PartId,
    pub code: String,
}

#[derive(Clone, Debug)]
pub struct Part {
    pub id:       PartId,
    pub order:    OrderId,
    pub kind:     PartKind,
    pub code:     String,
    pub size:     String,
    pub routing:  Routing,
    /// Index of the next operation in `routing`.
    pub cursor:   usize,
    /// Child codes the BOM requires before assembly (parents only).
    pub bom:      Vec<String>,
    pub attached: Vec<AttachedChild>,
    pub location: Option<NodeRef>,
    pub created:  SimTime,
    pub finished: Option<SimTime>,
    pub due:      Option<SimTime>,
    pub durations: StateDurations,

    state:           PartState,
    last_transition: SimTime,
}

impl Part {
    pub(crate) fn new(id: PartId, spec: NewPart) -> Self {
        Self {
            id,
            order: spec.order,
            kind: spec.kind,
            code: spec.code,
            size: spec.size,
            routing: spec.routing,
            cursor: 0,
            bom: spec.bom,
            attached: Vec::new(),
            location: None,
            created: spec.created,
            finished: None,
            due: spec.due,
            durations: StateDurations::default(),
            state: PartState::Created,
            last_transition: spec.created,
        }
    }

    pub fn state(&self) -> PartState {
        self.state
    }

    /// Move to `to` at `now`, charging the elapsed time to the state left.
    pub fn transition(&mut self, to: PartState, now: SimTime) {
        let elapsed = now.since(self.last_transition);
        if let Some(bucket) = self.state.bucket() {
            self.durations.charge(bucket, elapsed);
        }
        self.state = to;
        self.last_transition = now;
        if to.is_terminal() {
            self.finished = Some(now);
        }
    }

    pub fn current_op(&self) -> Option<&Operation> {
        self.routing.get(self.cursor)
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn has_remaining_ops(&self) -> bool {
        self.cursor < self.routing.len()
    }

    /// Replace the routing and restart it (used after assembly).
    pub fn reroute(&mut self, routing: Routing) {
        self.routing = routing;
        self.cursor = 0;
    }

    /// BOM codes not yet covered by an attached child, counting duplicates.
    pub fn missing_children(&self) -> Vec<&str> {
        let mut attached: Vec<&str> = self.attached.iter().map(|c| c.code.as_str()).collect();
        let mut missing = Vec::new();
        for code in &self.bom {
            match attached.iter().position(|a| *a == code.as_str()) {
                Some(i) => {
                    attached.swap_remove(i);
                }
                None => missing.push(code.as_str()),
            }
        }
        missing
    }

    /// Hours from creation to finish, if finished.
    pub fn lead_time(&self) -> Option<f64> {
        self.finished.map(|f| f.since(self.created))
    }
}
