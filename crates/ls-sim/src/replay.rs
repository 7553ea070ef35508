//! Replay records: the time-stamped trace a visual replay is drawn from.
//!
//! Nodes and pools are named by their request keys so the trace can be
//! matched against the layout the planner drew.  Records are emitted in
//! event order through [`SimObserver::on_replay`][crate::SimObserver::on_replay].

use ls_core::SimTime;

/// Items listed per [`ReplayEvent::BufferState`] record.
pub const BUFFER_CONTENT_LIMIT: usize = 50;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum StationStatus {
    Run,
    Idle,
    Breakdown,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UsageKind {
    /// Operator time from dispatch to the end of the operation.
    Work,
    /// Tool unit held for one transport.
    Transport,
}

/// What a station is working on, attached to `Run` records.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationWork {
    pub part:      u32,
    pub code:      String,
    pub order:     String,
    pub operation: Option<String>,
    pub end:       SimTime,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferItem {
    pub code:  String,
    pub order: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReplayEvent {
    StationState {
        time:    SimTime,
        station: String,
        status:  StationStatus,
        work:    Option<StationWork>,
    },
    BufferState {
        time:    SimTime,
        buffer:  String,
        count:   usize,
        /// The first [`BUFFER_CONTENT_LIMIT`] parts, head first.
        content: Vec<BufferItem>,
    },
    Transport {
        start:     SimTime,
        end:       SimTime,
        from:      String,
        to:        String,
        part:      u32,
        order:     String,
        code:      String,
        assembled: bool,
    },
    WorkerTravel {
        start:   SimTime,
        end:     SimTime,
        pool:    String,
        station: String,
    },
    ResourceUsage {
        pool:  String,
        usage: UsageKind,
        part:  u32,
        start: SimTime,
        end:   SimTime,
    },
}

impl ReplayEvent {
    /// The instant the record was emitted.  Usage records are emitted when
    /// the unit comes back.
    pub fn time(&self) -> SimTime {
        match self {
            ReplayEvent::StationState { time, .. } | ReplayEvent::BufferState { time, .. } => *time,
            ReplayEvent::Transport { start, .. } | ReplayEvent::WorkerTravel { start, .. } => *start,
            ReplayEvent::ResourceUsage { end, .. } => *end,
        }
    }
}
