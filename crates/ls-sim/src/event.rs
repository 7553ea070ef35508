//! Events on the future event list.

use ls_core::{NodeRef, PartId, PoolId, SimTime, StationId};

/// Every kind of scheduled happening.  Dispatch is an exhaustive `match` in
/// [`Sim::dispatch`][crate::Sim].
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// An order is released: parse its BOM and create its parts.
    OrderArrival { order: usize },

    /// A part reaches a buffer or station.  `tool` is the tool pool unit the
    /// move held, released on arrival.
    PartArrives {
        part:     PartId,
        node:     NodeRef,
        tool:     Option<PoolId>,
        departed: SimTime,
    },

    /// The operator walked to the station; processing starts.
    WorkerArrives {
        part:      PartId,
        station:   StationId,
        pool:      Option<PoolId>,
        operators: u32,
        claimed:   SimTime,
    },

    /// Processing finished.  `work_hours` is the drawn operation time.
    OperationComplete {
        part:       PartId,
        station:    StationId,
        pool:       Option<PoolId>,
        operators:  u32,
        claimed:    SimTime,
        work_hours: f64,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::OrderArrival { .. } => "order_arrival",
            Event::PartArrives { .. } => "part_arrives",
            Event::WorkerArrives { .. } => "worker_arrives",
            Event::OperationComplete { .. } => "operation_complete",
        }
    }
}
