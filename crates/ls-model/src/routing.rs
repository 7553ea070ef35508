//! Routings: the ordered operation lists parts carry.
//!
//! Routings are looked up by string key `{type}_{size}_{code}_phase{n}`, where
//! `type` is `casings` for parents and `functions` for children.  Phase 0 is
//! the component's own processing; phase 1 is what a component contributes to
//! the routing of an assembled parent.

use std::sync::Arc;

use crate::PartKind;

/// Processing time used when an operation has no positive time configured.
pub const DEFAULT_OPERATION_HOURS: f64 = 0.1;

/// One routing step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operation {
    pub id:        String,
    pub name:      String,
    /// Base processing time in hours.
    pub time:      f64,
    /// Workers needed from the station's worker pool.  0 = automatic.
    pub operators: u32,
    /// Marks an assembly operation; a station allowing one is an assembly
    /// station.
    pub assembly:  bool,
}

impl Operation {
    /// Configured time, or [`DEFAULT_OPERATION_HOURS`] when unset.
    pub fn base_time(&self) -> f64 {
        if self.time > 0.0 { self.time } else { DEFAULT_OPERATION_HOURS }
    }
}

/// A shared, immutable operation list.
pub type Routing = Arc<[Operation]>;

pub fn routing_key(kind: PartKind, size: &str, code: &str, phase: u8) -> String {
    format!("{}_{size}_{code}_phase{phase}", kind.type_prefix())
}
