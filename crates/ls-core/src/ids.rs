//! Strongly typed, zero-cost identifier wrappers.
//!
//! Configuration refers to stations, buffers, and pools by string ids.  The
//! configuration layer interns those strings once, and from then on the
//! engine only sees these `Copy` integer ids, which index straight into its
//! state tables via `.index()`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Index of a processing station.
    pub struct StationId(u32);
}

typed_id! {
    /// Index of a holding buffer.
    pub struct BufferId(u32);
}

typed_id! {
    /// Index of a resource pool.  Worker and tool pools share one id space.
    pub struct PoolId(u32);
}

typed_id! {
    /// Index of a part in the engine's part table.
    pub struct PartId(u32);
}

typed_id! {
    /// Index of an order in the order book.
    pub struct OrderId(u32);
}

typed_id! {
    /// Index of a directed material-flow edge.
    pub struct FlowId(u32);
}

// ── NodeRef ───────────────────────────────────────────────────────────────────

/// A node of the line layout: either a station or a buffer.
///
/// Flow edges connect `NodeRef`s; a part's current location is a `NodeRef`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeRef {
    Station(StationId),
    Buffer(BufferId),
}

impl NodeRef {
    pub fn station(self) -> Option<StationId> {
        match self {
            NodeRef::Station(s) => Some(s),
            NodeRef::Buffer(_) => None,
        }
    }

    pub fn buffer(self) -> Option<BufferId> {
        match self {
            NodeRef::Buffer(b) => Some(b),
            NodeRef::Station(_) => None,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Station(s) => s.fmt(f),
            NodeRef::Buffer(b) => b.fmt(f),
        }
    }
}
