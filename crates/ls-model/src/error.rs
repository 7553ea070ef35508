use ls_core::{PartId, PoolId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BomError {
    #[error("order string is empty")]
    Empty,

    #[error("empty segment at position {index} in {input:?}")]
    EmptySegment { input: String, index: usize },

    #[error("segment {segment:?} in {input:?} lists children but follows no parent")]
    OrphanChildren { input: String, segment: String },

    #[error("segment {segment:?} in {input:?} contains a non-alphanumeric character")]
    InvalidCharacter { input: String, segment: String },
}

pub type BomResult<T> = Result<T, BomError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("{pool}: request for {amount} exceeds capacity {capacity}")]
    ExceedsCapacity { pool: PoolId, amount: u32, capacity: u32 },

    #[error("{pool}: {requester} released {amount} but holds {held}")]
    NotHeld { pool: PoolId, requester: PartId, amount: u32, held: u32 },
}

pub type ResourceResult<T> = Result<T, ResourceError>;
