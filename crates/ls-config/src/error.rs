use ls_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("request JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate {kind} id {id:?}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} {id:?} has zero capacity")]
    ZeroCapacity { kind: &'static str, id: String },

    #[error("flow {flow} references unknown node {node:?}")]
    UnknownNode { flow: String, node: String },

    #[error("worker flow references unknown {kind} {id:?}")]
    UnknownWorkerFlowEnd { kind: &'static str, id: String },

    #[error("tool pool {pool:?} is assigned unknown flow {flow:?}")]
    UnknownFlow { pool: String, flow: String },

    #[error("orders are present but no buffer is marked as a start buffer")]
    NoStartBuffer,

    #[error("invalid date {0:?}: expected DD-MM-YYYY or YYYY-MM-DD")]
    Date(String),

    #[error("setting {name}: {reason}")]
    Setting { name: &'static str, reason: String },

    #[error(transparent)]
    Shift(#[from] ScheduleError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
