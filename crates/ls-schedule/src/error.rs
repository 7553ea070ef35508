use ls_core::{CoreError, SimTime};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("shift {name:?}: {source}")]
    Shift {
        name:   String,
        #[source]
        source: CoreError,
    },

    #[error("calendar stepping exceeded {steps} steps (start {start}, {duration} h of work)")]
    IterationCap {
        start:    SimTime,
        duration: f64,
        steps:    usize,
    },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
