use ls_core::SimTime;
use ls_model::ResourceError;
use ls_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("no shift is active; the line never works")]
    NoActiveShift,

    #[error("nothing to simulate: no event was ever scheduled")]
    NothingToSimulate,

    #[error("event cap of {cap} exceeded at {time}; run aborted")]
    EventCapExceeded { cap: u64, time: SimTime },

    #[error("more than {limit} follow-up checks after one event at {time}; run aborted")]
    RecheckOverflow { limit: usize, time: SimTime },

    #[error("calendar: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("resource pool: {0}")]
    Resource(#[from] ResourceError),
}

pub type SimResult<T> = Result<T, SimError>;
