//! Base error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! through `#[from]` or keep it as one variant.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid time of day {0:?}: expected \"HH:MM\" between 00:00 and 24:00")]
    TimeOfDay(String),
}

/// Shorthand result type for `ls-core`.
pub type CoreResult<T> = Result<T, CoreError>;
