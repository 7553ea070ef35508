//! `ls-schedule` — shift calendar and time-ordered event queue.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`calendar`]    | `Shift`, `ShiftCalendar`                              |
//! | [`event_queue`] | `EventQueue<E>` (binary min-heap on `(time, seq)`)    |
//! | [`error`]       | `ScheduleError`, `ScheduleResult<T>`                  |
//!
//! # Calendar model (summary)
//!
//! Every shift is a daily window active on the first `days` days of a 7-day
//! week.  At time `t`:
//!
//! ```text
//! working(t)  = any active shift s with day_of_week(t) < s.days
//!               and hour_of_day(t) inside [s.start, s.end)   (wraps past midnight)
//! completion  = start + duration, stretched over non-working gaps
//! ```

pub mod calendar;
pub mod error;
pub mod event_queue;


pub use calendar::{Shift, ShiftCalendar};
pub use error::{ScheduleError, ScheduleResult};
pub use event_queue::EventQueue;
