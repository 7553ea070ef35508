//! Simulation time model.
//!
//! # Design
//!
//! Time is a real number of hours since the simulation start (hour 0 is the
//! configured start date, 00:00).  The calendar is a repeating week:
//!
//!   day_index   = floor(t / 24)
//!   day_of_week = day_index % 7
//!   hour_of_day = t mod 24
//!
//! Hours are `f64` rather than integer ticks because operation times, worker
//! walks, and transport hops are fractions of an hour and are chained through
//! the shift calendar.  `SimTime` is totally ordered with `f64::total_cmp`
//! so it can key a heap; the engine never produces NaN.

use std::cmp::Ordering;
use std::fmt;

use crate::{CoreError, CoreResult};

pub const HOURS_PER_DAY: f64 = 24.0;
pub const DAYS_PER_WEEK: u64 = 7;
pub const HOURS_PER_WEEK: f64 = HOURS_PER_DAY * DAYS_PER_WEEK as f64;
pub const SECS_PER_HOUR: f64 = 3_600.0;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation instant, in hours since the start.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn hours(self) -> f64 {
        self.0
    }

    /// Hours elapsed from `earlier` to `self`, floored at zero.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    /// Whole days since the start.
    #[inline]
    pub fn day_index(self) -> u64 {
        (self.0 / HOURS_PER_DAY).floor().max(0.0) as u64
    }

    /// Position in the weekly cycle, `0..7`.
    #[inline]
    pub fn day_of_week(self) -> u64 {
        self.day_index() % DAYS_PER_WEEK
    }

    /// Fractional hour within the current day, `[0, 24)`.
    #[inline]
    pub fn hour_of_day(self) -> f64 {
        self.0.rem_euclid(HOURS_PER_DAY)
    }

    /// Start of the day containing `self`.
    #[inline]
    pub fn start_of_day(self) -> SimTime {
        SimTime(self.day_index() as f64 * HOURS_PER_DAY)
    }

    /// Break the instant into (day, hour, minute) for human-readable logs.
    pub fn dhm(self) -> (u64, u32, u32) {
        let hod = self.hour_of_day();
        let minutes = (hod * 60.0).floor() as u32;
        (self.day_index(), minutes / 60, minutes % 60)
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.dhm();
        write!(f, "{:.3}h (day {} {:02}:{:02})", self.0, d, h, m)
    }
}

// ── TimeOfDay ─────────────────────────────────────────────────────────────────

/// A wall-clock time within a day, minute resolution.  Used for shift
/// window boundaries.  `24:00` is accepted as the end of the day.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { minutes: 0 };
    pub const END_OF_DAY: TimeOfDay = TimeOfDay { minutes: 24 * 60 };

    pub fn new(hour: u8, minute: u8) -> CoreResult<Self> {
        if (hour, minute) == (24, 0) {
            return Ok(Self::END_OF_DAY);
        }
        if hour >= 24 || minute >= 60 {
            return Err(CoreError::TimeOfDay(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { minutes: hour as u16 * 60 + minute as u16 })
    }

    /// Parse `"HH:MM"` (also accepts a bare `"HH"`).
    pub fn parse(s: &str) -> CoreResult<Self> {
        let bad = || CoreError::TimeOfDay(s.to_string());
        let mut fields = s.trim().splitn(2, ':');
        let hour: u8 = fields
            .next()
            .and_then(|h| h.trim().parse().ok())
            .ok_or_else(bad)?;
        let minute: u8 = match fields.next() {
            None => 0,
            Some(m) => m.trim().parse().map_err(|_| bad())?,
        };
        Self::new(hour, minute).map_err(|_| bad())
    }

    /// Fractional hours since midnight.
    #[inline]
    pub fn as_hours(self) -> f64 {
        self.minutes as f64 / 60.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}
