//! Shift calendar: which instants are working time, and how long a piece of
//! work really takes once non-working gaps are skipped.
//!
//! # Stepping
//!
//! Working status can only change at a *boundary*: midnight (the weekday
//! changes) or the start/end hour of an active shift.  [`ShiftCalendar`]
//! precomputes those hour-of-day boundaries once, and every calendar walk
//! jumps from boundary to boundary instead of sampling time.  Boundaries are
//! always rebuilt from `start_of_day + hour`, so a walk lands on exactly the
//! same `f64` every time it reaches a given boundary.
//!
//! An empty calendar (no shifts at all) means the line runs continuously.
//! A calendar that has shifts, none of which ever covers any instant, makes
//! [`ShiftCalendar::completion_time`] fail with
//! [`ScheduleError::IterationCap`] instead of looping forever.

use ls_core::time::HOURS_PER_DAY;
use ls_core::{SimTime, TimeOfDay};

use crate::{ScheduleError, ScheduleResult};

/// Upper bound on boundary steps for one calendar walk.
const MAX_STEPS: usize = 15_000;

/// Remaining work below this many hours counts as done.
const WORK_EPSILON: f64 = 1e-4;

const BOUNDARY_EPSILON: f64 = 1e-9;

// ── Shift ─────────────────────────────────────────────────────────────────────

/// One daily working window.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shift {
    pub name:   String,
    pub start:  TimeOfDay,
    pub end:    TimeOfDay,
    pub active: bool,
    /// The shift runs on weekdays `0..days` of each week.
    pub days:   u8,
}

impl Shift {
    /// Build a shift from `"HH:MM"` strings.
    pub fn parse(
        name: impl Into<String>,
        start: &str,
        end: &str,
        active: bool,
        days: u8,
    ) -> ScheduleResult<Self> {
        let name = name.into();
        let start = TimeOfDay::parse(start)
            .map_err(|source| ScheduleError::Shift { name: name.clone(), source })?;
        let end = TimeOfDay::parse(end)
            .map_err(|source| ScheduleError::Shift { name: name.clone(), source })?;
        Ok(Self { name, start, end, active, days })
    }

    /// `true` if this shift can contribute working time at all.
    pub fn is_effective(&self) -> bool {
        self.active && self.days > 0
    }

    /// `true` if `t` falls inside this shift.
    ///
    /// `end > start` is the window `[start, end)`.  Otherwise the shift wraps
    /// past midnight (`end == start` covers the whole day).  The weekday test
    /// uses the weekday of `t` itself, also for the post-midnight tail.
    pub fn covers(&self, t: SimTime) -> bool {
        if !self.active || t.day_of_week() >= u64::from(self.days) {
            return false;
        }
        let h = t.hour_of_day();
        let s = self.start.as_hours();
        let e = self.end.as_hours();
        if e > s { h >= s && h < e } else { h >= s || h < e }
    }
}

// ── ShiftCalendar ─────────────────────────────────────────────────────────────

/// The set of shifts the whole line works to.
#[derive(Clone, Debug, Default)]
pub struct ShiftCalendar {
    shifts:     Vec<Shift>,
    /// Sorted, deduplicated hour-of-day boundaries, always including 0.
    boundaries: Vec<f64>,
}

impl ShiftCalendar {
    pub fn new(shifts: Vec<Shift>) -> Self {
        let mut boundaries = vec![0.0];
        for s in shifts.iter().filter(|s| s.is_effective()) {
            boundaries.push(s.start.as_hours());
            boundaries.push(s.end.as_hours());
        }
        boundaries.sort_by(f64::total_cmp);
        boundaries.dedup();
        Self { shifts, boundaries }
    }

    /// A calendar with no shifts: every instant is working time.
    pub fn continuous() -> Self {
        Self::new(Vec::new())
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn is_continuous(&self) -> bool {
        self.shifts.is_empty()
    }

    /// `false` when shifts are configured but none of them can ever run.
    pub fn has_active_shift(&self) -> bool {
        self.is_continuous() || self.shifts.iter().any(Shift::is_effective)
    }

    pub fn is_working_time(&self, t: SimTime) -> bool {
        self.is_continuous() || self.shifts.iter().any(|s| s.covers(t))
    }

    /// The first boundary strictly after `t`.
    pub fn next_boundary(&self, t: SimTime) -> SimTime {
        let day = t.start_of_day().hours();
        self.boundaries
            .iter()
            .map(|&b| day + b)
            .find(|&b| b > t.hours() + BOUNDARY_EPSILON)
            .map(SimTime)
            .unwrap_or(SimTime(day + HOURS_PER_DAY))
    }

    /// The earliest working instant at or after `t`.
    pub fn next_working_time(&self, t: SimTime) -> ScheduleResult<SimTime> {
        self.completion_time(t, 0.0)
    }

    /// The instant at which `duration` hours of work started at `start` are
    /// finished.  Non-working time is skipped before and during the work.
    ///
    /// `completion_time(t, 0.0)` is the next working instant at or after `t`,
    /// and is idempotent.
    pub fn completion_time(&self, start: SimTime, duration: f64) -> ScheduleResult<SimTime> {
        if self.is_continuous() {
            return Ok(start + duration.max(0.0));
        }
        let cap_error = |steps| ScheduleError::IterationCap { start, duration, steps };

        let mut cursor = start;
        let mut steps = 0usize;
        while !self.is_working_time(cursor) {
            steps += 1;
            if steps > MAX_STEPS {
                return Err(cap_error(steps));
            }
            cursor = self.next_boundary(cursor);
        }

        let mut remaining = duration.max(0.0);
        while remaining > WORK_EPSILON {
            steps += 1;
            if steps > MAX_STEPS {
                return Err(cap_error(steps));
            }
            let boundary = self.next_boundary(cursor);
            if !self.is_working_time(cursor) {
                cursor = boundary;
                continue;
            }
            let window = boundary - cursor;
            if window >= remaining {
                cursor = cursor + remaining;
                remaining = 0.0;
            } else {
                remaining -= window;
                cursor = boundary;
            }
        }
        Ok(cursor)
    }

    /// Working hours in `[0, horizon)`, sampled at whole hours.
    pub fn working_hours(&self, horizon: SimTime) -> f64 {
        let mut total = 0.0;
        let mut t = 0.0;
        while t < horizon.hours() {
            if self.is_working_time(SimTime(t)) {
                total += 1.0;
            }
            t += 1.0;
        }
        total
    }
}
