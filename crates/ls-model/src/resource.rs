//! `ResourcePool` — a counting semaphore with a FIFO wait list.
//!
//! Worker pools and tool pools share this type; only [`PoolKind`] and the
//! cost rate differ.
//!
//! # Invariant
//!
//! `available + outstanding() == capacity` after every `request`/`release`
//! pair the engine issues.  Grants are tracked per requester so a release
//! that does not match a grant is reported instead of silently inflating
//! `available`.
//!
//! # Service order
//!
//! A request is granted whenever enough units are free; otherwise the
//! requester joins the back of the wait list.  A release looks at the head of
//! the list only: the head is served if its request now fits, and nobody
//! behind it is.  Waiters further back get their units by asking again.

use std::collections::VecDeque;

use ls_core::{PartId, PoolId};
use rustc_hash::FxHashMap;

use crate::{ResourceError, ResourceResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolKind {
    Worker,
    Tool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    Granted,
    /// Parked in the wait list (or already there).
    Pending,
}

#[derive(Clone, Debug)]
pub struct ResourcePool {
    pub id:            PoolId,
    pub name:          String,
    pub kind:          PoolKind,
    pub capacity:      u32,
    /// Travel speed in metres per second.
    pub speed:         f64,
    pub cost_per_hour: f64,

    available:  u32,
    waiting:    VecDeque<(PartId, u32)>,
    grants:     FxHashMap<PartId, u32>,
    busy_hours: f64,
}

impl ResourcePool {
    pub fn new(
        id: PoolId,
        name: impl Into<String>,
        kind: PoolKind,
        capacity: u32,
        speed: f64,
        cost_per_hour: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            capacity,
            speed,
            cost_per_hour,
            available: capacity,
            waiting: VecDeque::new(),
            grants: FxHashMap::default(),
            busy_hours: 0.0,
        }
    }

    /// Ask for `amount` units on behalf of `requester`.
    ///
    /// Fails permanently when `amount` can never be satisfied.
    pub fn request(&mut self, requester: PartId, amount: u32) -> ResourceResult<RequestOutcome> {
        if amount > self.capacity {
            return Err(ResourceError::ExceedsCapacity {
                pool: self.id,
                amount,
                capacity: self.capacity,
            });
        }
        if self.available >= amount {
            self.waiting.retain(|&(r, _)| r != requester);
            self.grant(requester, amount);
            return Ok(RequestOutcome::Granted);
        }
        if !self.waiting.iter().any(|&(r, _)| r == requester) {
            self.waiting.push_back((requester, amount));
        }
        Ok(RequestOutcome::Pending)
    }

    /// Return `amount` units held by `requester` and serve the wait list.
    ///
    /// `busy_hours` is the time the units were in use; it is accumulated
    /// per unit for utilization.  Returns the head waiter if its request
    /// now fits; it holds its grant from here on.
    pub fn release(
        &mut self,
        requester: PartId,
        amount: u32,
        busy_hours: f64,
    ) -> ResourceResult<Option<PartId>> {
        let held = self.grants.get(&requester).copied().unwrap_or(0);
        if amount > held {
            return Err(ResourceError::NotHeld { pool: self.id, requester, amount, held });
        }
        if amount == held {
            self.grants.remove(&requester);
        } else {
            self.grants.insert(requester, held - amount);
        }
        self.available = (self.available + amount).min(self.capacity);
        self.busy_hours += busy_hours.max(0.0) * f64::from(amount);

        let Some(&(next, want)) = self.waiting.front() else {
            return Ok(None);
        };
        if self.available < want {
            return Ok(None);
        }
        self.waiting.pop_front();
        self.grant(next, want);
        Ok(Some(next))
    }

    fn grant(&mut self, requester: PartId, amount: u32) {
        self.available -= amount;
        *self.grants.entry(requester).or_insert(0) += amount;
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    /// Units currently granted and not yet released.
    pub fn outstanding(&self) -> u32 {
        self.grants.values().sum()
    }

    pub fn holds(&self, requester: PartId) -> bool {
        self.grants.contains_key(&requester)
    }

    /// Requesters in the wait list, head first.
    pub fn waiting(&self) -> impl Iterator<Item = PartId> + '_ {
        self.waiting.iter().map(|&(r, _)| r)
    }

    pub fn busy_hours(&self) -> f64 {
        self.busy_hours
    }

    /// Busy unit-hours as a fraction of `paid_hours × capacity`.
    pub fn utilization(&self, paid_hours: f64) -> f64 {
        let denom = paid_hours * f64::from(self.capacity);
        if denom > 0.0 { self.busy_hours / denom } else { 0.0 }
    }

    /// Restore the initial state, keeping the configuration.
    pub fn reset(&mut self) {
        self.available = self.capacity;
        self.waiting.clear();
        self.grants.clear();
        self.busy_hours = 0.0;
    }
}
