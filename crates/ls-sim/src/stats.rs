//! End-of-run report.
//!
//! Percentages are 0–100.  Every "per working hour" figure uses
//! `working_hours`, the calendar's working hours from the start to the last
//! event, so a line that only works day shifts is not penalized for nights.

use ls_core::{OrderId, SimTime};
use ls_model::{PartState, PoolKind, StateDurations};

use crate::Sim;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WipSample {
    pub time:  SimTime,
    /// Parts on the line: created and not finished, scrapped or assembled.
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationReport {
    pub key:             String,
    pub name:            String,
    pub kind:            String,
    pub capacity:        u32,
    pub busy_hours:      f64,
    pub utilization_pct: f64,
    pub starvation_pct:  f64,
    /// Whatever is neither busy nor starved, floored at zero.
    pub blocked_pct:     f64,
    pub operations:      u64,
    pub scrapped:        u64,
    pub breakdowns:      usize,
    pub repair_hours:    f64,
    pub max_queue:       usize,
    pub avg_queue:       f64,
    pub energy_cost:     f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferReport {
    pub key:             String,
    pub name:            String,
    pub capacity:        u32,
    pub received:        u64,
    pub max_queue:       usize,
    pub avg_queue:       f64,
    /// Peak occupancy against nominal capacity.
    pub utilization_pct: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolReport {
    pub key:             String,
    pub name:            String,
    pub kind:            PoolKind,
    pub capacity:        u32,
    pub busy_hours:      f64,
    pub utilization_pct: f64,
    /// Paid working hours × capacity × rate.
    pub attendance_cost: f64,
    /// Busy hours × rate.
    pub labour_cost:     f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrderStatus {
    Ok,
    Late,
    Scrapped,
    NoDueDate,
}

/// Component codes of an order grouped by where they are.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentStatus {
    pub processing: Vec<String>,
    pub ready:      Vec<String>,
    pub todo:       Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderReport {
    pub name:           String,
    pub bom:            String,
    pub size:           String,
    pub status:         OrderStatus,
    pub on_time:        Option<bool>,
    pub due:            Option<SimTime>,
    pub start:          SimTime,
    pub end:            SimTime,
    pub duration_hours: f64,
    pub parts_total:    usize,
    pub parts_finished: usize,
    pub parts_scrapped: usize,
    pub components:     ComponentStatus,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimReport {
    /// Time of the last event.
    pub end:                 SimTime,
    pub working_hours:       f64,
    pub events_processed:    u64,
    pub parts_created:       usize,
    pub produced:            usize,
    pub scrapped:            usize,
    /// Parts still on the line when the run ended.
    pub wip_final:           usize,
    pub avg_lead_time:       f64,
    /// Mean hours per lifecycle bucket over finished parts.
    pub lead_time_breakdown: StateDurations,
    pub flow_efficiency_pct: f64,
    /// Working hours per produced part; 0 when nothing was produced.
    pub actual_takt_hours:   f64,
    pub target_takt_hours:   f64,
    /// On-time share of the orders that have a due date.
    pub otif_pct:            f64,
    pub labour_cost:         f64,
    pub attendance_cost:     f64,
    pub energy_cost:         f64,
    pub stations:            Vec<StationReport>,
    pub buffers:             Vec<BufferReport>,
    pub pools:               Vec<PoolReport>,
    pub orders:              Vec<OrderReport>,
    pub wip:                 Vec<WipSample>,
}

fn pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

pub(crate) fn build(sim: &Sim) -> SimReport {
    let working_hours = sim.line.calendar.working_hours(sim.now);
    let energy_rate = sim.settings.energy_cost_per_hour;

    // ── Parts ─────────────────────────────────────────────────────────────
    let mut produced = 0usize;
    let mut scrapped = 0usize;
    let mut lead_sum = 0.0;
    let mut breakdown = StateDurations::default();
    for p in sim.parts.iter() {
        match p.state() {
            PartState::Finished => {
                produced += 1;
                lead_sum += p.lead_time().unwrap_or(0.0);
                breakdown += p.durations;
            }
            PartState::Scrapped => scrapped += 1,
            _ => {}
        }
    }
    let avg_lead_time = if produced > 0 { lead_sum / produced as f64 } else { 0.0 };
    if produced > 0 {
        let n = produced as f64;
        breakdown = StateDurations {
            wait:       breakdown.wait / n,
            processing: breakdown.processing / n,
            transport:  breakdown.transport / n,
            blocked:    breakdown.blocked / n,
        };
    }
    let flow_efficiency_pct = pct(breakdown.processing, breakdown.total());

    // ── Stations ──────────────────────────────────────────────────────────
    let stations: Vec<StationReport> = sim
        .line
        .stations
        .iter()
        .zip(&sim.stations)
        .map(|(spec, st)| {
            let slot_hours = working_hours * f64::from(spec.capacity);
            let utilization_pct = pct(st.busy_hours, slot_hours);
            let starvation_pct = pct(st.starved_hours, slot_hours);
            StationReport {
                key: spec.key.clone(),
                name: spec.name.clone(),
                kind: spec.kind.as_str().to_owned(),
                capacity: spec.capacity,
                busy_hours: st.busy_hours,
                utilization_pct,
                starvation_pct,
                blocked_pct: (100.0 - utilization_pct - starvation_pct).max(0.0),
                operations: st.operations,
                scrapped: st.scrapped,
                breakdowns: st.breakdowns.len(),
                repair_hours: st.breakdowns.iter().map(|b| b.repair_hours).sum(),
                max_queue: st.queue_stats.peak,
                avg_queue: st.queue_stats.mean(),
                energy_cost: st.busy_hours * energy_rate,
            }
        })
        .collect();

    // ── Buffers ───────────────────────────────────────────────────────────
    let buffers = sim
        .line
        .buffers
        .iter()
        .zip(&sim.buffers)
        .map(|(spec, st)| BufferReport {
            key: spec.key.clone(),
            name: spec.name.clone(),
            capacity: spec.capacity,
            received: st.received,
            max_queue: st.queue_stats.peak,
            avg_queue: st.queue_stats.mean(),
            utilization_pct: pct(st.queue_stats.peak as f64, f64::from(spec.capacity)),
        })
        .collect();

    // ── Pools ─────────────────────────────────────────────────────────────
    let pools: Vec<PoolReport> = sim
        .pools
        .iter()
        .zip(&sim.line.pools)
        .map(|(pool, spec)| PoolReport {
            key: spec.key.clone(),
            name: pool.name.clone(),
            kind: pool.kind,
            capacity: pool.capacity,
            busy_hours: pool.busy_hours(),
            utilization_pct: pool.utilization(working_hours) * 100.0,
            attendance_cost: working_hours * f64::from(pool.capacity) * pool.cost_per_hour,
            labour_cost: pool.busy_hours() * pool.cost_per_hour,
        })
        .collect();
    let workers = || pools.iter().filter(|p| p.kind == PoolKind::Worker);
    let labour_cost = workers().map(|p| p.labour_cost).sum();
    let attendance_cost = workers().map(|p| p.attendance_cost).sum();

    // ── Orders ────────────────────────────────────────────────────────────
    let orders: Vec<OrderReport> = (0..sim.book.len())
        .filter_map(|i| order_report(sim, OrderId(i as u32)))
        .collect();
    let with_due: Vec<&OrderReport> = orders.iter().filter(|o| o.due.is_some()).collect();
    let otif_pct = if with_due.is_empty() {
        100.0
    } else {
        pct(with_due.iter().filter(|o| o.on_time == Some(true)).count() as f64, with_due.len() as f64)
    };

    let target_takt_hours = sim.settings.target_takt_minutes / 60.0;
    SimReport {
        end: sim.now,
        working_hours,
        events_processed: sim.processed,
        parts_created: sim.parts.len(),
        produced,
        scrapped,
        wip_final: sim.parts.active_count(),
        avg_lead_time,
        lead_time_breakdown: breakdown,
        flow_efficiency_pct,
        actual_takt_hours: if produced > 0 { working_hours / produced as f64 } else { 0.0 },
        target_takt_hours,
        otif_pct,
        labour_cost,
        attendance_cost,
        energy_cost: stations.iter().map(|s| s.energy_cost).sum(),
        stations,
        buffers,
        pools,
        orders,
        wip: sim.wip.clone(),
    }
}

/// `None` for orders that never produced a part.
fn order_report(sim: &Sim, id: OrderId) -> Option<OrderReport> {
    let record = sim.book.get(id)?;
    let parts: Vec<_> = sim.parts.iter().filter(|p| p.order == id).collect();
    if parts.is_empty() {
        return None;
    }

    let start = parts.iter().map(|p| p.created).min()?;
    let all_done = parts.iter().all(|p| p.state().is_terminal());
    let end = if all_done {
        parts.iter().filter_map(|p| p.finished).max().unwrap_or(sim.now)
    } else {
        sim.now
    };
    let finished = parts.iter().filter(|p| p.state() == PartState::Finished).count();
    let scrapped = parts.iter().filter(|p| p.state() == PartState::Scrapped).count();

    let mut components = ComponentStatus::default();
    for p in &parts {
        let code = p.code.clone();
        match p.state() {
            PartState::Processing | PartState::InTransport | PartState::WaitingForWorkerTravel => {
                components.processing.push(code)
            }
            PartState::IdleInBuffer | PartState::Assembled | PartState::Finished => components.ready.push(code),
            _ => components.todo.push(code),
        }
    }

    let on_time = record.due.map(|due| all_done && end <= due);
    let status = match on_time {
        None => OrderStatus::NoDueDate,
        Some(false) => OrderStatus::Late,
        Some(true) if scrapped > 0 => OrderStatus::Scrapped,
        Some(true) => OrderStatus::Ok,
    };
    Some(OrderReport {
        name: record.name.clone(),
        bom: record.bom.clone(),
        size: record.size.clone(),
        status,
        on_time,
        due: record.due,
        start,
        end,
        duration_hours: end.since(start),
        parts_total: parts.len(),
        parts_finished: finished,
        parts_scrapped: scrapped,
        components,
    })
}
