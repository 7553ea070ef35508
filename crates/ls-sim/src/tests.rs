//! Integration tests for ls-sim.

use ls_config::Scenario;
use serde_json::{Value, json};

use crate::{NoopObserver, SimBuilder, SimReport};

// ── Helpers ───────────────────────────────────────────────────────────────────

const START: &str = "18-11-2025";

fn all_day() -> Value {
    json!({ "all": { "active": true, "days": 7, "start": "00:00", "end": "24:00" } })
}

fn order(id: &str, bom: &str) -> Value {
    json!({ "id": id, "orderString": bom, "size": "S1", "orderDate": START })
}

/// Start buffer → one station, no exit.  Parts finish at the station.
fn single_station(op_hours: f64) -> Value {
    json!({
        "config": {
            "stations": [ { "id": "st1", "type": "cnc", "capacity": 1,
                            "allowedOps": [ { "id": "op1", "time": op_hours } ] } ],
            "buffers":  [ { "id": "in", "capacity": 10, "isStartBuffer": true } ],
            "flows":    [ { "id": "f1", "from": "in", "to": "st1", "distance": 0 } ],
            "routings": { "casings_S1_M1_phase0": [ { "id": "op1", "time": op_hours } ] }
        },
        "orders":   [ order("A", "M1") ],
        "settings": { "startDate": START, "shifts": all_day() }
    })
}

fn scenario(v: &Value) -> Scenario {
    Scenario::from_json(&v.to_string()).unwrap()
}

fn run(v: &Value) -> SimReport {
    SimBuilder::from_scenario(scenario(v)).build().unwrap().run(&mut NoopObserver).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Single station ────────────────────────────────────────────────────────────

#[cfg(test)]
mod single_station_tests {
    use super::*;

    #[test]
    fn one_part_two_hours() {
        let report = run(&single_station(2.0));
        assert_eq!(report.produced, 1);
        assert!(close(report.end.hours(), 2.0));
        assert!(close(report.avg_lead_time, 2.0));
        assert!(close(report.working_hours, 2.0));

        let st = &report.stations[0];
        assert_eq!(st.operations, 1);
        assert!(close(st.utilization_pct, 100.0));
        assert!(close(st.starvation_pct, 0.0));
        assert!(close(report.flow_efficiency_pct, 100.0));
        assert!(close(report.actual_takt_hours, 2.0));
        assert!(close(report.energy_cost, 1.0));
    }

    #[test]
    fn idle_station_starves_until_the_order_arrives() {
        let mut v = single_station(2.0);
        v["orders"][0]["orderDate"] = json!("19-11-2025");
        v["settings"]["shifts"] = json!({});
        let report = run(&v);

        assert!(close(report.end.hours(), 26.0));
        let st = &report.stations[0];
        assert!(close(st.starvation_pct, 24.0 / 26.0 * 100.0));
        assert!(close(st.utilization_pct, 2.0 / 26.0 * 100.0));
        assert!(st.blocked_pct < 1e-6);
    }

    #[test]
    fn work_spans_shift_boundaries() {
        let mut v = single_station(10.0);
        v["settings"]["shifts"] =
            json!({ "day": { "active": true, "days": 7, "start": "06:00", "end": "14:00" } });
        let report = run(&v);

        // Released at 06:00, 8 h on day one, 2 h from 06:00 on day two.
        assert!(close(report.end.hours(), 32.0));
        assert!(close(report.avg_lead_time, 26.0));
        assert!(close(report.working_hours, 10.0));
        assert!(close(report.stations[0].utilization_pct, 100.0));
    }

    #[test]
    fn quality_station_uses_size_rule() {
        let mut v = single_station(2.0);
        v["config"]["stations"][0]["type"] = json!("Kontrola jakosci");
        v["settings"]["qualitySettings"] = json!({ "S1": { "baseTime": 0.5 } });
        let report = run(&v);
        assert!(close(report.end.hours(), 0.5));
    }

    #[test]
    fn remaining_operation_without_exit_blocks_the_part() {
        let mut v = single_station(1.0);
        v["config"]["routings"]["casings_S1_M1_phase0"] =
            json!([ { "id": "op1", "time": 1 }, { "id": "op2", "time": 1 } ]);
        let report = run(&v);
        assert_eq!(report.produced, 0);
        assert_eq!(report.wip_final, 1);
        assert_eq!(report.orders[0].components.todo, vec!["M1".to_owned()]);
    }

    #[test]
    fn certain_scrap_scraps_every_part() {
        let mut v = single_station(1.0);
        v["config"]["stations"][0]["scrapRate"] = json!(100);
        v["orders"][0]["dueDate"] = json!("19-11-2025");
        let report = run(&v);
        assert_eq!(report.produced, 0);
        assert_eq!(report.scrapped, 1);
        assert_eq!(report.stations[0].scrapped, 1);
        assert_eq!(report.orders[0].status, crate::OrderStatus::Scrapped);
    }
}

// ── Run errors ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_errors {
    use super::*;
    use crate::SimError;

    #[test]
    fn no_active_shift() {
        let mut v = single_station(1.0);
        v["settings"]["shifts"] =
            json!({ "day": { "active": false, "start": "06:00", "end": "14:00" } });
        let err = SimBuilder::from_scenario(scenario(&v)).build().unwrap().run(&mut NoopObserver);
        assert!(matches!(err, Err(SimError::NoActiveShift)));
    }

    #[test]
    fn event_cap() {
        let mut sim = SimBuilder::from_scenario(scenario(&single_station(1.0)))
            .max_events(2)
            .build()
            .unwrap();
        assert!(matches!(sim.run(&mut NoopObserver), Err(SimError::EventCapExceeded { cap: 2, .. })));
    }

    #[test]
    fn no_orders_is_nothing_to_simulate() {
        let mut v = single_station(1.0);
        v["orders"] = json!([]);
        let err = SimBuilder::from_scenario(scenario(&v)).build().unwrap().run(&mut NoopObserver);
        assert!(matches!(err, Err(SimError::NothingToSimulate)));
    }

    #[test]
    fn builder_rejects_bad_settings() {
        let sc = scenario(&single_station(1.0));
        assert!(SimBuilder::from_scenario(sc.clone()).backpressure_factor(0.0).build().is_err());
        assert!(SimBuilder::from_scenario(sc).max_events(0).build().is_err());
    }

    #[test]
    fn unstaffable_operation_blocks_instead_of_failing() {
        let mut v = single_station(1.0);
        v["config"]["workerPools"] = json!([ { "id": "wp", "capacity": 1 } ]);
        v["config"]["workerFlows"] = json!([ { "from": "wp", "to": "st1", "distance": 0 } ]);
        v["config"]["routings"]["casings_S1_M1_phase0"] = json!([ { "id": "op1", "time": 1, "operators": 2 } ]);
        let report = run(&v);
        assert_eq!(report.produced, 0);
        assert_eq!(report.wip_final, 1);
    }
}

// ── Routing between parallel stations ─────────────────────────────────────────

#[cfg(test)]
mod balancing {
    use super::*;

    fn two_stations(orders: usize) -> Value {
        let orders: Vec<Value> = (0..orders).map(|i| order(&format!("Z{i}"), "M1")).collect();
        json!({
            "config": {
                "stations": [
                    { "id": "st_a", "allowedOps": [ { "id": "op1", "time": 1 } ] },
                    { "id": "st_b", "allowedOps": [ { "id": "op1", "time": 1 } ] }
                ],
                "buffers":  [ { "id": "in", "capacity": 20, "isStartBuffer": true } ],
                "flows":    [ { "from": "in", "to": "st_a" }, { "from": "in", "to": "st_b" } ],
                "routings": { "casings_S1_M1_phase0": [ { "id": "op1", "time": 1 } ] }
            },
            "orders":   orders,
            "settings": { "startDate": START }
        })
    }

    #[test]
    fn equal_stations_share_the_work() {
        let report = run(&two_stations(10));
        let (a, b) = (report.stations[0].operations, report.stations[1].operations);
        assert_eq!(a + b, 10);
        assert!(a.abs_diff(b) <= 1, "a={a} b={b}");
        assert_eq!(report.produced, 10);
        assert!(close(report.end.hours(), 5.0));
    }

    #[test]
    fn backpressure_holds_parts_in_the_buffer() {
        let report = run(&two_stations(10));
        // Two per station in flight at most: the buffer keeps the rest.
        assert!(report.buffers[0].max_queue >= 6);
        assert!(report.stations.iter().all(|s| s.max_queue <= 2));
    }
}

// ── Worker and tool pools ─────────────────────────────────────────────────────

#[cfg(test)]
mod pools {
    use ls_core::PartId;

    use super::*;

    fn three_stations_two_workers() -> Value {
        let stations: Vec<Value> = ["st_a", "st_b", "st_c"]
            .iter()
            .map(|id| json!({ "id": id, "allowedOps": [ { "id": "op1", "time": 1 } ] }))
            .collect();
        json!({
            "config": {
                "stations": stations,
                "buffers":  [ { "id": "in", "isStartBuffer": true } ],
                "flows": [
                    { "from": "in", "to": "st_a" },
                    { "from": "in", "to": "st_b" },
                    { "from": "in", "to": "st_c" }
                ],
                "workerPools": [ { "id": "wp", "capacity": 2, "costPerHour": 10 } ],
                "workerFlows": [
                    { "from": "wp", "to": "st_a" },
                    { "from": "wp", "to": "st_b" },
                    { "from": "wp", "to": "st_c" }
                ],
                "routings": { "casings_S1_M1_phase0": [ { "id": "op1", "time": 1 } ] }
            },
            "orders":   [ order("A", "M1"), order("B", "M1"), order("C", "M1") ],
            "settings": { "startDate": START }
        })
    }

    #[test]
    fn third_operation_waits_for_a_worker() {
        let scenario = scenario(&three_stations_two_workers());
        let mut sim = SimBuilder::from_scenario(scenario).build().unwrap();
        let report = sim.run(&mut NoopObserver).unwrap();

        assert_eq!(report.produced, 3);
        assert!(close(report.end.hours(), 2.0));
        let pool = &report.pools[0];
        assert!(close(pool.busy_hours, 3.0));
        assert!(close(pool.utilization_pct, 75.0));
        assert!(close(pool.labour_cost, 30.0));
        assert!(close(pool.attendance_cost, 40.0));

        let waited: Vec<f64> = sim.parts().iter().map(|p| p.durations.wait).collect();
        assert_eq!(waited.iter().filter(|w| close(**w, 1.0)).count(), 1);
        assert_eq!(waited.iter().filter(|w| close(**w, 0.0)).count(), 2);
        assert_eq!(sim.pools()[0].outstanding(), 0);
    }

    fn tool_on_exit() -> Value {
        json!({
            "config": {
                "stations": [ { "id": "st", "allowedOps": [ { "id": "op1", "time": 1 } ] } ],
                "buffers":  [
                    { "id": "in", "isStartBuffer": true },
                    { "id": "out", "isEndBuffer": true }
                ],
                "flows": [
                    { "id": "f1", "from": "in", "to": "st" },
                    { "id": "f2", "from": "st", "to": "out", "distance": 14400 }
                ],
                "toolPools": [ { "id": "cart", "capacity": 1, "speed": 2, "assignedFlows": ["f2"] } ],
                "routings": { "casings_S1_M1_phase0": [ { "id": "op1", "time": 1 } ] }
            },
            "orders":   [ order("A", "M1"), order("B", "M1") ],
            "settings": { "startDate": START }
        })
    }

    #[test]
    fn second_move_waits_for_the_tool() {
        let mut sim = SimBuilder::from_scenario(scenario(&tool_on_exit())).build().unwrap();
        let report = sim.run(&mut NoopObserver).unwrap();

        // 14 400 m at 2 m/s is two hours per move.
        assert!(close(report.end.hours(), 5.0));
        assert_eq!(report.produced, 2);
        assert_eq!(report.buffers[1].received, 2);
        assert!(close(report.pools[0].busy_hours, 4.0));

        let second = sim.parts().get(PartId(1)).unwrap();
        assert!(close(second.durations.wait, 2.0));
        assert!(close(second.durations.transport, 2.0));
        assert!(close(second.durations.processing, 1.0));
    }

    #[test]
    fn finished_parts_account_for_every_hour() {
        for v in [three_stations_two_workers(), tool_on_exit()] {
            let mut sim = SimBuilder::from_scenario(scenario(&v)).build().unwrap();
            sim.run(&mut NoopObserver).unwrap();
            for p in sim.parts().iter() {
                let lead = p.lead_time().unwrap();
                assert!((p.durations.total() - lead).abs() < 1e-9, "part {}", p.id);
            }
        }
    }
}

// ── Assembly ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod assembly_line {
    use ls_core::{BufferId, PartId, StationId};
    use ls_model::PartState;

    use super::*;

    fn kit_line() -> Value {
        json!({
            "config": {
                "stations": [ { "id": "asm", "type": "Montaz", "allowedOps": [
                    { "id": "asm1", "time": 1, "montaz": 1 },
                    { "id": "lop", "time": 0.5 }
                ] } ],
                "buffers": [
                    { "id": "in", "isStartBuffer": true },
                    { "id": "out", "isEndBuffer": true }
                ],
                "flows": [ { "from": "in", "to": "asm" }, { "from": "asm", "to": "out" } ],
                "routings": {
                    "casings_S1_M1_phase1":   [ { "id": "asm1", "time": 1 } ],
                    "functions_S1_L_phase1":  [ { "id": "lop", "time": 0.5 } ]
                }
            },
            "orders":   [ order("A", "M1-LR") ],
            "settings": { "startDate": START, "assemblySequence": ["M1", "L", "R"] }
        })
    }

    #[test]
    fn complete_kit_is_assembled_and_finished() {
        let mut sim = SimBuilder::from_scenario(scenario(&kit_line())).build().unwrap();
        let report = sim.run(&mut NoopObserver).unwrap();

        assert_eq!(report.parts_created, 3);
        assert_eq!(report.produced, 1);
        assert!(close(report.end.hours(), 1.5));
        assert_eq!(report.stations[0].operations, 2);

        let parent = sim.parts().iter().find(|p| p.code == "M1").unwrap();
        let codes: Vec<&str> = parent.attached.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["L", "R"]);
        assert!(
            sim.parts()
                .iter()
                .filter(|p| p.code != "M1")
                .all(|p| p.state() == PartState::Assembled)
        );

        let o = &report.orders[0];
        assert_eq!(o.status, crate::OrderStatus::NoDueDate);
        assert_eq!(o.components.ready.len(), 3);
        assert_eq!(o.parts_total, 3);
    }

    #[test]
    fn kit_missing_a_child_never_starts() {
        let mut v = kit_line();
        v["config"]["buffers"] = json!([
            { "id": "in", "isStartBuffer": true,
              "allowedProductTypes": ["casings_S1_M1", "functions_S1_L"] },
            { "id": "out", "isEndBuffer": true },
            { "id": "side", "isStartBuffer": true, "allowedProductTypes": ["functions_S1_R"] }
        ]);
        let report = run(&v);
        assert_eq!(report.produced, 0);
        assert_eq!(report.stations[0].operations, 0);
        assert_eq!(report.buffers[0].received, 2);
        assert_eq!(report.buffers[2].received, 1);
        assert_eq!(report.wip_final, 3);
    }

    #[test]
    fn children_are_consumed_once_across_orders() {
        let mut v = kit_line();
        v["config"]["stations"][0]["capacity"] = json!(2);
        let mut orders: Vec<Value> = ["A", "B", "C", "D", "E"].iter().map(|id| order(id, "M1-LR")).collect();
        orders.push(order("F", "M1-L"));
        orders.push(order("G", "M1-L"));
        v["orders"] = json!(orders);

        let mut sim = SimBuilder::from_scenario(scenario(&v)).build().unwrap();
        let report = sim.run(&mut NoopObserver).unwrap();
        assert_eq!(report.parts_created, 19);
        assert_eq!(report.produced, 7);

        // No part sits in two queues, and no consumed child sits in any.
        let mut queued: Vec<PartId> = Vec::new();
        for b in 0..sim.line().buffers.len() {
            queued.extend(sim.buffer_state(BufferId(b as u32)).queue.iter().copied());
        }
        for s in 0..sim.line().stations.len() {
            queued.extend(sim.station_state(StationId(s as u32)).queue.iter().copied());
        }
        let mut unique = queued.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), queued.len());

        let parts = sim.parts();
        let mut consumed: Vec<PartId> = Vec::new();
        for parent in parts.iter().filter(|p| p.code == "M1") {
            assert_eq!(parent.state(), PartState::Finished);
            assert_eq!(parent.attached.len(), parent.bom.len());
            for child in &parent.attached {
                assert_eq!(parts[child.id].order, parent.order);
                assert_eq!(parts[child.id].code, child.code);
                consumed.push(child.id);
            }
        }
        assert_eq!(consumed.len(), 12);
        let mut distinct = consumed.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), consumed.len());

        for id in consumed {
            assert_eq!(parts[id].state(), PartState::Assembled);
            assert!(!queued.contains(&id));
        }
    }
}

// ── Observer, determinism, replications ───────────────────────────────────────

#[cfg(test)]
mod observing {
    use super::*;
    use crate::{ReplayEvent, SimObserver, StationStatus, WipSample, run_replications, summarize};

    #[derive(Default)]
    struct Recorder {
        started:  usize,
        replay:   Vec<ReplayEvent>,
        wip:      Vec<WipSample>,
        finished: bool,
    }

    impl SimObserver for Recorder {
        fn on_sim_start(&mut self, orders: usize) {
            self.started = orders;
        }

        fn on_replay(&mut self, event: &ReplayEvent) {
            self.replay.push(event.clone());
        }

        fn on_wip_sample(&mut self, sample: WipSample) {
            self.wip.push(sample);
        }

        fn on_sim_end(&mut self, _report: &SimReport) {
            self.finished = true;
        }
    }

    #[test]
    fn observer_sees_the_whole_run() {
        let mut rec = Recorder::default();
        let mut sim = SimBuilder::from_scenario(scenario(&single_station(2.0))).build().unwrap();
        let report = sim.run(&mut rec).unwrap();

        assert_eq!(rec.started, 1);
        assert!(rec.finished);
        assert_eq!(rec.wip, report.wip);
        let counts: Vec<usize> = rec.wip.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![0, 1]);

        let has = |f: &dyn Fn(&ReplayEvent) -> bool| rec.replay.iter().any(f);
        assert!(has(&|e| matches!(e, ReplayEvent::BufferState { count: 1, .. })));
        assert!(has(&|e| matches!(e, ReplayEvent::Transport { .. })));
        assert!(has(&|e| matches!(e, ReplayEvent::StationState { status: StationStatus::Run, work: Some(_), .. })));
        assert!(has(&|e| matches!(e, ReplayEvent::StationState { status: StationStatus::Idle, .. })));
        assert!(rec.replay.windows(2).all(|w| w[0].time() <= w[1].time()));
    }

    fn noisy() -> Value {
        let mut v = single_station(1.0);
        v["config"]["stations"][0]["variance"] = json!(20);
        v["config"]["stations"][0]["failureProb"] = json!(30);
        v["orders"] = json!((0..8).map(|i| order(&format!("Z{i}"), "M1")).collect::<Vec<_>>());
        v
    }

    #[test]
    fn same_seed_same_report() {
        let sc = scenario(&noisy());
        let mut a = SimBuilder::from_scenario(sc.clone()).seed(7).build().unwrap();
        let mut b = SimBuilder::from_scenario(sc).seed(7).build().unwrap();
        let first = a.run(&mut NoopObserver).unwrap();
        assert_eq!(first, b.run(&mut NoopObserver).unwrap());
        // Re-running resets all state.
        assert_eq!(first, a.run(&mut NoopObserver).unwrap());
    }

    #[test]
    fn replications_run_per_seed() {
        let reports = run_replications(&scenario(&noisy()), &[1, 2, 3]);
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.as_ref().is_ok_and(|r| r.produced == 8)));
        let (mean, sd) = summarize(&reports, |r| r.produced as f64).unwrap();
        assert!(close(mean, 8.0));
        assert!(close(sd, 0.0));
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router_tests {
    use ls_core::{FlowId, StationId};

    use crate::router::{Candidate, FULL_PENALTY, RouteDecision, choose};

    fn cand(i: u32, busy: u32, queued: usize, incoming: u32) -> Candidate {
        Candidate { flow: FlowId(i), station: StationId(i), capacity: 1, busy, queued, incoming }
    }

    #[test]
    fn full_station_loses_to_free_one() {
        let full = cand(0, 1, 0, 0);
        assert_eq!(full.score(), FULL_PENALTY);
        let mut rot = 0;
        assert_eq!(choose(&[full, cand(1, 0, 1, 0)], &mut rot, 2.0), RouteDecision::Push(1));
    }

    #[test]
    fn ties_rotate() {
        let cs = [cand(0, 0, 0, 0), cand(1, 0, 0, 0)];
        let mut rot = 0;
        let picks: Vec<_> = (0..4).map(|_| choose(&cs, &mut rot, 2.0)).collect();
        use RouteDecision::Push;
        assert_eq!(picks, vec![Push(0), Push(1), Push(0), Push(1)]);
    }

    #[test]
    fn saturated_best_is_held() {
        let mut rot = 0;
        assert_eq!(choose(&[cand(0, 1, 1, 1)], &mut rot, 2.0), RouteDecision::Hold(0));
        assert_eq!(rot, 0);
        assert_eq!(choose(&[], &mut rot, 2.0), RouteDecision::Nowhere);
    }

    proptest::proptest! {
        /// M pushes over N equally loaded stations land M/N ± 1 on each.
        #[test]
        fn equal_candidates_share_evenly(n in 1u32..8, m in 0usize..500, start in 0usize..16) {
            let cs: Vec<_> = (0..n).map(|i| cand(i, 0, 0, 0)).collect();
            let mut rot = start;
            let mut counts = vec![0usize; n as usize];
            for _ in 0..m {
                match choose(&cs, &mut rot, 2.0) {
                    RouteDecision::Push(i) => counts[i] += 1,
                    other => proptest::prop_assert!(false, "unexpected {:?}", other),
                }
            }
            let lo = m / n as usize;
            for c in counts {
                proptest::prop_assert!(c == lo || c == lo + 1);
            }
        }
    }
}

// ── Kit matching ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod kits {
    use std::sync::Arc;

    use ls_config::Line;
    use ls_core::{BufferId, OrderId, PartId, SimTime};
    use ls_model::{AttachedChild, NewPart, Operation, PartKind, PartStore, Routing};
    use ls_schedule::ShiftCalendar;
    use rustc_hash::FxHashMap;

    use crate::assembly::{Kit, assembled_routing, find_kit};
    use crate::state::BufferState;

    fn add(parts: &mut PartStore, order: u32, kind: PartKind, code: &str, bom: &[&str]) -> PartId {
        parts.create(NewPart {
            order:   OrderId(order),
            kind,
            code:    code.into(),
            size:    "S1".into(),
            routing: Arc::from(Vec::new()),
            bom:     bom.iter().map(|s| s.to_string()).collect(),
            created: SimTime::ZERO,
            due:     None,
        })
    }

    fn buffer(ids: &[PartId]) -> BufferState {
        let mut b = BufferState::default();
        b.queue.extend(ids.iter().copied());
        b
    }

    #[test]
    fn children_come_from_the_same_order_and_any_input() {
        let mut parts = PartStore::new();
        let parent = add(&mut parts, 0, PartKind::Parent, "M1", &["L", "L"]);
        let foreign = add(&mut parts, 1, PartKind::Child, "L", &[]);
        let own_a = add(&mut parts, 0, PartKind::Child, "L", &[]);
        let own_b = add(&mut parts, 0, PartKind::Child, "L", &[]);
        let buffers = vec![buffer(&[parent, foreign, own_a]), buffer(&[own_b])];
        let inputs = [BufferId(0), BufferId(1)];

        let kit = find_kit(&inputs, &buffers, &parts).unwrap();
        assert_eq!(
            kit,
            Kit { parent: (parent, BufferId(0)), children: vec![(own_a, BufferId(0)), (own_b, BufferId(1))] }
        );

        // Without the second own child the kit is incomplete.
        let buffers = vec![buffer(&[parent, foreign, own_a]), buffer(&[])];
        assert!(find_kit(&inputs, &buffers, &parts).is_none());
    }

    #[test]
    fn first_complete_parent_wins() {
        let mut parts = PartStore::new();
        let waiting = add(&mut parts, 0, PartKind::Parent, "M1", &["R"]);
        let bare = add(&mut parts, 1, PartKind::Parent, "M2", &[]);
        let buffers = vec![buffer(&[waiting, bare])];
        let kit = find_kit(&[BufferId(0)], &buffers, &parts).unwrap();
        assert_eq!(kit.parent, (bare, BufferId(0)));
        assert!(kit.children.is_empty());
    }

    fn op(id: &str) -> Operation {
        Operation { id: id.into(), name: id.into(), time: 1.0, operators: 1, assembly: false }
    }

    #[test]
    fn assembled_routing_follows_sequence_or_attach_order() {
        let mut routings: FxHashMap<String, Routing> = FxHashMap::default();
        routings.insert("casings_S1_M1_phase1".into(), Arc::from(vec![op("base")]));
        routings.insert("functions_S1_L_phase1".into(), Arc::from(vec![op("l1"), op("l2")]));
        routings.insert("functions_S1_R_phase1".into(), Arc::from(vec![op("r1")]));
        let line = Line::new(vec![], vec![], vec![], vec![], vec![], routings, ShiftCalendar::continuous());

        let mut parts = PartStore::new();
        let parent = add(&mut parts, 0, PartKind::Parent, "M1", &["L", "R"]);
        parts[parent].attached = vec![
            AttachedChild { id: PartId(1), code: "L".into() },
            AttachedChild { id: PartId(2), code: "R".into() },
        ];
        let ids = |r: Routing| r.iter().map(|o| o.id.clone()).collect::<Vec<_>>();

        let seq: Vec<String> = ["R", "M1", "X", "L"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids(assembled_routing(&parts[parent], &seq, &line)), vec!["r1", "base", "l1", "l2"]);
        assert_eq!(ids(assembled_routing(&parts[parent], &[], &line)), vec!["base", "l1", "l2", "r1"]);
    }
}
