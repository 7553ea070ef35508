//! Unit tests for ls-config.

#[cfg(test)]
mod fixtures {
    /// Buffer → two drilling stations → end buffer, one worker pool, one
    /// tool pool on the last hop, a day shift.
    pub const LINE: &str = r#"{
        "config": {
            "stations": [
                { "id": "st_a", "name": "Drill A", "type": "wiercenie", "capacity": 1,
                  "allowedOps": [ { "id": "op1", "name": "Drill", "time": 0.5, "operators": 1 } ] },
                { "id": "st_b", "type": "Montaz", "capacity": 2,
                  "allowedOps": [ { "id": "op9", "time": 1, "montaz": "1" } ],
                  "variance": 10, "failureProb": 5 }
            ],
            "buffers": [
                { "id": "buf_in", "name": "In", "capacity": 20, "isStartBuffer": true,
                  "allowedProductTypes": ["casings_S1_M1"] },
                { "id": "buf_out", "capacity": 50, "isEndBuffer": true }
            ],
            "workerPools": [ { "id": "wp", "name": "Fitters", "capacity": 2, "speed": 1.2, "costPerHour": 40 } ],
            "toolPools":   [ { "id": "tp", "name": "Cart", "capacity": 1, "assignedFlows": ["f3"] } ],
            "flows": [
                { "id": "f1", "from": "buf_in", "to": "st_a", "distance": 10 },
                { "id": "f2", "from": "st_a", "to": "st_b", "distance": 5 },
                { "id": "f3", "from": "st_b", "to": "buf_out", "distance": 36 }
            ],
            "workerFlows": [ { "from": "wp", "to": "st_a", "distance": 18 } ],
            "routings": {
                "casings_S1_M1_phase0": [ { "id": "op1", "time": 0.5 } ]
            }
        },
        "orders": [
            { "id": "ZL/1", "orderString": "M1-LR", "size": "S1",
              "orderDate": "19-11-2025", "dueDate": "2025-11-18" },
            { "orderString": "M1", "size": "S1", "orderDate": "20-11-2025" },
            { "id": "broken", "orderString": "M1", "size": "S1", "orderDate": "soon" },
            { "id": "nosize", "orderString": "M1", "orderDate": "20-11-2025" }
        ],
        "settings": {
            "startDate": "18-11-2025",
            "shifts": { "day": { "active": true, "days": 5, "start": "06:00", "end": "14:00" } },
            "qualitySettings": { "S1": { "baseTime": 0.2, "functionTimes": { "L": 0.05, "R": 0.1 } } },
            "assemblySequence": ["M1", "L", "R"],
            "targetTakt": 30
        }
    }"#;
}

#[cfg(test)]
mod validate {
    use ls_core::{BufferId, NodeRef, PoolId, StationId};
    use ls_model::PoolKind;

    use super::fixtures::LINE;
    use crate::{ConfigError, Scenario, SimRequest, StationKind, validate};

    #[test]
    fn interns_and_links() {
        let sc = Scenario::from_json(LINE).unwrap();
        let line = &sc.line;
        assert_eq!(line.stations.len(), 2);
        assert_eq!(line.station(StationId(0)).name, "Drill A");
        assert_eq!(line.station(StationId(1)).name, "st_b");
        assert_eq!(line.station(StationId(1)).kind, StationKind::Assembly);
        assert!(line.station(StationId(1)).is_assembly());
        assert!(!line.station(StationId(0)).is_assembly());

        let out = line.outgoing(NodeRef::Buffer(BufferId(0)));
        assert_eq!(out.len(), 1);
        assert_eq!(line.flow(out[0]).to, NodeRef::Station(StationId(0)));
        assert_eq!(line.incoming(NodeRef::Station(StationId(1))).len(), 1);

        let last = line.flow_between(NodeRef::Station(StationId(1)), NodeRef::Buffer(BufferId(1))).unwrap();
        assert_eq!(last.tool, Some(PoolId(1)));
        assert_eq!(line.pool(PoolId(1)).kind, PoolKind::Tool);

        let wf = line.worker_flow(StationId(0)).unwrap();
        assert_eq!((wf.pool, wf.distance), (PoolId(0), 18.0));
        assert!(line.worker_flow(StationId(1)).is_none());

        assert_eq!(line.start_buffer_for("casings_S1_M1"), Some(BufferId(0)));
        // Falls back to any start buffer.
        assert_eq!(line.start_buffer_for("functions_S1_L"), Some(BufferId(0)));
        assert!(line.routing("casings_S1_M1_phase0").is_some());
        assert!(!line.calendar.is_continuous());
    }

    #[test]
    fn operations_and_settings() {
        let sc = Scenario::from_json(LINE).unwrap();
        let op = &sc.line.station(StationId(1)).allowed_ops[0];
        assert!(op.assembly);
        assert_eq!(op.operators, 1);
        assert_eq!(op.name, "op9");

        let s = &sc.settings;
        assert_eq!(s.target_takt_minutes, 30.0);
        assert_eq!(s.backpressure_factor, 2.0);
        assert_eq!(s.max_events, 800_000);
        assert_eq!(s.assembly_sequence, vec!["M1", "L", "R"]);
        let rule = &s.quality_rules["S1"];
        assert!((rule.time_for(["L", "R", "X"]) - 0.35).abs() < 1e-12);
    }

    #[test]
    fn orders_are_converted_and_filtered() {
        let sc = Scenario::from_json(LINE).unwrap();
        assert_eq!(sc.orders.len(), 2);

        let first = &sc.orders[0];
        assert_eq!(first.name, "ZL/1");
        assert_eq!(first.arrival, 24.0);
        // Due before arrival is pushed to arrival + 24 h.
        assert_eq!(first.due, Some(48.0));

        let second = &sc.orders[1];
        assert_eq!(second.name, "2. S1");
        assert_eq!(second.arrival, 48.0);
        assert_eq!(second.due, None);
    }

    #[test]
    fn unknown_flow_end_is_rejected() {
        let text = LINE.replace(r#""to": "st_b", "distance": 5"#, r#""to": "st_x", "distance": 5"#);
        let err = Scenario::from_json(&text).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNode { ref node, .. } if node == "st_x"));
    }

    #[test]
    fn duplicate_node_is_rejected() {
        let text = LINE.replace(r#""id": "buf_out""#, r#""id": "st_a""#);
        assert!(matches!(Scenario::from_json(&text), Err(ConfigError::DuplicateId { .. })));
    }

    #[test]
    fn zero_capacity_station_is_rejected() {
        let text = LINE.replace(r#""type": "wiercenie", "capacity": 1"#, r#""type": "wiercenie", "capacity": 0"#);
        assert!(matches!(Scenario::from_json(&text), Err(ConfigError::ZeroCapacity { .. })));
    }

    #[test]
    fn bad_shift_is_rejected() {
        let text = LINE.replace(r#""end": "14:00""#, r#""end": "14:75""#);
        assert!(matches!(Scenario::from_json(&text), Err(ConfigError::Shift(_))));
    }

    #[test]
    fn orders_need_a_start_buffer() {
        let text = LINE.replace(r#""isStartBuffer": true"#, r#""isStartBuffer": false"#);
        assert!(matches!(Scenario::from_json(&text), Err(ConfigError::NoStartBuffer)));
    }

    #[test]
    fn empty_request_uses_defaults() {
        let req = SimRequest::from_json(r#"{ "config": {} }"#).unwrap();
        let sc = validate(&req).unwrap();
        assert!(sc.line.stations.is_empty());
        assert!(sc.orders.is_empty());
        assert!(sc.line.calendar.is_continuous());
        assert_eq!(sc.settings.wip_sample_hours, 1.0);
    }

    #[test]
    fn bad_settings_are_rejected() {
        let req = SimRequest::from_json(r#"{ "config": {}, "settings": { "backpressureFactor": 0 } }"#).unwrap();
        assert!(matches!(validate(&req), Err(ConfigError::Setting { .. })));
        let req = SimRequest::from_json(r#"{ "config": {}, "settings": { "repairHours": [2, 1] } }"#).unwrap();
        assert!(matches!(validate(&req), Err(ConfigError::Setting { .. })));
    }
}

#[cfg(test)]
mod raw {
    use crate::SimRequest;

    #[test]
    fn montaz_flag_accepts_loose_values() {
        let req = SimRequest::from_json(
            r#"{ "config": { "routings": { "k": [
                { "id": "a", "montaz": 1 },
                { "id": "b", "montaz": "1" },
                { "id": "c", "montaz": true },
                { "id": "d", "montaz": "0" },
                { "id": "e", "montaz": null },
                { "id": "f" }
            ] } } }"#,
        )
        .unwrap();
        let flags: Vec<bool> = req.config.routings["k"].iter().map(|o| o.montaz).collect();
        assert_eq!(flags, vec![true, true, true, false, false, false]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SimRequest::from_json("{ not json").is_err());
    }
}

#[cfg(test)]
mod date {
    use chrono::NaiveDate;

    use crate::date::{hours_since, parse_date};

    #[test]
    fn both_formats() {
        let d = NaiveDate::from_ymd_opt(2025, 11, 18).unwrap();
        assert_eq!(parse_date("18-11-2025").unwrap(), d);
        assert_eq!(parse_date("2025-11-18").unwrap(), d);
        assert!(parse_date("11/18/2025").is_err());
    }

    #[test]
    fn hours_between_dates() {
        let a = parse_date("18-11-2025").unwrap();
        let b = parse_date("21-11-2025").unwrap();
        assert_eq!(hours_since(a, b), 72.0);
        assert_eq!(hours_since(b, a), -72.0);
    }
}

#[cfg(test)]
mod kinds {
    use crate::StationKind;

    #[test]
    fn station_type_classification() {
        assert_eq!(StationKind::from_type("Podmontaz"), StationKind::SubAssembly);
        assert_eq!(StationKind::from_type("montaz"), StationKind::Assembly);
        assert_eq!(StationKind::from_type("Kontrola jakosci"), StationKind::Quality);
        assert_eq!(StationKind::from_type("pakowanie"), StationKind::Packing);
        assert_eq!(StationKind::from_type("cnc"), StationKind::Standard);
    }
}
