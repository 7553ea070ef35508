//! Raw request types, deserialized straight from JSON.
//!
//! These mirror the message the planning front end sends: string ids,
//! camelCase keys, most fields optional.  Nothing here is checked beyond
//! JSON shape; [`crate::validate`] turns a [`SimRequest`] into a typed
//! [`crate::Scenario`].
//!
//! ```json
//! {
//!   "config":   { "stations": [...], "buffers": [...], "flows": [...], ... },
//!   "orders":   [ { "id": "ZL/1", "orderString": "M1-LR", "size": "S1",
//!                   "orderDate": "18-11-2025", "dueDate": "20-11-2025" } ],
//!   "settings": { "startDate": "18-11-2025", "shifts": { ... }, ... }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

// ── Top level ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimRequest {
    pub config:   RawLine,
    #[serde(default)]
    pub orders:   Vec<RawOrder>,
    #[serde(default)]
    pub settings: RawSettings,
}

impl SimRequest {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

// ── Line layout ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLine {
    pub stations:     Vec<RawStation>,
    pub buffers:      Vec<RawBuffer>,
    pub worker_pools: Vec<RawPool>,
    pub tool_pools:   Vec<RawPool>,
    pub flows:        Vec<RawFlow>,
    pub worker_flows: Vec<RawWorkerFlow>,
    /// `{type}_{size}_{code}_phase{n}` → operations.
    pub routings:     BTreeMap<String, Vec<RawOperation>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStation {
    pub id:           String,
    #[serde(default)]
    pub name:         String,
    /// Free-form station type, e.g. `"montaz"`, `"jakosci"`, `"pakowanie"`.
    #[serde(rename = "type", default)]
    pub kind:         String,
    #[serde(default = "one")]
    pub capacity:     u32,
    #[serde(default)]
    pub allowed_ops:  Vec<RawOperation>,
    /// Percent.
    #[serde(default)]
    pub variance:     f64,
    /// Percent.
    #[serde(default)]
    pub failure_prob: f64,
    /// Percent.
    #[serde(default)]
    pub scrap_rate:   f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperation {
    pub id:        String,
    #[serde(default)]
    pub name:      String,
    /// Hours.
    #[serde(default)]
    pub time:      f64,
    #[serde(default)]
    pub operators: Option<u32>,
    #[serde(default, deserialize_with = "loose_flag")]
    pub montaz:    bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBuffer {
    pub id:                    String,
    #[serde(default)]
    pub name:                  String,
    #[serde(default = "one")]
    pub capacity:              u32,
    #[serde(default)]
    pub is_start_buffer:       bool,
    #[serde(default)]
    pub is_end_buffer:         bool,
    #[serde(default)]
    pub allowed_product_types: Vec<String>,
}

/// Worker or tool pool; which one depends on the list it appears in.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPool {
    pub id:             String,
    #[serde(default)]
    pub name:           String,
    #[serde(default = "one")]
    pub capacity:       u32,
    /// Metres per second.
    #[serde(default = "unit_speed")]
    pub speed:          f64,
    #[serde(default)]
    pub cost_per_hour:  f64,
    /// Tool pools only: ids of the flows whose moves need one unit.
    #[serde(default)]
    pub assigned_flows: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlow {
    #[serde(default)]
    pub id:       Option<String>,
    pub from:     String,
    pub to:       String,
    /// Metres.
    #[serde(default)]
    pub distance: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWorkerFlow {
    /// Worker pool id.
    pub from:     String,
    /// Station id.
    pub to:       String,
    #[serde(default)]
    pub distance: f64,
}

// ── Orders ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOrder {
    pub id:           Option<String>,
    pub order_string: Option<String>,
    pub size:         Option<String>,
    pub order_date:   Option<String>,
    pub due_date:     Option<String>,
}

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShift {
    #[serde(default = "yes")]
    pub active: bool,
    #[serde(default = "work_week")]
    pub days:   u8,
    pub start:  String,
    pub end:    String,
}

/// Quality/packing time rule for one size.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTimeRule {
    pub base_time:      f64,
    pub function_times: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSettings {
    /// `DD-MM-YYYY` or `YYYY-MM-DD`; hour 0 of the run.
    pub start_date:           String,
    pub shifts:               BTreeMap<String, RawShift>,
    pub quality_settings:     BTreeMap<String, RawTimeRule>,
    pub packing_settings:     BTreeMap<String, RawTimeRule>,
    pub assembly_sequence:    Vec<String>,
    /// Minutes.
    pub target_takt:          f64,
    pub seed:                 u64,
    pub max_events:           u64,
    pub backpressure_factor:  f64,
    /// `[min, max]` hours added to an operation when a failure occurs.
    pub repair_hours:         [f64; 2],
    pub energy_cost_per_hour: f64,
    pub wip_sample_hours:     f64,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            start_date:           "18-11-2025".to_string(),
            shifts:               BTreeMap::new(),
            quality_settings:     BTreeMap::new(),
            packing_settings:     BTreeMap::new(),
            assembly_sequence:    Vec::new(),
            target_takt:          0.0,
            seed:                 42,
            max_events:           800_000,
            backpressure_factor:  2.0,
            repair_hours:         [0.5, 2.0],
            energy_cost_per_hour: 0.5,
            wip_sample_hours:     1.0,
        }
    }
}

// ── serde helpers ─────────────────────────────────────────────────────────────

fn one() -> u32 {
    1
}

fn unit_speed() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

fn work_week() -> u8 {
    5
}

/// Accepts `true`, `1`, `"1"` or `"true"` as set; anything else as unset.
fn loose_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Bool(bool),
        Number(f64),
        Text(String),
        Null(()),
    }

    Ok(match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => b,
        Loose::Number(n) => n == 1.0,
        Loose::Text(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true")
        }
        Loose::Null(()) => false,
    })
}
