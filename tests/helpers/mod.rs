#![allow(dead_code)]

use serde_json::{json, Value};
use time::{macros::date, Date};

use freight_cost_calculator::{infra::snapshot_file::parse_snapshot, RateSnapshot};

pub const REFERENCE: Date = date!(2025 - 06 - 01);

/// Builds a snapshot from export-shaped JSON, so the scenarios go through the loader too.
pub fn snapshot(export: Value) -> RateSnapshot {
    parse_snapshot(&export.to_string()).unwrap().snapshot
}

/// Row valid for the whole of 2025, with `fields` merged in.
pub fn row(id: &str, fields: Value) -> Value {
    let mut row = json!({
        "id": id,
        "version": 1,
        "valid_from": "2025-01-01",
        "valid_to": "2025-12-31",
    });
    if let (Some(target), Value::Object(extra)) = (row.as_object_mut(), fields) {
        target.extend(extra);
    }
    row
}

pub fn busan_qingdao_osh(weight: f64) -> freight_cost_calculator::CalculationRequest {
    freight_cost_calculator::CalculationRequest::new("BUSAN", "QINGDAO", "OSH", weight)
        .on(REFERENCE)
}
