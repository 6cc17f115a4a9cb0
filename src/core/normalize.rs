//! Load-time schema enforcement.
//!
//! `normalize_store` is total: any parsed JSON value yields a well-formed
//! `Store`. Records with the wrong shape are dropped, never reported as
//! errors, and counters are raised to the highest surviving id.

use crate::core::schemas;
use crate::core::store::{
    Counters, GateResult, Learning, Objective, ObjectiveStatus, Store, Topic,
};
use crate::core::time::is_valid_timestamp;
use crate::core::validators::MAX_SCORE;
use serde_json::{Map, Value};
use tracing::warn;

pub fn normalize_store(parsed: &Value) -> Store {
    let Some(raw) = parsed.as_object() else {
        if !parsed.is_null() {
            warn!("storage document is not a JSON object; starting from an empty store");
        }
        return Store::empty();
    };

    let mut store = Store {
        version: raw
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(schemas::STORE_VERSION)
            .to_string(),
        topics: collect_records(raw, "topics", topic_from_value),
        learnings: collect_records(raw, "learnings", learning_from_value),
        objectives: collect_records(raw, "objectives", objective_from_value),
        gate_results: collect_records(raw, "gate_results", gate_result_from_value),
        counters: stored_counters(raw.get("counters")),
    };

    let floor = store.max_ids();
    store.counters.raise_to(&floor);
    store
}

fn collect_records<T>(raw: &Map<String, Value>, field: &str, parse: fn(&Value) -> Option<T>) -> Vec<T> {
    let Some(entries) = raw.get(field).and_then(Value::as_array) else {
        return Vec::new();
    };
    let records: Vec<T> = entries.iter().filter_map(parse).collect();
    let dropped = entries.len() - records.len();
    if dropped > 0 {
        warn!(collection = field, dropped, "dropped malformed records while loading storage");
    }
    records
}

fn stored_counters(value: Option<&Value>) -> Counters {
    let Some(raw) = value.and_then(Value::as_object) else {
        return Counters::default();
    };
    let read = |key: &str| raw.get(key).and_then(non_negative_int).unwrap_or(0);
    Counters {
        topics: read("topics"),
        learnings: read("learnings"),
        objectives: read("objectives"),
        gate_results: read("gate_results"),
    }
}

/// Integral JSON number >= 0. Accepts `3.0` as well as `3`.
fn non_negative_int(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

fn positive_int(value: Option<&Value>) -> Option<u64> {
    value.and_then(non_negative_int).filter(|n| *n > 0)
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

fn timestamp_field(value: Option<&Value>) -> Option<String> {
    string_field(value).filter(|s| is_valid_timestamp(s))
}

fn topic_from_value(entry: &Value) -> Option<Topic> {
    let raw = entry.as_object()?;
    Some(Topic {
        id: positive_int(raw.get("id"))?,
        name: string_field(raw.get("name"))?,
        first_encountered: timestamp_field(raw.get("first_encountered"))?,
        last_encountered: timestamp_field(raw.get("last_encountered"))?,
        count: positive_int(raw.get("count"))?,
    })
}

fn learning_from_value(entry: &Value) -> Option<Learning> {
    let raw = entry.as_object()?;
    Some(Learning {
        id: positive_int(raw.get("id"))?,
        timestamp: timestamp_field(raw.get("timestamp"))?,
        task: string_field(raw.get("task"))?,
        topic: string_field(raw.get("topic")),
        what_learned: string_field(raw.get("what_learned"))?,
        mistakes: string_field(raw.get("mistakes")),
        created_at: timestamp_field(raw.get("created_at"))?,
    })
}

fn objective_from_value(entry: &Value) -> Option<Objective> {
    let raw = entry.as_object()?;
    Some(Objective {
        id: positive_int(raw.get("id"))?,
        objective: string_field(raw.get("objective"))?,
        status: raw
            .get("status")
            .and_then(Value::as_str)
            .and_then(ObjectiveStatus::parse)?,
        created_at: timestamp_field(raw.get("created_at"))?,
        completed_at: string_field(raw.get("completed_at")),
    })
}

fn gate_result_from_value(entry: &Value) -> Option<GateResult> {
    let raw = entry.as_object()?;
    let score = raw
        .get("score")
        .and_then(non_negative_int)
        .filter(|s| *s <= MAX_SCORE as u64)?;
    Some(GateResult {
        id: positive_int(raw.get("id"))?,
        timestamp: timestamp_field(raw.get("timestamp"))?,
        task_name: string_field(raw.get("task_name"))?,
        gate_name: string_field(raw.get("gate_name"))?,
        score: score as u8,
        passed: raw.get("passed").and_then(Value::as_bool)?,
        feedback: string_field(raw.get("feedback")),
    })
}
