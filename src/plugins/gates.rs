use crate::core::error;
use crate::core::storage::Storage;
use crate::core::store::{Collection, GateResult};
use crate::core::time;
use crate::core::validators::{validate_non_empty_string, validate_optional_string, validate_score};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGateResult {
    pub task_name: String,
    pub gate_name: String,
    /// Must be within 0..=100.
    pub score: i64,
    pub passed: bool,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStats {
    pub total_gates: u64,
    pub passed_gates: u64,
    /// Mean score rounded to the nearest integer; 0 when nothing is recorded.
    pub average_score: u64,
}

pub fn record_gate_result(storage: &Storage, result: &NewGateResult) -> Result<u64, error::OpenLearnError> {
    let task_name = validate_non_empty_string(&result.task_name, "Task name")?;
    let gate_name = validate_non_empty_string(&result.gate_name, "Gate name")?;
    let score = validate_score(result.score)?;
    let feedback = validate_optional_string(result.feedback.as_deref(), "Feedback")?;
    let passed = result.passed;

    storage.with_write(|store| {
        let id = store.counters.allocate(Collection::GateResults)?;
        store.gate_results.push(GateResult {
            id,
            timestamp: time::now_iso(),
            task_name,
            gate_name,
            score,
            passed,
            feedback,
        });
        Ok(id)
    })
}

pub fn get_gate_stats(storage: &Storage) -> Result<GateStats, error::OpenLearnError> {
    Ok(gate_stats(&storage.snapshot()?.gate_results))
}

pub(crate) fn gate_stats(results: &[GateResult]) -> GateStats {
    if results.is_empty() {
        return GateStats {
            total_gates: 0,
            passed_gates: 0,
            average_score: 0,
        };
    }

    let total = results.len() as u64;
    let passed = results.iter().filter(|g| g.passed).count() as u64;
    let score_sum: u64 = results.iter().map(|g| u64::from(g.score)).sum();
    GateStats {
        total_gates: total,
        passed_gates: passed,
        average_score: (score_sum as f64 / total as f64).round() as u64,
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "gates",
        "version": "0.1.0",
        "description": "Quality-gate scores per task",
        "commands": [
            { "name": "record", "parameters": ["task_name", "gate_name", "score", "passed", "feedback"] },
            { "name": "stats", "description": "Totals, pass count and rounded average score" }
        ],
        "storage": ["openlearn.json#gate_results"]
    })
}
