use crate::core::error::{self, OpenLearnError};
use crate::core::storage::Storage;
use crate::core::store::{Collection, Objective, ObjectiveStatus};
use crate::core::time;
use crate::core::validators::{validate_non_empty_string, validate_positive_integer};

pub fn add_objective(storage: &Storage, objective: &str) -> Result<u64, error::OpenLearnError> {
    let objective = validate_non_empty_string(objective, "Objective")?;

    storage.with_write(|store| {
        let id = store.counters.allocate(Collection::Objectives)?;
        store.objectives.push(Objective {
            id,
            objective,
            status: ObjectiveStatus::Active,
            created_at: time::now_iso(),
            completed_at: None,
        });
        Ok(id)
    })
}

/// Active objectives, newest first.
pub fn get_active_objectives(storage: &Storage) -> Result<Vec<Objective>, error::OpenLearnError> {
    let mut active: Vec<Objective> = storage
        .snapshot()?
        .objectives
        .into_iter()
        .filter(|o| o.status == ObjectiveStatus::Active)
        .collect();
    active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(active)
}

/// Mark an objective completed, whatever its current status. Completing it
/// again re-stamps `completed_at`.
pub fn complete_objective(storage: &Storage, id: i64) -> Result<(), error::OpenLearnError> {
    let id = validate_positive_integer(id, "Objective ID")?;

    storage.with_write(|store| {
        let objective = store.objective_mut(id).ok_or_else(|| {
            OpenLearnError::NotFound(format!("Objective with ID {} was not found", id))
        })?;
        objective.status = ObjectiveStatus::Completed;
        objective.completed_at = Some(time::now_iso());
        Ok(())
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "objectives",
        "version": "0.1.0",
        "description": "Learning objectives with an active -> completed lifecycle",
        "commands": [
            { "name": "add", "parameters": ["objective"] },
            { "name": "list", "description": "Active objectives, newest first" },
            { "name": "complete", "parameters": ["id"] }
        ],
        "storage": ["openlearn.json#objectives"]
    })
}
