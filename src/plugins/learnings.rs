use crate::core::error;
use crate::core::storage::Storage;
use crate::core::store::{Collection, Learning};
use crate::core::time;
use crate::core::validators::{
    validate_non_empty_string, validate_optional_string, validate_positive_integer,
    validate_timestamp,
};
use crate::plugins::topics::upsert_topic;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const DEFAULT_RECENT_DAYS: i64 = 30;

/// Caller-supplied fields of a learning; `id` and `created_at` are assigned on save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLearning {
    pub timestamp: String,
    pub task: String,
    #[serde(default)]
    pub topic: Option<String>,
    pub what_learned: String,
    #[serde(default)]
    pub mistakes: Option<String>,
}

/// Append a learning and, when it names a topic, count that topic in the same write.
pub fn save_learning(storage: &Storage, learning: &NewLearning) -> Result<u64, error::OpenLearnError> {
    let task = validate_non_empty_string(&learning.task, "Task")?;
    let what_learned = validate_non_empty_string(&learning.what_learned, "What learned")?;
    let timestamp = validate_timestamp(&learning.timestamp, "Timestamp")?;
    let topic = validate_optional_string(learning.topic.as_deref(), "Topic")?;
    let mistakes = validate_optional_string(learning.mistakes.as_deref(), "Mistakes")?;

    storage.with_write(|store| {
        let now = time::now_iso();
        let id = store.counters.allocate(Collection::Learnings)?;
        store.learnings.push(Learning {
            id,
            timestamp,
            task,
            topic: topic.clone(),
            what_learned,
            mistakes,
            created_at: now.clone(),
        });

        if let Some(topic) = &topic {
            upsert_topic(store, topic, &now)?;
        }
        Ok(id)
    })
}

fn newest_first(learnings: &mut [Learning]) {
    learnings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

pub fn get_learnings(storage: &Storage, limit: i64) -> Result<Vec<Learning>, error::OpenLearnError> {
    let limit = validate_positive_integer(limit, "Limit")?;
    let mut learnings = storage.snapshot()?.learnings;
    newest_first(&mut learnings);
    learnings.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    Ok(learnings)
}

/// Case-insensitive substring match on topic, task and what was learned.
pub fn search_learnings(storage: &Storage, query: &str) -> Result<Vec<Learning>, error::OpenLearnError> {
    let query = validate_non_empty_string(query, "Search query")?.to_lowercase();

    let mut matches: Vec<Learning> = storage
        .snapshot()?
        .learnings
        .into_iter()
        .filter(|l| {
            l.topic
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&query))
                || l.task.to_lowercase().contains(&query)
                || l.what_learned.to_lowercase().contains(&query)
        })
        .collect();
    newest_first(&mut matches);
    Ok(matches)
}

pub fn get_learnings_by_topic(storage: &Storage, topic: &str) -> Result<Vec<Learning>, error::OpenLearnError> {
    let topic = validate_non_empty_string(topic, "Topic")?.to_lowercase();

    let mut matches: Vec<Learning> = storage
        .snapshot()?
        .learnings
        .into_iter()
        .filter(|l| l.topic.as_deref().is_some_and(|t| t.to_lowercase() == topic))
        .collect();
    newest_first(&mut matches);
    Ok(matches)
}

pub fn get_recent_learnings(storage: &Storage, days: i64) -> Result<Vec<Learning>, error::OpenLearnError> {
    let days = validate_positive_integer(days, "Days")?;
    let cutoff = time::days_ago(days);

    let mut recent: Vec<Learning> = storage
        .snapshot()?
        .learnings
        .into_iter()
        .filter(|l| time::is_after(&l.timestamp, cutoff))
        .collect();
    newest_first(&mut recent);
    Ok(recent)
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "learnings",
        "version": "0.1.0",
        "description": "Append-only journal of what was learned per task",
        "commands": [
            { "name": "save", "parameters": ["timestamp", "task", "topic", "what_learned", "mistakes"] },
            { "name": "list", "parameters": ["limit"] },
            { "name": "search", "parameters": ["query"] },
            { "name": "by-topic", "parameters": ["topic"] },
            { "name": "recent", "parameters": ["days"] }
        ],
        "storage": ["openlearn.json#learnings"]
    })
}
