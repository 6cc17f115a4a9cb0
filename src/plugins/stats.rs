use crate::core::error;
use crate::core::storage::Storage;
use crate::core::store::{ObjectiveStatus, Store};
use crate::core::time;
use serde::{Deserialize, Serialize};

pub const RECENT_WINDOW_DAYS: u64 = 30;
pub const TOP_TOPICS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub total_learnings: u64,
    pub total_topics: u64,
    pub recent_learnings: u64,
    pub active_objectives: u64,
    pub top_topics: Vec<TopicCount>,
}

/// Full scan of the current snapshot; nothing is maintained incrementally.
pub fn get_learning_stats(storage: &Storage) -> Result<LearningStats, error::OpenLearnError> {
    Ok(learning_stats(&storage.snapshot()?))
}

pub(crate) fn learning_stats(store: &Store) -> LearningStats {
    let cutoff = time::days_ago(RECENT_WINDOW_DAYS);

    let mut ranked: Vec<_> = store.topics.iter().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    let top_topics = ranked
        .into_iter()
        .take(TOP_TOPICS)
        .map(|t| TopicCount {
            name: t.name.clone(),
            count: t.count,
        })
        .collect();

    LearningStats {
        total_learnings: store.learnings.len() as u64,
        total_topics: store.topics.len() as u64,
        recent_learnings: store
            .learnings
            .iter()
            .filter(|l| time::is_after(&l.timestamp, cutoff))
            .count() as u64,
        active_objectives: store
            .objectives
            .iter()
            .filter(|o| o.status == ObjectiveStatus::Active)
            .count() as u64,
        top_topics,
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "stats",
        "version": "0.1.0",
        "description": "Aggregate learning statistics",
        "commands": [
            { "name": "stats", "description": "Totals, 30-day activity and top topics" }
        ],
        "storage": ["openlearn.json"]
    })
}
