use crate::core::error::{self, OpenLearnError};
use crate::core::storage::Storage;
use crate::core::store::{Collection, Store, Topic};
use crate::core::time;
use crate::core::validators::{validate_non_empty_string, validate_positive_integer};

pub const DEFAULT_RECENT_DAYS: i64 = 30;

/// Count an encounter of `name` (case-insensitive), creating the topic on first sight.
pub(crate) fn upsert_topic(
    store: &mut Store,
    name: &str,
    encountered_at: &str,
) -> Result<(), error::OpenLearnError> {
    let normalized = name.to_lowercase();
    if let Some(existing) = store.topic_by_name_mut(&normalized) {
        existing.count = existing.count.checked_add(1).ok_or_else(|| {
            OpenLearnError::CounterOverflow(format!("count of topic '{}'", normalized))
        })?;
        existing.last_encountered = encountered_at.to_string();
        return Ok(());
    }

    let id = store.counters.allocate(Collection::Topics)?;
    store.topics.push(Topic {
        id,
        name: normalized,
        first_encountered: encountered_at.to_string(),
        last_encountered: encountered_at.to_string(),
        count: 1,
    });
    Ok(())
}

pub fn record_topic(storage: &Storage, name: &str) -> Result<(), error::OpenLearnError> {
    let name = validate_non_empty_string(name, "Topic name")?.to_lowercase();

    storage.with_write(|store| upsert_topic(store, &name, &time::now_iso()))
}

/// Most encountered first; ties go to the most recently seen.
pub fn get_topics(storage: &Storage) -> Result<Vec<Topic>, error::OpenLearnError> {
    let mut topics = storage.snapshot()?.topics;
    topics.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.last_encountered.cmp(&a.last_encountered))
    });
    Ok(topics)
}

pub fn get_recent_topics(storage: &Storage, days: i64) -> Result<Vec<Topic>, error::OpenLearnError> {
    let days = validate_positive_integer(days, "Days")?;
    let cutoff = time::days_ago(days);

    let mut topics: Vec<Topic> = storage
        .snapshot()?
        .topics
        .into_iter()
        .filter(|t| time::is_after(&t.last_encountered, cutoff))
        .collect();
    topics.sort_by(|a, b| b.last_encountered.cmp(&a.last_encountered));
    Ok(topics)
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "topics",
        "version": "0.1.0",
        "description": "Case-insensitive topic encounter counts",
        "commands": [
            { "name": "record", "parameters": ["name"] },
            { "name": "list", "description": "Topics by count, then recency" },
            { "name": "recent", "parameters": ["days"] }
        ],
        "storage": ["openlearn.json#topics"]
    })
}
