use openlearn::core::error::OpenLearnError;
use openlearn::core::storage::Storage;
use openlearn::plugins::topics::{get_recent_topics, get_topics, record_topic};
use serde_json::json;
use std::fs;
use tempfile::{TempDir, tempdir};

fn fresh_storage() -> (TempDir, Storage) {
    let tmp = tempdir().unwrap();
    let storage = Storage::open(tmp.path().join("openlearn")).unwrap();
    (tmp, storage)
}

#[test]
fn test_record_topic_is_case_insensitive() {
    let (_tmp, storage) = fresh_storage();
    record_topic(&storage, "React").unwrap();
    record_topic(&storage, "react").unwrap();
    record_topic(&storage, "  REACT  ").unwrap();

    let topics = get_topics(&storage).unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name, "react");
    assert_eq!(topics[0].count, 3);
    assert_eq!(topics[0].id, 1);
    assert!(topics[0].last_encountered >= topics[0].first_encountered);
}

#[test]
fn test_record_topic_rejects_blank_name() {
    let (_tmp, storage) = fresh_storage();
    let err = record_topic(&storage, "   ").unwrap_err();
    assert!(matches!(err, OpenLearnError::ValidationError(_)));
    assert!(
        !storage.storage_path().exists(),
        "validation happens before storage is touched"
    );
}

#[test]
fn test_get_topics_sorted_by_count_then_recency() {
    let (_tmp, storage) = fresh_storage();
    storage.initialize_schema().unwrap();
    let ts = |day: u32| format!("2026-01-{:02}T00:00:00.000Z", day);
    fs::write(
        storage.storage_path(),
        serde_json::to_vec(&json!({
            "version": "1.0.0",
            "topics": [
                {"id": 1, "name": "old-pair", "first_encountered": ts(1), "last_encountered": ts(2), "count": 2},
                {"id": 2, "name": "single", "first_encountered": ts(1), "last_encountered": ts(9), "count": 1},
                {"id": 3, "name": "new-pair", "first_encountered": ts(1), "last_encountered": ts(5), "count": 2},
                {"id": 4, "name": "popular", "first_encountered": ts(1), "last_encountered": ts(1), "count": 8}
            ],
            "learnings": [], "objectives": [], "gate_results": [],
            "counters": {"topics": 4, "learnings": 0, "objectives": 0, "gate_results": 0}
        }))
        .unwrap(),
    )
    .unwrap();
    storage.close();

    let names: Vec<String> = get_topics(&storage)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["popular", "new-pair", "old-pair", "single"]);
}

#[test]
fn test_recent_topics_filters_by_window() {
    let (_tmp, storage) = fresh_storage();
    storage.initialize_schema().unwrap();
    fs::write(
        storage.storage_path(),
        serde_json::to_vec(&json!({
            "topics": [
                {"id": 1, "name": "ancient", "first_encountered": "2001-01-01T00:00:00.000Z",
                 "last_encountered": "2001-01-01T00:00:00.000Z", "count": 1}
            ]
        }))
        .unwrap(),
    )
    .unwrap();
    storage.close();
    record_topic(&storage, "fresh").unwrap();

    let recent = get_recent_topics(&storage, 30).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].name, "fresh");
    assert_eq!(recent[0].id, 2);

    assert!(matches!(
        get_recent_topics(&storage, 0),
        Err(OpenLearnError::ValidationError(_))
    ));
}
