use openlearn::core::error::OpenLearnError;
use openlearn::core::storage::Storage;
use openlearn::core::time::now_iso;
use openlearn::plugins::gates::{GateStats, NewGateResult, get_gate_stats, record_gate_result};
use openlearn::plugins::learnings::{NewLearning, save_learning};
use openlearn::plugins::objectives::add_objective;
use openlearn::plugins::stats::get_learning_stats;
use openlearn::plugins::topics::record_topic;
use tempfile::{TempDir, tempdir};

fn fresh_storage() -> (TempDir, Storage) {
    let tmp = tempdir().unwrap();
    let storage = Storage::open(tmp.path().join("openlearn")).unwrap();
    (tmp, storage)
}

fn gate(score: i64, passed: bool) -> NewGateResult {
    NewGateResult {
        task_name: "Task 1".to_string(),
        gate_name: "ownership".to_string(),
        score,
        passed,
        feedback: None,
    }
}

#[test]
fn test_gate_stats_average_and_pass_count() {
    let (_tmp, storage) = fresh_storage();
    record_gate_result(&storage, &gate(0, false)).unwrap();
    record_gate_result(&storage, &gate(100, true)).unwrap();

    assert_eq!(
        get_gate_stats(&storage).unwrap(),
        GateStats {
            total_gates: 2,
            passed_gates: 1,
            average_score: 50
        }
    );
}

#[test]
fn test_gate_stats_empty_store() {
    let (_tmp, storage) = fresh_storage();
    let stats = get_gate_stats(&storage).unwrap();
    assert_eq!(stats.total_gates, 0);
    assert_eq!(stats.average_score, 0);
}

#[test]
fn test_score_out_of_range_is_rejected_without_mutation() {
    let (_tmp, storage) = fresh_storage();
    record_gate_result(&storage, &gate(80, true)).unwrap();
    let before = storage.snapshot().unwrap();

    for score in [101, -1] {
        let err = record_gate_result(&storage, &gate(score, true)).unwrap_err();
        assert!(matches!(err, OpenLearnError::ValidationError(_)));
        assert!(err.to_string().contains("between 0 and 100"));
    }

    let after = storage.snapshot().unwrap();
    assert_eq!(after.gate_results.len(), 1);
    assert_eq!(after.counters, before.counters);
}

#[test]
fn test_gate_result_fields_are_stored() {
    let (_tmp, storage) = fresh_storage();
    let mut input = gate(85, true);
    input.feedback = Some(" Good understanding ".to_string());
    let id = record_gate_result(&storage, &input).unwrap();

    let stored = &storage.snapshot().unwrap().gate_results[0];
    assert_eq!(stored.id, id);
    assert_eq!(stored.score, 85);
    assert!(stored.passed);
    assert_eq!(stored.feedback.as_deref(), Some("Good understanding"));
    assert!(openlearn::core::time::is_valid_timestamp(&stored.timestamp));
}

#[test]
fn test_learning_stats() {
    let (_tmp, storage) = fresh_storage();
    for (task, topic) in [("Task 1", "React"), ("Task 2", "TypeScript"), ("Task 3", "react")] {
        save_learning(
            &storage,
            &NewLearning {
                timestamp: now_iso(),
                task: task.to_string(),
                topic: Some(topic.to_string()),
                what_learned: "Learned".to_string(),
                mistakes: None,
            },
        )
        .unwrap();
    }
    record_topic(&storage, "rust").unwrap();
    add_objective(&storage, "Ship it").unwrap();

    let stats = get_learning_stats(&storage).unwrap();
    assert_eq!(stats.total_learnings, 3);
    assert_eq!(stats.total_topics, 3);
    assert_eq!(stats.recent_learnings, 3);
    assert_eq!(stats.active_objectives, 1);
    assert_eq!(stats.top_topics[0].name, "react");
    assert_eq!(stats.top_topics[0].count, 2);

    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["totalLearnings"], 3);
    assert!(value["topTopics"].is_array());
}
