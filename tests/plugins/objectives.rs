use openlearn::core::error::OpenLearnError;
use openlearn::core::storage::Storage;
use openlearn::core::store::ObjectiveStatus;
use openlearn::plugins::objectives::{add_objective, complete_objective, get_active_objectives};
use std::fs;
use tempfile::{TempDir, tempdir};

fn fresh_storage() -> (TempDir, Storage) {
    let tmp = tempdir().unwrap();
    let storage = Storage::open(tmp.path().join("openlearn")).unwrap();
    (tmp, storage)
}

#[test]
fn test_objective_lifecycle() {
    let (_tmp, storage) = fresh_storage();
    let id = add_objective(&storage, "Learn React hooks").unwrap();
    assert_eq!(id, 1);

    let active = get_active_objectives(&storage).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].objective, "Learn React hooks");
    assert_eq!(active[0].status, ObjectiveStatus::Active);
    assert_eq!(active[0].completed_at, None);

    complete_objective(&storage, id as i64).unwrap();
    assert!(get_active_objectives(&storage).unwrap().is_empty());

    let store = storage.snapshot().unwrap();
    assert_eq!(store.objectives[0].status, ObjectiveStatus::Completed);
    assert!(store.objectives[0].completed_at.is_some());
}

#[test]
fn test_complete_missing_objective_is_not_found() {
    let (_tmp, storage) = fresh_storage();
    add_objective(&storage, "Exists").unwrap();
    let before_bytes = fs::read(storage.storage_path()).unwrap();
    let before_mtime = fs::metadata(storage.storage_path()).unwrap().modified().unwrap();

    let err = complete_objective(&storage, 42).unwrap_err();
    assert!(matches!(err, OpenLearnError::NotFound(_)));
    assert!(err.to_string().contains("42"));

    assert_eq!(fs::read(storage.storage_path()).unwrap(), before_bytes);
    assert_eq!(
        fs::metadata(storage.storage_path()).unwrap().modified().unwrap(),
        before_mtime
    );
    assert!(!storage.paths().lock_dir.exists());
}

#[test]
fn test_complete_objective_rejects_non_positive_id() {
    let (_tmp, storage) = fresh_storage();
    assert!(matches!(
        complete_objective(&storage, 0),
        Err(OpenLearnError::ValidationError(_))
    ));
    assert!(matches!(
        add_objective(&storage, ""),
        Err(OpenLearnError::ValidationError(_))
    ));
}

#[test]
fn test_abandoned_objective_can_still_be_completed() {
    let (_tmp, storage) = fresh_storage();
    let id = add_objective(&storage, "Drop this").unwrap();
    storage
        .with_write(|store| {
            store.objectives[0].status = ObjectiveStatus::Abandoned;
            Ok(())
        })
        .unwrap();

    complete_objective(&storage, id as i64).unwrap();
    let objective = storage.snapshot().unwrap().objectives[0].clone();
    assert_eq!(objective.status, ObjectiveStatus::Completed);
    assert!(objective.completed_at.is_some());
}

#[test]
fn test_ids_keep_increasing() {
    let (_tmp, storage) = fresh_storage();
    let first = add_objective(&storage, "one").unwrap();
    let second = add_objective(&storage, "two").unwrap();
    assert!(second > first);

    let active = get_active_objectives(&storage).unwrap();
    assert_eq!(active.len(), 2);
}
