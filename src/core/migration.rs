//! One-time import from the legacy SQLite file.
//!
//! Runs when `openlearn.db` exists and `openlearn.json` does not. The legacy
//! file is opened read-only and never modified or deleted, so removing the
//! JSON document later re-runs the import from whatever the legacy file holds.

use crate::core::error::{OpenLearnError, Result};
use crate::core::normalize::normalize_store;
use crate::core::schemas;
use crate::core::store::Store;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Map, Value, json};
use std::path::Path;
use tracing::info;

/// Legacy tables and the columns read from each, in document order.
const LEGACY_TABLES: &[(&str, &[&str])] = &[
    ("topics", schemas::LEGACY_TOPIC_COLUMNS),
    ("learnings", schemas::LEGACY_LEARNING_COLUMNS),
    ("objectives", schemas::LEGACY_OBJECTIVE_COLUMNS),
    ("gate_results", schemas::LEGACY_GATE_RESULT_COLUMNS),
];

/// Read every legacy row into a normalized `Store`.
///
/// Counters come out as the highest id per collection. Failures of any kind
/// are wrapped in `MigrationError`; the connection is closed on every path.
pub fn migrate_legacy_database(legacy_db: &Path) -> Result<Store> {
    info!(path = %legacy_db.display(), "migrating legacy database to JSON storage");

    let conn = Connection::open_with_flags(
        legacy_db,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| migration_error(e.into()))?;

    let outcome = read_legacy_document(&conn);
    // `close` hands the connection back on failure; dropping it closes it.
    let closed = conn.close().map_err(|(_conn, e)| OpenLearnError::RusqliteError(e));

    match (outcome, closed) {
        (Ok(document), Ok(())) => {
            let store = normalize_store(&document);
            info!(
                topics = store.topics.len(),
                learnings = store.learnings.len(),
                objectives = store.objectives.len(),
                gate_results = store.gate_results.len(),
                "legacy migration complete"
            );
            Ok(store)
        }
        (Ok(_), Err(e)) | (Err(e), _) => Err(migration_error(e)),
    }
}

fn migration_error(cause: OpenLearnError) -> OpenLearnError {
    OpenLearnError::MigrationError(Box::new(cause))
}

fn read_legacy_document(conn: &Connection) -> Result<Value> {
    let mut document = Map::new();
    document.insert("version".to_string(), json!(schemas::STORE_VERSION));
    for (table, columns) in LEGACY_TABLES {
        let mut rows = read_table(conn, table, columns)?;
        if *table == "gate_results" {
            rows.iter_mut().for_each(coerce_passed);
        }
        document.insert(table.to_string(), Value::Array(rows));
    }
    Ok(Value::Object(document))
}

fn read_table(conn: &Connection, table: &str, columns: &[&str]) -> Result<Vec<Value>> {
    let sql = format!("SELECT {} FROM {} ORDER BY id", columns.join(", "), table);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        let mut record = Map::new();
        for (idx, column) in columns.iter().enumerate() {
            let value: SqlValue = row.get(idx)?;
            record.insert(column.to_string(), sql_to_json(value));
        }
        Ok(Value::Object(record))
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn sql_to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null | SqlValue::Blob(_) => Value::Null,
        SqlValue::Integer(i) => json!(i),
        SqlValue::Real(f) => json!(f),
        SqlValue::Text(s) => Value::String(s),
    }
}

/// Legacy rows store `passed` as 0/1.
fn coerce_passed(row: &mut Value) {
    if let Some(passed) = row.get_mut("passed") {
        if let Some(flag) = passed.as_i64() {
            *passed = Value::Bool(flag != 0);
        }
    }
}
