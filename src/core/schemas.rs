//! Centralized names, versions and legacy table definitions for OpenLearn storage.
//!
//! The store lives in a single directory holding:
//! 1. openlearn.json: the canonical document (all collections + counters).
//! 2. openlearn.lock/: the cross-process mutex directory.
//! 3. openlearn.db: the legacy SQLite file, read once during migration.

/// Schema version stamped into every document.
pub const STORE_VERSION: &str = "1.0.0";

// --- Storage location ---
pub const STORAGE_DIR_ENV: &str = "OPENLEARN_STORAGE_DIR";
pub const TOOL_MARKER_DIR: &str = ".opencode";
pub const STORAGE_SUBDIR: &str = "openlearn";
pub const PROJECT_MANIFEST: &str = "package.json";
pub const VCS_MARKER: &str = ".git";

pub const JSON_FILE_NAME: &str = "openlearn.json";
pub const LOCK_DIR_NAME: &str = "openlearn.lock";
pub const LOCK_OWNER_FILE: &str = "owner.json";
pub const LEGACY_DB_NAME: &str = "openlearn.db";

// --- Legacy SQLite layout ---
pub const LEGACY_TOPIC_COLUMNS: &[&str] =
    &["id", "name", "first_encountered", "last_encountered", "count"];
pub const LEGACY_LEARNING_COLUMNS: &[&str] = &[
    "id",
    "timestamp",
    "task",
    "topic",
    "what_learned",
    "mistakes",
    "created_at",
];
pub const LEGACY_OBJECTIVE_COLUMNS: &[&str] =
    &["id", "objective", "status", "created_at", "completed_at"];
pub const LEGACY_GATE_RESULT_COLUMNS: &[&str] = &[
    "id",
    "timestamp",
    "task_name",
    "gate_name",
    "score",
    "passed",
    "feedback",
];

pub const LEGACY_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS topics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT UNIQUE NOT NULL,
        first_encountered TEXT NOT NULL,
        last_encountered TEXT NOT NULL,
        count INTEGER DEFAULT 1
    );
    CREATE TABLE IF NOT EXISTS learnings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        task TEXT NOT NULL,
        topic TEXT,
        what_learned TEXT NOT NULL,
        mistakes TEXT,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS objectives (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        objective TEXT NOT NULL,
        status TEXT DEFAULT 'active',
        created_at TEXT NOT NULL,
        completed_at TEXT
    );
    CREATE TABLE IF NOT EXISTS gate_results (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        task_name TEXT NOT NULL,
        gate_name TEXT NOT NULL,
        score INTEGER,
        passed INTEGER,
        feedback TEXT
    );
";
