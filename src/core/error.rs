use rusqlite;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenLearnError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Timed out waiting for storage lock at {} after {waited_ms}ms", path.display())]
    LockTimeoutError { path: PathBuf, waited_ms: u128 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Counter overflow: {0} cannot grow past {max}", max = u64::MAX)]
    CounterOverflow(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to read JSON storage at {}: {source}", path.display())]
    CorruptDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("Legacy migration failed: {0}")]
    MigrationError(#[source] Box<OpenLearnError>),
}

pub type Result<T> = std::result::Result<T, OpenLearnError>;
