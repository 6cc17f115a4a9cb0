//! Cross-process storage lock.
//!
//! The lock is a directory: `create_dir` either creates it or fails with
//! `AlreadyExists` in a single syscall, which gives single-winner semantics
//! to every participant that follows the same protocol. The holder records
//! its pid and start time in `owner.json` inside the directory.

use crate::core::error::{OpenLearnError, Result};
use crate::core::schemas;
use crate::core::time;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, warn};

pub const LOCK_TIMEOUT_MS: u64 = 2_000;
pub const LOCK_RETRY_MS: u64 = 25;
/// Age after which a lock is presumed abandoned. A heuristic, not a liveness
/// guarantee: a writer holding the lock longer than this can be broken.
/// Breaking renames the directory aside before deleting it, so two breakers
/// racing on one stale lock cannot delete a lock a third peer just took.
pub const LOCK_STALE_MS: u64 = LOCK_TIMEOUT_MS * 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    pub timeout: Duration,
    pub retry_interval: Duration,
    pub stale_after: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(LOCK_TIMEOUT_MS),
            retry_interval: Duration::from_millis(LOCK_RETRY_MS),
            stale_after: Duration::from_millis(LOCK_STALE_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOwner {
    pub pid: u32,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Held lock. Dropping it without `release` still removes the directory,
/// so a panicking writer cannot leave the store locked.
#[derive(Debug)]
pub struct StorageLock {
    path: PathBuf,
    released: bool,
}

impl StorageLock {
    pub fn acquire(lock_dir: &Path, options: &LockOptions) -> Result<Self> {
        let started = Instant::now();
        loop {
            match fs::create_dir(lock_dir) {
                Ok(()) => {
                    let lock = StorageLock {
                        path: lock_dir.to_path_buf(),
                        released: false,
                    };
                    // On failure the guard drops and removes the directory.
                    write_owner(lock_dir)?;
                    debug!(path = %lock_dir.display(), "acquired storage lock");
                    return Ok(lock);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
                Err(err) => return Err(OpenLearnError::IoError(err)),
            }

            if is_stale(lock_dir, options.stale_after) {
                match break_stale_lock(lock_dir, options.stale_after) {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(err) => debug!(error = %err, "stale lock cleanup failed; retrying"),
                }
            }

            let waited = started.elapsed();
            if waited >= options.timeout {
                debug!(owner = ?read_owner(lock_dir), "storage lock still held");
                return Err(OpenLearnError::LockTimeoutError {
                    path: lock_dir.to_path_buf(),
                    waited_ms: waited.as_millis(),
                });
            }
            thread::sleep(options.retry_interval);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the lock directory. A lock that is already gone counts as released.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        remove_lock_dir(&self.path)?;
        debug!(path = %self.path.display(), "released storage lock");
        Ok(())
    }
}

impl Drop for StorageLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = remove_lock_dir(&self.path);
        }
    }
}

fn remove_lock_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(OpenLearnError::IoError(err)),
    }
}

fn write_owner(lock_dir: &Path) -> Result<()> {
    let owner = LockOwner {
        pid: std::process::id(),
        created_at: time::now_iso(),
    };
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(lock_dir.join(schemas::LOCK_OWNER_FILE))?;
    file.write_all(&serde_json::to_vec(&owner)?)?;
    Ok(())
}

/// Owner marker of a held lock, if it is present and readable.
pub fn read_owner(lock_dir: &Path) -> Option<LockOwner> {
    let raw = fs::read(lock_dir.join(schemas::LOCK_OWNER_FILE)).ok()?;
    serde_json::from_slice(&raw).ok()
}

/// Move a stale lock aside and delete it. Returns `true` when the lock path
/// is free again (including when a peer already cleared it).
///
/// `rename` is atomic, so only one breaker takes a given directory. The moved
/// directory is re-checked: if it turns out to be a live lock that replaced the
/// stale one after our check, it is put back.
fn break_stale_lock(lock_dir: &Path, stale_after: Duration) -> std::io::Result<bool> {
    let aside = aside_path(lock_dir);
    match fs::rename(lock_dir, &aside) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(true),
        Err(err) => return Err(err),
    }

    if !is_stale(&aside, stale_after) {
        match fs::rename(&aside, lock_dir) {
            Ok(()) => {
                debug!(path = %lock_dir.display(), "lock was refreshed by a peer; restored");
                return Ok(false);
            }
            Err(err) => {
                warn!(error = %err, path = %lock_dir.display(), "could not restore live storage lock");
            }
        }
    }

    let owner = read_owner(&aside);
    fs::remove_dir_all(&aside)?;
    warn!(path = %lock_dir.display(), ?owner, "removed stale storage lock");
    Ok(true)
}

/// Unique sibling name for a lock being broken.
fn aside_path(lock_dir: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut name = lock_dir.as_os_str().to_owned();
    name.push(format!(".stale-{}-{}", std::process::id(), nanos));
    PathBuf::from(name)
}

fn is_stale(lock_dir: &Path, stale_after: Duration) -> bool {
    let Ok(modified) = fs::metadata(lock_dir).and_then(|m| m.modified()) else {
        return false;
    };
    SystemTime::now()
        .duration_since(modified)
        .is_ok_and(|age| age > stale_after)
}
