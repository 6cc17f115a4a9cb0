//! Storage directory resolution.
//!
//! Resolution order:
//! 1. `OPENLEARN_STORAGE_DIR`, if set to a non-blank value (never a filesystem root).
//! 2. The nearest project root above the working directory.
//! 3. The nearest project root above the installed executable, else the working directory.
//!
//! A project root holds `package.json` plus `.git` or `.opencode`; storage
//! lives at `<root>/.opencode/openlearn/`.

use crate::core::error::{OpenLearnError, Result};
use crate::core::schemas;
use std::env;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub dir: PathBuf,
    pub json: PathBuf,
    pub lock_dir: PathBuf,
    pub legacy_db: PathBuf,
}

impl StoragePaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            json: dir.join(schemas::JSON_FILE_NAME),
            lock_dir: dir.join(schemas::LOCK_DIR_NAME),
            legacy_db: dir.join(schemas::LEGACY_DB_NAME),
            dir,
        }
    }

    /// Sibling of the document used for atomic replacement.
    pub fn temp_json(&self) -> PathBuf {
        let mut name = self.json.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

/// Resolve paths from the process environment.
pub fn resolve_storage_paths() -> Result<StoragePaths> {
    let cwd = env::current_dir()?;
    let override_dir = env::var(schemas::STORAGE_DIR_ENV).ok();
    let install_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_from(override_dir.as_deref(), &cwd, install_dir.as_deref())
}

/// Pure resolution step, separated from the environment so it can be tested.
pub fn resolve_from(
    override_dir: Option<&str>,
    cwd: &Path,
    install_dir: Option<&Path>,
) -> Result<StoragePaths> {
    if let Some(raw) = override_dir.filter(|v| !v.trim().is_empty()) {
        let resolved = absolutize(Path::new(raw), cwd);
        return checked_dir(resolved, schemas::STORAGE_DIR_ENV).map(StoragePaths::in_dir);
    }

    let root = find_project_root(cwd)
        .or_else(|| install_dir.and_then(find_project_root))
        .unwrap_or_else(|| cwd.to_path_buf());
    Ok(StoragePaths::in_dir(storage_dir_for(&root)))
}

pub fn storage_dir_for(project_root: &Path) -> PathBuf {
    project_root
        .join(schemas::TOOL_MARKER_DIR)
        .join(schemas::STORAGE_SUBDIR)
}

/// Rejects a directory that is a filesystem root.
pub fn checked_dir(dir: PathBuf, source: &str) -> Result<PathBuf> {
    if dir.parent().is_none() {
        return Err(OpenLearnError::ConfigError(format!(
            "{} cannot be a filesystem root",
            source
        )));
    }
    Ok(dir)
}

pub fn is_project_root(dir: &Path) -> bool {
    dir.join(schemas::PROJECT_MANIFEST).exists()
        && (dir.join(schemas::VCS_MARKER).exists() || dir.join(schemas::TOOL_MARKER_DIR).exists())
}

pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = start_dir.to_path_buf();
    loop {
        if is_project_root(&current_dir) {
            return Some(current_dir);
        }
        if !current_dir.pop() {
            return None;
        }
    }
}

/// Lexically resolve `path` against `base`, folding `.` and `..`.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
