//! The storage engine: the "thin waist" every read and write goes through.
//!
//! A `Storage` owns its resolved paths, lock tuning and document cache.
//! Reads return a deep copy of the cached document while the file's stamp
//! (mtime, length, inode) is unchanged. Writes go through
//! [`Storage::with_write`], which takes the cross-process lock, reloads from
//! disk, applies the mutation, persists atomically and refreshes the cache.

use crate::core::cache::{FileStamp, StoreCache};
use crate::core::error::{OpenLearnError, Result};
use crate::core::lock::{LockOptions, StorageLock};
use crate::core::migration;
use crate::core::normalize::normalize_store;
use crate::core::paths::{self, StoragePaths};
use crate::core::schemas;
use crate::core::store::Store;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

#[derive(Debug)]
pub struct Storage {
    paths: StoragePaths,
    lock_options: LockOptions,
    cache: StoreCache,
}

impl Storage {
    /// Engine for the directory picked by `OPENLEARN_STORAGE_DIR` or project discovery.
    pub fn discover() -> Result<Self> {
        Ok(Self::from_paths(paths::resolve_storage_paths()?))
    }

    /// Engine for an explicit storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let dir = paths::absolutize(&dir.into(), &cwd);
        let dir = paths::checked_dir(dir, "Storage directory")?;
        Ok(Self::from_paths(StoragePaths::in_dir(dir)))
    }

    pub fn from_paths(paths: StoragePaths) -> Self {
        Self {
            paths,
            lock_options: LockOptions::default(),
            cache: StoreCache::new(),
        }
    }

    pub fn with_lock_options(mut self, lock_options: LockOptions) -> Self {
        self.lock_options = lock_options;
        self
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn lock_options(&self) -> &LockOptions {
        &self.lock_options
    }

    /// Path of the JSON document.
    pub fn storage_path(&self) -> &Path {
        &self.paths.json
    }

    /// Independent copy of the current document, served from cache when the
    /// file is unchanged. Creates (or migrates) the document if it is missing.
    pub fn snapshot(&self) -> Result<Store> {
        match self.load_cached()? {
            Some(store) => Ok(store),
            None => self.with_write(|store| Ok(store.clone())),
        }
    }

    /// Drop the cached document; the next read goes to disk.
    pub fn close(&self) {
        self.cache.clear();
    }

    /// Ensure the document exists and carries a schema version.
    pub fn initialize_schema(&self) -> Result<()> {
        self.with_write(|store| {
            if store.version.is_empty() {
                store.version = schemas::STORE_VERSION.to_string();
            }
            Ok(())
        })
    }

    /// Run `mutate` against the latest on-disk document under the storage lock.
    ///
    /// The document is only written if `mutate` succeeds. The lock is released
    /// on every path; if releasing fails while another error is already being
    /// returned, the release failure is logged and the original error wins.
    pub fn with_write<F, R>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Store) -> Result<R>,
    {
        self.ensure_directory()?;
        let lock = StorageLock::acquire(&self.paths.lock_dir, &self.lock_options)?;

        let outcome = self.commit(mutate);

        match (outcome, lock.release()) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(release_err)) => Err(release_err),
            (Err(primary), Ok(())) => Err(primary),
            (Err(primary), Err(release_err)) => {
                error!(error = %release_err, "Failed to release storage lock");
                Err(primary)
            }
        }
    }

    fn commit<F, R>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Store) -> Result<R>,
    {
        let mut store = self.load_locked()?;
        let value = mutate(&mut store)?;
        let stamp = self.write_store(&store)?;
        self.cache.put(store, stamp);
        Ok(value)
    }

    /// Cached read. `None` when the document does not exist yet; creating it
    /// is left to a locked write.
    fn load_cached(&self) -> Result<Option<Store>> {
        self.ensure_directory()?;
        let Some(stamp) = self.document_stamp()? else {
            return Ok(None);
        };
        if let Some(store) = self.cache.get_if_fresh(stamp) {
            debug!("storage cache hit");
            return Ok(Some(store));
        }
        debug!("storage cache miss; reading document");
        self.read_document(stamp).map(Some)
    }

    /// Forced read for use under the lock. Migrates or creates the document
    /// when it is missing.
    fn load_locked(&self) -> Result<Store> {
        if let Some(stamp) = self.document_stamp()? {
            return self.read_document(stamp);
        }

        let store = if self.paths.legacy_db.exists() {
            migration::migrate_legacy_database(&self.paths.legacy_db)?
        } else {
            Store::empty()
        };
        let stamp = self.write_store(&store)?;
        self.cache.put(store.clone(), stamp);
        Ok(store)
    }

    /// Read and normalize the document. `stamp` is taken before reading, so a
    /// concurrent replacement can only make the cache look older than it is.
    fn read_document(&self, stamp: FileStamp) -> Result<Store> {
        let raw = fs::read(&self.paths.json)?;
        let parsed: serde_json::Value =
            serde_json::from_slice(&raw).map_err(|source| OpenLearnError::CorruptDocument {
                path: self.paths.json.clone(),
                source,
            })?;
        let store = normalize_store(&parsed);
        self.cache.put(store.clone(), stamp);
        Ok(store)
    }

    fn document_stamp(&self) -> Result<Option<FileStamp>> {
        match fs::metadata(&self.paths.json) {
            Ok(meta) => Ok(Some(FileStamp::of(&meta)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(OpenLearnError::IoError(err)),
        }
    }

    fn ensure_directory(&self) -> Result<()> {
        if !self.paths.dir.exists() {
            let mut builder = fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(0o700);
            }
            builder.create(&self.paths.dir)?;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Some filesystems reject chmod; the directory is still usable.
            let _ = fs::set_permissions(&self.paths.dir, fs::Permissions::from_mode(0o700));
        }
        Ok(())
    }

    /// Write to `<json>.tmp`, fsync, then rename over the document.
    fn write_store(&self, store: &Store) -> Result<FileStamp> {
        self.ensure_directory()?;
        let payload = serde_json::to_vec(store)?;
        let temp_path = self.paths.temp_json();

        {
            let mut options = OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&temp_path)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(fs::Permissions::from_mode(0o600))?;
            }
            file.write_all(&payload)?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.paths.json)?;
        #[cfg(unix)]
        {
            if let Ok(dir) = fs::File::open(&self.paths.dir) {
                let _ = dir.sync_all();
            }
        }

        let stamp = FileStamp::of(&fs::metadata(&self.paths.json)?)?;
        debug!(path = %self.paths.json.display(), bytes = payload.len(), "persisted storage document");
        Ok(stamp)
    }
}
