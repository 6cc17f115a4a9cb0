//! In-memory copy of the last loaded document, keyed by the file's stamp.
//!
//! Owned by a `Storage` instance rather than the process, so separate engines
//! (for example one per test directory) never share cached state.

use crate::core::store::Store;
use std::fs::Metadata;
use std::io;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

/// Identity of one version of the document file.
///
/// Modification time alone has tick-level granularity on common filesystems;
/// length and inode (every atomic replace yields a new inode) disambiguate
/// writes that land within the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStamp {
    pub mtime: SystemTime,
    pub len: u64,
    pub ino: u64,
}

impl FileStamp {
    pub fn of(meta: &Metadata) -> io::Result<Self> {
        #[cfg(unix)]
        let ino = {
            use std::os::unix::fs::MetadataExt;
            meta.ino()
        };
        #[cfg(not(unix))]
        let ino = 0;

        Ok(Self {
            mtime: meta.modified()?,
            len: meta.len(),
            ino,
        })
    }
}

#[derive(Debug)]
struct CachedStore {
    store: Store,
    stamp: FileStamp,
}

#[derive(Debug, Default)]
pub struct StoreCache {
    entry: Mutex<Option<CachedStore>>,
}

impl StoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<CachedStore>> {
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the cached store if it was loaded from exactly `stamp`.
    pub fn get_if_fresh(&self, stamp: FileStamp) -> Option<Store> {
        self.slot()
            .as_ref()
            .filter(|cached| cached.stamp == stamp)
            .map(|cached| cached.store.clone())
    }

    pub fn put(&self, store: Store, stamp: FileStamp) {
        *self.slot() = Some(CachedStore { store, stamp });
    }

    pub fn clear(&self) {
        *self.slot() = None;
    }

    pub fn is_populated(&self) -> bool {
        self.slot().is_some()
    }
}
