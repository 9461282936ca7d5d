//! File-backed store — the heart of LumenStore.
//!
//! `FileStore` owns the in-memory dataset behind a single `RwLock` and
//! rewrites the backing file on every mutation.
//!
//! **Read path**: shared lock, lookup, lazy expiry check. Never touches disk.
//! **Write path**: exclusive lock held across mutate, seq bump and file sync.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use parking_lot::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::format::{Dataset, Entry};
use crate::persist;

/// Embedded key-value store persisted as one file.
///
/// All public methods take `&self`; share it across threads with `Arc`.
/// Any number of `get` calls run in parallel. `set` and `delete` are
/// serialized and each one is a single critical section including the
/// write to disk.
///
/// The lock is process-local. Two processes opening the same file will
/// overwrite each other.
pub struct FileStore {
    /// Backing file
    path: PathBuf,
    /// Guards the dataset and every call into the persistence engine
    data: RwLock<Dataset>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
}

impl FileStore {
    /// Open or create a store at `path` with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::open_with(path, StoreConfig::default(), Arc::new(SystemClock))
    }

    /// Open or create a store with an explicit configuration and clock.
    ///
    /// Fails with `CorruptStore` if the file exists but cannot be parsed.
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        config: StoreConfig,
        clock: Arc<dyn Clock>,
    ) -> StoreResult<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();
        let dataset = persist::load_or_create(&path, &config)?;

        debug!(
            "open: {} ({} entries, seq {})",
            path.display(),
            dataset.len(),
            dataset.seq
        );

        Ok(Self {
            path,
            data: RwLock::new(dataset),
            clock,
            config,
        })
    }

    /// Insert or replace `key`. A zero `ttl` never expires.
    ///
    /// If the sync fails the new value stays in memory and the error is
    /// returned; the file catches up on the next successful sync.
    pub fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.config.check_entry(key, value)?;

        let mut data = self.data.write();
        let entry = Entry::with_ttl(value, ttl, self.clock.now())?;

        debug!("set: key={} ttl={:?}", key, ttl);
        trace!("set: key={} value={}", key, value);

        data.insert(key, entry);
        data.bump_seq();
        persist::sync(&data, &self.path, &self.config)
    }

    /// Value for `key`, or `NotFound` if it is absent or expired.
    pub fn get(&self, key: &str) -> StoreResult<String> {
        let data = self.data.read();
        let now = self.clock.now();

        match data.get(key) {
            Some(entry) if !entry.expired(now) => {
                debug!(
                    "get: key={} no_expire={} expires_on={}",
                    key, entry.no_expire, entry.expires_on
                );
                Ok(entry.value.clone())
            }
            found => {
                debug!("get: key={} not found (expired: {})", key, found.is_some());
                Err(StoreError::NotFound { key: key.to_string() })
            }
        }
    }

    /// Remove `key`. Removing an absent key is not an error; the dataset
    /// is still synced.
    pub fn delete(&self, key: &str) -> StoreResult<()> {
        let mut data = self.data.write();

        let existed = data.remove(key).is_some();
        debug!("delete: key={} existed={}", key, existed);

        data.bump_seq();
        persist::sync(&data, &self.path, &self.config)
    }

    /// Physically drop every expired entry.
    ///
    /// Reads already treat expired entries as absent; this only reclaims
    /// space. Runs only when called. Syncs only if something was removed.
    pub fn purge_expired(&self) -> StoreResult<usize> {
        let mut data = self.data.write();

        let removed = data.remove_expired(self.clock.now());
        debug!("purge: removed {} expired entries", removed);
        if removed == 0 {
            return Ok(0);
        }

        data.bump_seq();
        persist::sync(&data, &self.path, &self.config)?;
        Ok(removed)
    }

    /// True if `key` holds a live (unexpired) entry.
    pub fn contains_key(&self, key: &str) -> bool {
        let data = self.data.read();
        let now = self.clock.now();
        data.get(key).map_or(false, |e| !e.expired(now))
    }

    /// Live keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let data = self.data.read();
        let now = self.clock.now();
        data.pairs
            .iter()
            .filter(|(_, e)| !e.expired(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Current write generation.
    pub fn seq(&self) -> u64 {
        self.data.read().seq
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the in-memory dataset.
    pub fn snapshot(&self) -> Dataset {
        self.data.read().clone()
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("entries", &self.len())
            .finish()
    }
}
