//! Keyed serialization locks
//!
//! Each key (a data file, the registry, the settings) gets its own async
//! mutex. Holders of the same key run one at a time; different keys never
//! wait on each other.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Key guarding read-modify-write of `connections.json`
pub const REGISTRY_KEY: &str = "registry";

/// Key guarding writes to `settings.json`
pub const SETTINGS_KEY: &str = "settings";

/// Key guarding one data file, shared by every connection that names it
pub fn data_source_key(path: &Path) -> String {
    format!("source:{}", path.display())
}

#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`; released when the guard drops
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the lock for `key` if nobody holds or waits on it
    pub async fn forget(&self, key: &str) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(key);
        }
    }

    /// Number of keys currently tracked
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
