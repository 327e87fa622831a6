//! Per-key serialization for catalog upserts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of per-key mutexes.
///
/// Calls holding the same key run one at a time; different keys do not
/// block each other. Entries are dropped once no caller holds them.
#[derive(Debug, Default)]
pub struct UpsertLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UpsertLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`.
    ///
    /// The key is released even if `f` panics.
    pub fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let entry = KeyEntry {
            locks: self,
            key,
            lock: self.acquire(key),
        };
        let _guard = entry.lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of keys currently held or waited on.
    pub fn active_keys(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn acquire(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(key.to_string()).or_default().clone()
    }

    fn release(&self, key: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // The map and `lock` are the only owners: nobody else is waiting.
        if Arc::strong_count(lock) == 2 {
            locks.remove(key);
        }
    }
}

/// A caller's claim on one key, released on drop.
struct KeyEntry<'a> {
    locks: &'a UpsertLocks,
    key: &'a str,
    lock: Arc<Mutex<()>>,
}

impl Drop for KeyEntry<'_> {
    fn drop(&mut self) {
        self.locks.release(self.key, &self.lock);
    }
}
