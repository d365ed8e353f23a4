//! Cache Manager Module
//!
//! Wraps a [`CacheStore`] with a key registry so entries can be deleted in
//! bulk by a trailing-wildcard pattern such as `user:*`.

use std::collections::HashSet;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::{CacheStore, KeyPattern, KeyRegistry, ShardedStore, StoreStats};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Public Constants ==
/// Store capacity in bytes used when a manager is built with `0` (24 MiB)
pub const DEFAULT_MAX_LENGTH: usize = 25_165_824;

// == Cache Manager ==
/// Byte cache with wildcard prefix deletion.
///
/// The backing store is created on the first [`set`](Self::set). Every
/// registry mutation, together with the store writes it mirrors, happens under
/// one mutex owned by the manager, so a prefix delete never races a
/// concurrent `set` on the registry.
#[derive(Debug)]
pub struct CacheManager<S: CacheStore = ShardedStore> {
    store: OnceCell<S>,
    keys: Mutex<KeyRegistry>,
    max_length: usize,
}

impl<S: CacheStore> CacheManager<S> {
    // == Constructor ==
    /// Creates a manager whose store will be bounded to `max_length` bytes.
    ///
    /// `0` selects [`DEFAULT_MAX_LENGTH`]. Other values go to the store as is.
    pub fn new(max_length: usize) -> Self {
        let max_length = if max_length == 0 {
            DEFAULT_MAX_LENGTH
        } else {
            max_length
        };

        Self {
            store: OnceCell::new(),
            keys: Mutex::new(KeyRegistry::new()),
            max_length,
        }
    }

    /// Creates a manager from the server configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_length)
    }

    /// Capacity bound handed to the store.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// The backing store, if it has been created yet.
    pub fn store(&self) -> Option<&S> {
        self.store.get()
    }

    fn store_or_init(&self) -> &S {
        self.store.get_or_init(|| {
            debug!(capacity = self.max_length, "Creating backing store");
            S::with_capacity(self.max_length)
        })
    }

    // == Set ==
    /// Stores `value` under `key` and registers the key.
    ///
    /// Setting the same key twice registers it twice. When the store cannot
    /// hold the entry the key is unregistered and
    /// [`CacheError::ValueTooLarge`] is returned.
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::KeyNotSet);
        }

        let store = self.store_or_init();
        let mut keys = self.keys.lock();
        if !store.set(key.as_bytes(), value) {
            // The store dropped any previous value too.
            keys.remove_matching(&KeyPattern::Exact(key));
            return Err(CacheError::ValueTooLarge {
                key: key.to_string(),
                size: value.len(),
            });
        }
        keys.register(key);

        debug!(key, bytes = value.len(), "Cache entry set");
        Ok(())
    }

    // == Get ==
    /// Appends the value of `key` to `dst` and returns it.
    ///
    /// An empty key yields an empty vector. A missing key returns `dst`
    /// unchanged; absent and empty values are indistinguishable here.
    pub fn get(&self, dst: Vec<u8>, key: &str) -> Vec<u8> {
        if key.is_empty() {
            return Vec::new();
        }

        match self.store.get() {
            Some(store) => store.get(dst, key.as_bytes()),
            None => dst,
        }
    }

    /// Like [`get`](Self::get) but rejects an empty key with
    /// [`CacheError::KeyNotSet`].
    pub fn get_with_err(&self, key: &str) -> Result<Vec<u8>> {
        if key.is_empty() {
            return Err(CacheError::KeyNotSet);
        }

        Ok(self.get(Vec::new(), key))
    }

    /// Strict lookup: a missing key is [`CacheError::KeyDoesNotExist`].
    pub fn lookup(&self, key: &str) -> Result<Vec<u8>> {
        if key.is_empty() {
            return Err(CacheError::KeyNotSet);
        }

        match self.store.get() {
            Some(store) if store.has(key.as_bytes()) => Ok(store.get(Vec::new(), key.as_bytes())),
            _ => Err(CacheError::KeyDoesNotExist(key.to_string())),
        }
    }

    // == Has ==
    /// Returns whether the store currently holds `key`.
    pub fn has(&self, key: &str) -> bool {
        self.store
            .get()
            .is_some_and(|store| store.has(key.as_bytes()))
    }

    // == Delete ==
    /// Deletes by exact key or, when the pattern ends with `*`, by prefix.
    ///
    /// Matching keys leave both the store and the registry, duplicates
    /// included. Returns the number of distinct registered keys removed.
    pub fn del(&self, key_pattern: &str) -> Result<usize> {
        let pattern = KeyPattern::parse(key_pattern)?;

        let mut keys = self.keys.lock();
        let removed = keys.remove_matching(&pattern);
        let store = self.store.get();

        let count = match pattern {
            KeyPattern::Exact(key) => {
                // The store is cleared even for keys that were never registered.
                if let Some(store) = store {
                    store.del(key.as_bytes());
                }
                usize::from(!removed.is_empty())
            }
            KeyPattern::Prefix(_) => {
                let distinct: HashSet<&str> = removed.iter().map(String::as_str).collect();
                if let Some(store) = store {
                    for key in &distinct {
                        store.del(key.as_bytes());
                    }
                }
                distinct.len()
            }
        };
        drop(keys);

        match pattern {
            KeyPattern::Exact(key) => debug!(key, "Cache entry deleted"),
            KeyPattern::Prefix(prefix) => {
                info!(prefix, removed = count, "Prefix delete completed")
            }
        }

        Ok(count)
    }

    // == Reset ==
    /// Empties the store and the registry.
    pub fn reset(&self) {
        let mut keys = self.keys.lock();
        if let Some(store) = self.store.get() {
            store.reset();
        }
        let cleared = keys.len();
        keys.clear();
        drop(keys);

        info!(cleared, "Cache reset");
    }

    // == List Keys ==
    /// Snapshot of the registered keys in registration order.
    pub fn list_keys(&self) -> Vec<String> {
        self.keys.lock().snapshot()
    }

    /// Number of registry entries, duplicates included.
    pub fn registered_len(&self) -> usize {
        self.keys.lock().len()
    }

    // == Stats ==
    /// Store counters; all zero before the store exists.
    pub fn stats(&self) -> StoreStats {
        self.store
            .get()
            .map(|store| store.stats())
            .unwrap_or_default()
    }
}

impl<S: CacheStore> Default for CacheManager<S> {
    fn default() -> Self {
        Self::new(0)
    }
}
