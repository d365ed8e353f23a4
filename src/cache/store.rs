//! Cache Store Contract
//!
//! The byte-keyed engine the manager writes through. Implementations own
//! hashing, sharding, eviction and memory layout; the manager only relies on
//! the operations below and on the engine being safe to share across threads.

use crate::cache::StoreStats;

// == Cache Store ==
/// A fixed-capacity, internally synchronised byte cache.
pub trait CacheStore: Send + Sync {
    /// Creates an empty store bounded to roughly `capacity_bytes`.
    fn with_capacity(capacity_bytes: usize) -> Self
    where
        Self: Sized;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// Values of any size up to the store capacity are accepted. Returns
    /// false when the entry could not be held; the key is then absent.
    fn set(&self, key: &[u8], value: &[u8]) -> bool;

    /// Appends the value stored under `key` to `dst` and returns it.
    ///
    /// A missing key leaves `dst` untouched.
    fn get(&self, dst: Vec<u8>, key: &[u8]) -> Vec<u8>;

    /// Removes `key`. Missing keys are ignored.
    fn del(&self, key: &[u8]);

    /// Returns whether `key` is currently held.
    fn has(&self, key: &[u8]) -> bool;

    /// Drops every entry.
    fn reset(&self);

    /// Snapshot of the store counters.
    fn stats(&self) -> StoreStats;
}
