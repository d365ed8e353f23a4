//! Sharded Store Module
//!
//! Default byte-keyed engine: a fixed set of mutex-guarded shards, each with
//! its own byte budget and LRU eviction. Values above [`CHUNK_SIZE`] are split
//! into chunks spread over all shards, so a single value may use up to the
//! whole store capacity.

use std::fmt;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::warn;
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

use crate::cache::{CacheStore, StoreStats};

// == Public Constants ==
/// Number of independently locked shards
pub const SHARD_COUNT: usize = 16;

/// Largest value stored in one piece; bigger values are chunked
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Smallest byte budget a shard is given, whatever the requested capacity
pub const MIN_SHARD_BYTES: usize = 2 * CHUNK_SIZE;

/// Accounted size of a chunk key or a chunk index
const META_BYTES: usize = 16;

// == Slots ==
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SlotKey {
    Key(Vec<u8>),
    Chunk { hash: u64, index: u32 },
}

/// Where the pieces of a chunked value live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkIndex {
    hash: u64,
    len: usize,
    count: u32,
}

impl ChunkIndex {
    fn chunk_key(&self, index: u32) -> SlotKey {
        SlotKey::Chunk {
            hash: self.hash,
            index,
        }
    }
}

#[derive(Debug)]
enum Slot {
    Inline(Vec<u8>),
    Chunked(ChunkIndex),
    Chunk(Vec<u8>),
}

fn slot_cost(key: &SlotKey, slot: &Slot) -> usize {
    let key_len = match key {
        SlotKey::Key(key) => key.len(),
        SlotKey::Chunk { .. } => META_BYTES,
    };
    let value_len = match slot {
        Slot::Inline(value) | Slot::Chunk(value) => value.len(),
        Slot::Chunked(_) => META_BYTES,
    };
    key_len + value_len
}

// == Shard ==
struct Shard {
    slots: LruCache<SlotKey, Slot>,
    stats: StoreStats,
    used_bytes: usize,
    max_bytes: usize,
}

impl Shard {
    fn new(max_bytes: usize) -> Self {
        Self {
            slots: LruCache::unbounded(),
            stats: StoreStats::new(),
            used_bytes: 0,
            max_bytes,
        }
    }

    /// Inserts an absent key, evicting least recently used slots to make room.
    ///
    /// Returns false when the slot alone exceeds the shard budget.
    fn insert(&mut self, key: SlotKey, slot: Slot) -> bool {
        let cost = slot_cost(&key, &slot);
        if cost > self.max_bytes {
            return false;
        }

        while self.used_bytes + cost > self.max_bytes {
            let Some((evicted_key, evicted)) = self.slots.pop_lru() else {
                break;
            };
            self.used_bytes -= slot_cost(&evicted_key, &evicted);
            self.stats.record_eviction();
        }

        self.slots.put(key, slot);
        self.used_bytes += cost;
        true
    }

    fn take(&mut self, key: &SlotKey) -> Option<Slot> {
        let slot = self.slots.pop(key)?;
        self.used_bytes -= slot_cost(key, &slot);
        Some(slot)
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.used_bytes = 0;
    }

    fn stats(&self) -> StoreStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self
            .slots
            .iter()
            .filter(|(key, _)| matches!(key, SlotKey::Key(_)))
            .count();
        stats.total_bytes = self.used_bytes;
        stats
    }
}

// == Sharded Store ==
/// Fixed-capacity byte cache split across [`SHARD_COUNT`] shards.
///
/// Keys are routed to shards by their xxh3 hash. Each shard evicts its least
/// recently used slots once its share of the capacity is exhausted. A chunked
/// value is only readable while every one of its chunks is held.
pub struct ShardedStore {
    shards: Box<[Mutex<Shard>]>,
    shard_bytes: usize,
}

impl fmt::Debug for ShardedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedStore")
            .field("shards", &self.shards.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl ShardedStore {
    /// Total byte budget after rounding each shard up to [`MIN_SHARD_BYTES`].
    pub fn capacity(&self) -> usize {
        self.shard_bytes * self.shards.len()
    }

    fn shard(&self, key: &[u8]) -> &Mutex<Shard> {
        let idx = (xxh3_64(key) % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    // Consecutive chunks land on consecutive shards.
    fn chunk_shard(&self, hash: u64, index: u32) -> &Mutex<Shard> {
        let idx = (hash.wrapping_add(u64::from(index)) % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    fn slot_shard(&self, key: &SlotKey) -> &Mutex<Shard> {
        match key {
            SlotKey::Key(key) => self.shard(key),
            SlotKey::Chunk { hash, index } => self.chunk_shard(*hash, *index),
        }
    }

    fn write_chunks(&self, key: &[u8], value: &[u8]) -> Option<ChunkIndex> {
        let index = ChunkIndex {
            hash: xxh3_64_with_seed(value, xxh3_64(key)),
            len: value.len(),
            count: value.chunks(CHUNK_SIZE).len() as u32,
        };

        for (i, chunk) in value.chunks(CHUNK_SIZE).enumerate() {
            let chunk_key = index.chunk_key(i as u32);
            let mut shard = self.slot_shard(&chunk_key).lock();
            shard.take(&chunk_key);
            if !shard.insert(chunk_key, Slot::Chunk(chunk.to_vec())) {
                drop(shard);
                self.drop_chunks(&index);
                return None;
            }
        }

        // Later chunks may have evicted earlier ones.
        if !self.chunks_present(&index) {
            self.drop_chunks(&index);
            return None;
        }
        Some(index)
    }

    fn chunks_present(&self, index: &ChunkIndex) -> bool {
        (0..index.count).all(|i| {
            let chunk_key = index.chunk_key(i);
            self.slot_shard(&chunk_key).lock().slots.contains(&chunk_key)
        })
    }

    fn drop_chunks(&self, index: &ChunkIndex) {
        for i in 0..index.count {
            let chunk_key = index.chunk_key(i);
            self.slot_shard(&chunk_key).lock().take(&chunk_key);
        }
    }

    fn read_chunks(&self, dst: &mut Vec<u8>, index: &ChunkIndex) -> bool {
        let start = dst.len();
        let complete = (0..index.count).all(|i| {
            let chunk_key = index.chunk_key(i);
            let mut shard = self.slot_shard(&chunk_key).lock();
            match shard.slots.get(&chunk_key) {
                Some(Slot::Chunk(data)) => {
                    dst.extend_from_slice(data);
                    true
                }
                _ => false,
            }
        });

        let complete = complete && dst.len() - start == index.len;
        if !complete {
            dst.truncate(start);
        }
        complete
    }

    fn refuse(&self, key: &[u8], value_len: usize) -> bool {
        self.del(key);
        warn!(
            key_len = key.len(),
            value_len,
            capacity = self.capacity(),
            "Entry does not fit in the store, dropping it"
        );
        false
    }
}

impl CacheStore for ShardedStore {
    fn with_capacity(capacity_bytes: usize) -> Self {
        let shard_bytes = (capacity_bytes / SHARD_COUNT).max(MIN_SHARD_BYTES);
        let shards = (0..SHARD_COUNT)
            .map(|_| Mutex::new(Shard::new(shard_bytes)))
            .collect();

        Self {
            shards,
            shard_bytes,
        }
    }

    fn set(&self, key: &[u8], value: &[u8]) -> bool {
        if key.len() + value.len() > self.capacity() {
            return self.refuse(key, value.len());
        }

        let (slot, new_index) = if value.len() <= CHUNK_SIZE {
            (Slot::Inline(value.to_vec()), None)
        } else {
            match self.write_chunks(key, value) {
                Some(index) => (Slot::Chunked(index), Some(index)),
                None => return self.refuse(key, value.len()),
            }
        };

        let index_key = SlotKey::Key(key.to_vec());
        let (stored, previous) = {
            let mut shard = self.shard(key).lock();
            let previous = shard.take(&index_key);
            (shard.insert(index_key, slot), previous)
        };

        // A rewrite of the same value reuses the same chunks.
        if let Some(Slot::Chunked(old)) = previous {
            if Some(old) != new_index {
                self.drop_chunks(&old);
            }
        }

        match new_index {
            Some(index) if !stored || !self.chunks_present(&index) => {
                self.drop_chunks(&index);
                self.refuse(key, value.len())
            }
            _ if !stored => self.refuse(key, value.len()),
            _ => true,
        }
    }

    fn get(&self, mut dst: Vec<u8>, key: &[u8]) -> Vec<u8> {
        let index_key = SlotKey::Key(key.to_vec());
        let index = {
            let mut guard = self.shard(key).lock();
            let shard = &mut *guard;
            match shard.slots.get(&index_key) {
                Some(Slot::Inline(value)) => {
                    dst.extend_from_slice(value);
                    shard.stats.record_hit();
                    return dst;
                }
                Some(Slot::Chunked(index)) => *index,
                _ => {
                    shard.stats.record_miss();
                    return dst;
                }
            }
        };

        let found = self.read_chunks(&mut dst, &index);
        let mut shard = self.shard(key).lock();
        if found {
            shard.stats.record_hit();
        } else {
            shard.stats.record_miss();
        }
        dst
    }

    fn del(&self, key: &[u8]) {
        let previous = self.shard(key).lock().take(&SlotKey::Key(key.to_vec()));
        if let Some(Slot::Chunked(index)) = previous {
            self.drop_chunks(&index);
        }
    }

    fn has(&self, key: &[u8]) -> bool {
        let index = match self.shard(key).lock().slots.peek(&SlotKey::Key(key.to_vec())) {
            Some(Slot::Chunked(index)) => *index,
            Some(_) => return true,
            None => return false,
        };
        self.chunks_present(&index)
    }

    fn reset(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
    }

    fn stats(&self) -> StoreStats {
        let mut total = StoreStats::new();
        for shard in self.shards.iter() {
            total += &shard.lock().stats();
        }
        total
    }
}
