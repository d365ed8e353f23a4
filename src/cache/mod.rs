//! Cache Module
//!
//! Provides a bounded byte cache with a key registry for wildcard prefix
//! deletion.

mod manager;
mod pattern;
mod registry;
mod sharded;
mod stats;
mod store;


// Re-export public types
pub use manager::{CacheManager, DEFAULT_MAX_LENGTH};
pub use pattern::{KeyPattern, WILDCARD};
pub use registry::KeyRegistry;
pub use sharded::{ShardedStore, CHUNK_SIZE, MIN_SHARD_BYTES, SHARD_COUNT};
pub use stats::StoreStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum key length in bytes accepted by the HTTP API
pub const MAX_KEY_LENGTH: usize = 256;
