//! cacheman - A bounded in-memory byte cache with wildcard prefix deletion
//!
//! Wraps a fixed-capacity store with a key registry so that entries can be
//! deleted in bulk with patterns such as `user:*`.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheManager, CacheStore, ShardedStore};
pub use config::Config;
pub use error::{CacheError, Result};
