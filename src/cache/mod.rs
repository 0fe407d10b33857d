//! Cache Module
//!
//! In-memory validator storage with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod memory;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use memory::{MemoryStore, ValidatorStore};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Default store capacity
pub const DEFAULT_CAPACITY: usize = 10_000;
