//! Cache Module
//!
//! Provides an in-memory bounded cache with pluggable eviction.
//!
//! The store and its policy form a single shared resource: wrap a
//! [`MemoryCache`] in `Arc<RwLock<_>>` for concurrent use.

mod eviction;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use eviction::EvictionPolicy;
pub use lru::LruPolicy;
pub use stats::CacheStats;
pub use store::MemoryCache;
