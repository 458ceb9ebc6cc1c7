//! rescache - A lightweight in-memory LRU cache with a request-coalescing
//! resource loader
//!
//! Combines a bounded key/value cache with pluggable eviction and a
//! single-flight loader, so redundant fetches of the same resource are
//! avoided and memory stays bounded.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;

pub use cache::{CacheStats, EvictionPolicy, LruPolicy, MemoryCache};
pub use config::Config;
pub use error::{LoadError, Result};
pub use loader::{CachedLoader, Fetch, HttpFetcher, HttpLoader, SingleFlightLoader};
