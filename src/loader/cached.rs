//! Cached Loader Module
//!
//! The facade consumers use: check the cache, fetch on miss through the
//! single-flight loader, populate the cache, return the bytes.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Url;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, EvictionPolicy, LruPolicy, MemoryCache};
use crate::config::Config;
use crate::error::Result;
use crate::loader::{Fetch, HttpFetcher, SingleFlightLoader};

// == Cached Loader ==
/// Resource loader backed by a bounded in-memory cache.
///
/// The cache is one serialized resource; lookups update recency, so the
/// fast path takes the write lock too. The lock is never held across the
/// network fetch.
pub struct CachedLoader<F: Fetch, P> {
    cache: Arc<RwLock<MemoryCache<F::Key, Bytes, P>>>,
    loader: SingleFlightLoader<F>,
}

impl<F, P> CachedLoader<F, P>
where
    F: Fetch,
    P: EvictionPolicy<F::Key>,
{
    // == Constructor ==
    /// Creates a loader caching at most `max_entries` fetched resources.
    pub fn new(max_entries: usize, policy: P, fetcher: F) -> Self {
        Self {
            cache: Arc::new(RwLock::new(MemoryCache::new(max_entries, policy))),
            loader: SingleFlightLoader::new(fetcher),
        }
    }

    // == Load ==
    /// Returns the bytes for `key`, from cache or by fetching.
    ///
    /// A failed fetch stores nothing, so a later call retries cleanly.
    pub async fn load(&self, key: &F::Key) -> Result<Bytes> {
        if let Some(bytes) = self.cache.write().await.get(key) {
            return Ok(bytes);
        }

        let bytes = self.loader.fetch(key).await?;
        self.cache.write().await.insert(key.clone(), bytes.clone());

        Ok(bytes)
    }

    // == Cache Management ==
    /// Drops one cached resource.
    pub async fn evict(&self, key: &F::Key) {
        self.cache.write().await.remove(key);
    }

    /// Drops every cached resource.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}

impl<F: Fetch> CachedLoader<F, LruPolicy<F::Key>> {
    /// Creates a loader with LRU eviction.
    pub fn with_lru(max_entries: usize, fetcher: F) -> Self {
        Self::new(max_entries, LruPolicy::new(), fetcher)
    }
}

// == HTTP Loader ==
/// The common composition: HTTP transport with LRU eviction.
pub type HttpLoader = CachedLoader<HttpFetcher, LruPolicy<Url>>;

impl HttpLoader {
    /// Builds an HTTP loader from configuration.
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        Ok(Self::with_lru(
            config.max_entries,
            HttpFetcher::from_config(config)?,
        ))
    }
}
