//! Loader Module
//!
//! Resource loading with request coalescing: the single-flight core, the
//! HTTP transport, and the cache-backed facade composing the two.

mod cached;
mod http;
mod single_flight;

// Re-export public types
pub use cached::{CachedLoader, HttpLoader};
pub use http::HttpFetcher;
pub use single_flight::{Fetch, SingleFlightLoader};
