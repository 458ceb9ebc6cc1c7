//! Configuration Module
//!
//! Handles loading construction-time parameters from environment variables.

use std::env;

/// Loader configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of resources the cache can hold
    pub max_entries: usize,
    /// Request timeout in seconds for the HTTP fetcher
    pub fetch_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cached resources (default: 50)
    /// - `FETCH_TIMEOUT_SECS` - HTTP request timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 50,
            fetch_timeout_secs: 30,
        }
    }
}
