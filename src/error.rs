//! Error types for the resource loader
//!
//! Provides unified error handling using thiserror.
//!
//! Cache lookups are not represented here: a miss is a normal `None`
//! result, never an error. Only the loading path can fail.

use reqwest::StatusCode;
use thiserror::Error;

// == Load Error Enum ==
/// Unified error type for resource loading.
///
/// Variants are `Clone` because a single in-flight fetch fans its outcome
/// out to every coalesced waiter verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The retrieval completed but the resource's status indicates failure
    #[error("bad response: status {0}")]
    BadResponse(StatusCode),

    /// The retrieval could not complete (connectivity, timeout, cancellation)
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        // Status errors are raised explicitly by the fetcher; anything
        // arriving through this conversion failed below the HTTP layer.
        LoadError::Transport(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the loading path.
pub type Result<T> = std::result::Result<T, LoadError>;
