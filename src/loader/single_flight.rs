//! Single-Flight Loader Module
//!
//! Wraps an underlying fetch operation and guarantees at most one in-flight
//! retrieval per key: concurrent requests for the same key share one
//! operation and observe its outcome identically.
//!
//! The retrieval runs in a spawned task, so no waiter's cancellation can
//! cancel it out from under the others; it runs to completion and cleans up
//! its own registry entry.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::error::{LoadError, Result};

// == Fetch Trait ==
/// An asynchronous byte retrieval keyed by identifier.
///
/// Implementations decide what an identifier means and how bytes are
/// obtained; the loader only coalesces calls.
pub trait Fetch: Send + Sync + 'static {
    /// Identifier for a retrievable resource.
    type Key: Eq + Hash + Clone + Send + Sync + 'static;

    /// Retrieves the bytes for `key`.
    fn fetch(&self, key: &Self::Key) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Outcome broadcast to every waiter of one in-flight fetch.
type Outcome = Result<Bytes>;

// == Single-Flight Loader ==
/// Deduplicates concurrent fetches of the same key.
///
/// The in-flight registry maps each key to the broadcast channel of its
/// running fetch. An entry is created by the first request for a key,
/// shared by every request that arrives while the fetch runs, and removed
/// exactly once by the fetch task itself.
pub struct SingleFlightLoader<F: Fetch> {
    fetcher: Arc<F>,
    inflight: Arc<Mutex<HashMap<F::Key, broadcast::Sender<Outcome>>>>,
}

impl<F: Fetch> SingleFlightLoader<F> {
    // == Constructor ==
    /// Wraps `fetcher` with request coalescing.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Fetch ==
    /// Retrieves the bytes for `key`, joining an in-flight fetch for the
    /// same key if one exists.
    ///
    /// Success and failure propagate identically to every waiter. No retry
    /// is performed; a failed fetch leaves no registry entry behind, so the
    /// caller may simply fetch again.
    pub async fn fetch(&self, key: &F::Key) -> Result<Bytes> {
        let mut rx = {
            let mut inflight = self.inflight.lock().await;
            match inflight.entry(key.clone()) {
                Entry::Occupied(entry) => {
                    debug!("joining in-flight fetch");
                    entry.get().subscribe()
                }
                Entry::Vacant(slot) => {
                    let (tx, rx) = broadcast::channel(1);
                    slot.insert(tx.clone());
                    self.spawn_fetch(key.clone(), tx);
                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(outcome) => outcome,
            // The fetch task dropped its channel without broadcasting;
            // surface a retryable failure instead of hanging.
            Err(_) => Err(LoadError::Transport(
                "fetch abandoned without a result".to_string(),
            )),
        }
    }

    /// Runs the underlying retrieval as an independent task.
    fn spawn_fetch(&self, key: F::Key, tx: broadcast::Sender<Outcome>) {
        let fetcher = Arc::clone(&self.fetcher);
        let inflight = Arc::clone(&self.inflight);

        tokio::spawn(async move {
            let outcome = fetcher.fetch(&key).await;

            // Deregister before broadcasting: a request arriving after this
            // point starts a fresh fetch instead of waiting on a completed
            // one that will never signal again.
            inflight.lock().await.remove(&key);

            // Send fails only when every waiter has gone away.
            let _ = tx.send(outcome);
        });
    }
}

impl<F: Fetch> Clone for SingleFlightLoader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            inflight: Arc::clone(&self.inflight),
        }
    }
}
