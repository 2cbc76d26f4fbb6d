//! # In-Flight Request Deduplication
//!
//! Collapses bursts of identical calls (several screens asking for the same
//! resource in the same tick) into one network round trip. The first caller
//! registers a [`SharedResponse`]; callers arriving within the dedup window
//! await a clone of it instead of issuing their own request.
//!
//! An entry older than the window is stale: it is dropped and the caller
//! issues a fresh request, even if the old one is still running.
//!
//! The owning request runs as its own task and releases its entry through a
//! [`ReleaseGuard`] when it finishes, successfully or not.
//!
//! Entries are forgotten early when their resource is mutated or the session
//! changes, so later callers never join a request made under the old state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use serde_json::Value;
use shared::Envelope;
use tokio::time::Instant;

/// In-flight response that any number of callers can await.
pub type SharedResponse = Shared<BoxFuture<'static, Envelope<Value>>>;

struct PendingEntry {
    id: u64,
    /// Request path, for prefix invalidation
    path: String,
    future: SharedResponse,
    started_at: Instant,
}

struct DedupState {
    entries: HashMap<String, PendingEntry>,
    next_id: u64,
}

/// Registry of in-flight requests keyed by fingerprint.
pub struct DedupRegistry {
    window: Duration,
    state: Mutex<DedupState>,
}

impl DedupRegistry {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: Mutex::new(DedupState {
                entries: HashMap::new(),
                next_id: 0,
            }),
        }
    }

    /// Live in-flight future for `key`. A stale entry is removed and `None` returned.
    pub fn try_attach(&self, key: &str) -> Option<SharedResponse> {
        let mut state = self.state.lock();
        Self::live_entry(&mut state, key, self.window)
    }

    /// Register `future` as the in-flight request for `key`, replacing any
    /// previous entry. Returns the entry id to pass to [`release`](Self::release).
    pub fn register(
        &self,
        key: impl Into<String>,
        path: impl Into<String>,
        future: SharedResponse,
    ) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.entries.insert(
            key.into(),
            PendingEntry {
                id,
                path: path.into(),
                future,
                started_at: Instant::now(),
            },
        );
        id
    }

    /// Remove the entry for `key` if it is still the one registered as `id`.
    pub fn release(&self, key: &str, id: u64) {
        let mut state = self.state.lock();
        if state.entries.get(key).map(|e| e.id) == Some(id) {
            state.entries.remove(key);
        }
    }

    /// Attach to a live entry, or build and register a new one, under one lock.
    ///
    /// `make` receives the id the new entry will be registered under. Returns
    /// the future and whether it was an existing one.
    pub fn attach_or_register(
        &self,
        key: &str,
        path: &str,
        make: impl FnOnce(u64) -> SharedResponse,
    ) -> (SharedResponse, bool) {
        let mut state = self.state.lock();
        if let Some(existing) = Self::live_entry(&mut state, key, self.window) {
            return (existing, true);
        }

        let id = state.next_id;
        state.next_id += 1;
        let future = make(id);
        state.entries.insert(
            key.to_string(),
            PendingEntry {
                id,
                path: path.to_string(),
                future: future.clone(),
                started_at: Instant::now(),
            },
        );
        (future, false)
    }

    /// Stop sharing requests whose path starts with `prefix`. They keep
    /// running for the callers already attached. Returns how many were dropped.
    pub fn forget_prefix(&self, prefix: &str) -> usize {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.path.starts_with(prefix));
        before - state.entries.len()
    }

    /// Stop sharing every in-flight request.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_entry(state: &mut DedupState, key: &str, window: Duration) -> Option<SharedResponse> {
        let stale = match state.entries.get(key) {
            Some(entry) if entry.started_at.elapsed() <= window => {
                return Some(entry.future.clone());
            }
            Some(_) => true,
            None => false,
        };
        if stale {
            state.entries.remove(key);
            tracing::debug!(key = %key, "Dropped stale in-flight entry");
        }
        None
    }
}

/// Releases a dedup entry when the owning future completes or is dropped.
pub(crate) struct ReleaseGuard {
    registry: Arc<DedupRegistry>,
    key: String,
    id: u64,
}

impl ReleaseGuard {
    pub(crate) fn new(registry: Arc<DedupRegistry>, key: String, id: u64) -> Self {
        Self { registry, key, id }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.registry.release(&self.key, self.id);
    }
}
