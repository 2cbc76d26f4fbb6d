//! # Response Cache
//!
//! Caches successful GET envelopes by request fingerprint.
//!
//! ## Features
//! - Per-entry TTL, re-checked on every read
//! - Bounded size with least-recently-used eviction
//! - Background sweep of expired entries (memory hygiene only)
//! - Prefix invalidation after mutations of a resource
//! - Generation fence: a response fetched before an invalidation is never
//!   stored after it
//!
//! ## Example
//! ```no_run
//! # use std::time::Duration;
//! # use shared::Envelope;
//! # use wallet_client::services::api::ResponseCache;
//! let cache = ResponseCache::new(256);
//! cache.put("GET /api/contacts?#", "/api/contacts", Envelope::ok(serde_json::json!([])), Duration::from_secs(30));
//! assert!(cache.get("GET /api/contacts?#").is_some());
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use shared::Envelope;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// A cached response and its expiry bookkeeping.
struct CacheEntry {
    payload: Envelope<Value>,
    /// Request path, for prefix invalidation
    path: String,
    stored_at: Instant,
    ttl: Duration,
    /// Logical clock value of the last read or write
    last_access: u64,
}

impl CacheEntry {
    fn is_valid(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) <= self.ttl
    }
}

struct CacheState {
    entries: HashMap<String, CacheEntry>,
    clock: u64,
    /// Bumped by every clear or invalidation
    generation: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// Thread-safe response cache with TTL expiry and LRU eviction.
pub struct ResponseCache {
    state: Mutex<CacheState>,
    capacity: usize,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                clock: 0,
                generation: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Cached payload for `key`, if present and not expired.
    pub fn get(&self, key: &str) -> Option<Envelope<Value>> {
        let now = Instant::now();
        let mut state = self.state.lock();
        let tick = state.tick();

        let expired = match state.entries.get_mut(key) {
            Some(entry) if entry.is_valid(now) => {
                entry.last_access = tick;
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            state.entries.remove(key);
            debug!(key = %key, "Cache entry expired");
        }
        None
    }

    /// Store `payload` under `key`, evicting the least recently used entry when full.
    pub fn put(&self, key: impl Into<String>, path: impl Into<String>, payload: Envelope<Value>, ttl: Duration) {
        let mut state = self.state.lock();
        Self::insert(&mut state, self.capacity, key.into(), path.into(), payload, ttl);
    }

    fn insert(
        state: &mut CacheState,
        capacity: usize,
        key: String,
        path: String,
        payload: Envelope<Value>,
        ttl: Duration,
    ) {
        let tick = state.tick();

        if !state.entries.contains_key(&key) && state.entries.len() >= capacity {
            let now = Instant::now();
            // Prefer dropping something already expired over a live entry.
            let victim = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| (entry.is_valid(now), entry.last_access))
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                state.entries.remove(&victim);
                debug!(key = %victim, "Cache entry evicted");
            }
        }

        state.entries.insert(
            key,
            CacheEntry {
                payload,
                path,
                stored_at: Instant::now(),
                ttl,
                last_access: tick,
            },
        );
    }

    /// Current generation; pass it to [`put_if_current`](Self::put_if_current)
    /// once the response arrives.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// [`put`](Self::put), unless the cache was cleared or invalidated since
    /// `generation` was read. Returns whether the entry was stored.
    pub fn put_if_current(
        &self,
        generation: u64,
        key: impl Into<String>,
        path: impl Into<String>,
        payload: Envelope<Value>,
        ttl: Duration,
    ) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }
        Self::insert(&mut state, self.capacity, key.into(), path.into(), payload, ttl);
        true
    }

    /// Drop every entry whose request path starts with `prefix`. Returns how many were dropped.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut state = self.state.lock();
        state.generation += 1;
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.path.starts_with(prefix));
        before - state.entries.len()
    }

    /// Remove expired entries. Returns how many were removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| entry.is_valid(now));
        before - state.entries.len()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn the periodic sweep. The task holds only a weak reference and
    /// exits once the cache is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.remove_expired();
                if removed > 0 {
                    debug!(removed, remaining = cache.len(), "Swept expired cache entries");
                }
            }
        })
    }
}
