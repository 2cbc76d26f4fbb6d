//! # API Client
//!
//! Request facade over the backend REST API.
//!
//! ## Pipeline
//!
//! ```text
//! perform(descriptor)
//!   │
//!   ├─ GET with a live cache entry ─────────────────▶ cached envelope
//!   ├─ identical request already in flight ─────────▶ shared result
//!   └─ owner task
//!        retry ─▶ bearer from store ─▶ transport
//!                   └─ 401 ─▶ refresh coordinator ─▶ replay once
//!        normalize ─▶ cache successful GET ─▶ release dedup entry
//! ```
//!
//! Every call resolves to an [`Envelope`]; network and server failures are
//! values with `success = false`, never panics or `Err`s.

use std::sync::Arc;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{Envelope, RefreshTokenData};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn, Instrument};
use uuid::Uuid;

use super::auth_refresh::{RefreshCoordinator, RefreshError};
use super::cache::ResponseCache;
use super::dedup::{DedupRegistry, ReleaseGuard};
use super::request::{RequestDescriptor, TransportRequest};
use super::retry::RetryPolicy;
use super::transport::ReqwestTransport;
use crate::config::ClientConfig;
use crate::core::error::{AppError, TransportError};
use crate::core::service::{KeyValueStore, Transport};
use crate::storage::AUTH_TOKEN_KEY;

/// HTTP client for communicating with the backend API server.
///
/// Cheap to clone; clones share the cache, in-flight registry and refresh
/// state.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    store: Arc<dyn KeyValueStore>,
    cache: Arc<ResponseCache>,
    dedup: Arc<DedupRegistry>,
    retry: RetryPolicy,
    refresh: RefreshCoordinator,
    sweeper: Option<JoinHandle<()>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

impl ApiClient {
    /// Client over the production reqwest transport.
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport, store))
    }

    /// Client over any [`Transport`].
    ///
    /// The cache sweep starts only when called inside a tokio runtime.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let cache = Arc::new(ResponseCache::new(config.cache_capacity));
        let sweeper = tokio::runtime::Handle::try_current()
            .ok()
            .map(|_| cache.spawn_sweeper(config.cache_sweep_interval));

        Self {
            inner: Arc::new(ClientInner {
                dedup: Arc::new(DedupRegistry::new(config.dedup_window)),
                retry: RetryPolicy::from_config(&config),
                refresh: RefreshCoordinator::from_config(&config),
                config,
                transport,
                store,
                cache,
                sweeper,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    pub(crate) fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.inner.refresh
    }

    /// Requests currently shared through the dedup registry.
    pub fn in_flight(&self) -> usize {
        self.inner.dedup.len()
    }

    /// Run one request through the full pipeline.
    #[tracing::instrument(
        name = "api_request",
        skip(self, descriptor),
        fields(
            request_id = %Uuid::new_v4(),
            method = %descriptor.method,
            path = %descriptor.path,
        )
    )]
    pub async fn perform(&self, descriptor: RequestDescriptor) -> Envelope<Value> {
        let key = descriptor.fingerprint();

        if descriptor.is_cacheable() {
            if let Some(hit) = self.inner.cache.get(&key) {
                debug!("Cache hit");
                return hit;
            }
        }

        let inner = self.inner.clone();
        let path = descriptor.path.clone();
        let (future, attached) = self.inner.dedup.attach_or_register(&key, &path, |id| {
            let guard = ReleaseGuard::new(inner.dedup.clone(), key.clone(), id);
            let cache_key = key.clone();
            // The owner runs detached so callers that give up do not cancel it
            // for the others.
            let task: JoinHandle<Envelope<Value>> = tokio::spawn(
                async move {
                    let _guard = guard;
                    inner.execute(descriptor, cache_key).await
                }
                .in_current_span(),
            );
            async move {
                task.await.unwrap_or_else(|e| {
                    error!(error = %e, "Request task failed");
                    Envelope::failure(format!("Request task failed: {}", e))
                })
            }
            .boxed()
            .shared()
        });

        if attached {
            debug!("Joined in-flight request");
        }
        future.await
    }

    /// [`perform`](Self::perform) and decode `data` into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Envelope<T> {
        self.perform(descriptor).await.decode()
    }

    /// [`fetch`](Self::fetch) a descriptor whose body may have failed to serialize.
    pub async fn submit<T: DeserializeOwned>(
        &self,
        descriptor: Result<RequestDescriptor, TransportError>,
    ) -> Envelope<T> {
        match descriptor {
            Ok(descriptor) => self.fetch(descriptor).await,
            Err(error) => error.into_envelope(),
        }
    }

    /// [`submit`](Self::submit) a mutation; on success drop cached reads under each prefix.
    pub async fn mutate<T: DeserializeOwned>(
        &self,
        descriptor: Result<RequestDescriptor, TransportError>,
        invalidates: &[&str],
    ) -> Envelope<T> {
        let envelope = self.submit(descriptor).await;
        if envelope.success {
            for prefix in invalidates {
                self.invalidate(prefix);
            }
        }
        envelope
    }

    /// Drop cached responses whose path starts with `prefix`. Reads of that
    /// resource already in flight are neither joined nor cached afterwards.
    pub fn invalidate(&self, prefix: &str) -> usize {
        self.inner.dedup.forget_prefix(prefix);
        let removed = self.inner.cache.invalidate_prefix(prefix);
        if removed > 0 {
            debug!(prefix, removed, "Invalidated cached responses");
        }
        removed
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    /// Forget every response cached or shared under the previous session.
    pub(crate) fn discard_session_state(&self) {
        self.inner.cache.clear();
        self.inner.dedup.clear();
    }

    /// Refresh the auth token now, through the same coordinator 401s use.
    pub async fn refresh_token(&self) -> Envelope<RefreshTokenData> {
        let inner = &self.inner;
        match inner
            .refresh
            .obtain_token(inner.transport.as_ref(), inner.store.as_ref(), None)
            .await
        {
            Ok(token) => Envelope {
                token: Some(token.clone()),
                ..Envelope::ok(RefreshTokenData { token })
            },
            Err(error) => Envelope::failure(error.to_string()),
        }
    }
}

impl ClientInner {
    async fn execute(&self, descriptor: RequestDescriptor, cache_key: String) -> Envelope<Value> {
        let start = Instant::now();
        let generation = self.cache.generation();
        let result = self
            .retry
            .execute(|_| self.send_authorized(&descriptor))
            .await;

        let envelope = match result {
            Ok(body) => Envelope::from_body(body),
            Err(error) => {
                warn!(
                    error = %error,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Request failed"
                );
                error.into_envelope()
            }
        };

        if descriptor.is_cacheable() && envelope.success {
            let stored = self.cache.put_if_current(
                generation,
                cache_key,
                descriptor.path.clone(),
                envelope.clone(),
                self.config.cache_ttl,
            );
            if !stored {
                debug!("Cache invalidated while in flight, response not cached");
            }
        }

        debug!(
            success = envelope.success,
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );
        envelope
    }

    /// One attempt: send with the stored token, and on an eligible 401 replay
    /// once with a refreshed one. The replay never triggers another refresh.
    async fn send_authorized(&self, descriptor: &RequestDescriptor) -> Result<Value, TransportError> {
        let token = self.current_token().await;

        let unauthorized = match self.dispatch(descriptor, token.clone()).await {
            Err(error) if RefreshCoordinator::is_eligible(descriptor, &error) => error,
            other => return other,
        };

        match self
            .refresh
            .obtain_token(self.transport.as_ref(), self.store.as_ref(), token.as_deref())
            .await
        {
            Ok(fresh) => {
                debug!("Replaying request with refreshed token");
                self.dispatch(descriptor, Some(fresh)).await
            }
            Err(RefreshError::CoolingDown) => {
                debug!("Token refreshed recently, surfacing 401");
                Err(unauthorized)
            }
            Err(error) => {
                warn!(error = %error, "Could not refresh token, surfacing 401");
                Err(unauthorized)
            }
        }
    }

    async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        bearer: Option<String>,
    ) -> Result<Value, TransportError> {
        let request = TransportRequest {
            descriptor: descriptor.clone(),
            bearer,
            timeout: self.config.request_timeout,
        };
        self.transport.send(&request).await?.into_result()
    }

    async fn current_token(&self) -> Option<String> {
        match self.store.get(AUTH_TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(error) => {
                warn!(error = %error, "Failed to read auth token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NO_RESPONSE_MESSAGE;
    use crate::services::api::auth_refresh::REFRESH_PATH;
    use crate::services::api::mock::{client_with, ok, signed_in, MockTransport, Reply};
    use crate::storage::{MemoryStore, WALLET_ADDRESS_KEY};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::Instant;

    /// 401 for anything sent with T1, success with T2, refresh hands out T2.
    fn expiring_token_backend(refresh_delay: Duration) -> Arc<MockTransport> {
        MockTransport::new(move |request, _| {
            if request.descriptor.path == REFRESH_PATH {
                return ok(json!({"token": "T2"})).after(refresh_delay);
            }
            match request.bearer.as_deref() {
                Some("T2") => ok(json!({"path": request.descriptor.path})),
                _ => Reply::json(401, json!({"success": false, "error": "Token expired"})),
            }
        })
    }

    // ========== Cache Tests ==========

    #[tokio::test(start_paused = true)]
    async fn test_second_get_within_ttl_served_from_cache() {
        let transport = MockTransport::new(|_, n| ok(json!({"n": n})));
        let client = client_with(transport.clone(), signed_in());

        let first = client.perform(RequestDescriptor::get("/api/contacts")).await;
        let second = client.perform(RequestDescriptor::get("/api/contacts")).await;

        assert_eq!(first, second);
        assert_eq!(transport.count("/api/contacts"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expires_after_ttl() {
        let transport = MockTransport::new(|_, n| ok(json!({"n": n})));
        let client = client_with(transport.clone(), signed_in());

        client.perform(RequestDescriptor::get("/api/contacts")).await;
        tokio::time::advance(Duration::from_secs(31)).await;
        let refetched = client.perform(RequestDescriptor::get("/api/contacts")).await;

        assert_eq!(transport.count("/api/contacts"), 2);
        assert_eq!(refetched.data, Some(json!({"n": 1})));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_and_mutations_not_cached() {
        let transport = MockTransport::new(|request, _| match request.descriptor.path.as_str() {
            "/api/missing" => Reply::json(404, json!({"success": false, "error": "Not found"})),
            _ => ok(json!({"id": "c1"})),
        });
        let client = client_with(transport.clone(), signed_in());

        client.perform(RequestDescriptor::get("/api/missing")).await;
        client.perform(RequestDescriptor::get("/api/missing")).await;
        client.perform(RequestDescriptor::post("/api/contacts")).await;
        tokio::time::advance(Duration::from_secs(2)).await;
        client.perform(RequestDescriptor::post("/api/contacts")).await;

        assert_eq!(transport.count("/api/missing"), 2);
        assert_eq!(transport.count("/api/contacts"), 2);
        assert!(client.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_false_envelope_not_cached() {
        let transport = MockTransport::new(|_, _| {
            Reply::json(200, json!({"success": false, "error": "Maintenance"}))
        });
        let client = client_with(transport.clone(), signed_in());

        let envelope = client.perform(RequestDescriptor::get("/api/tokens/prices")).await;
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Maintenance"));
        assert!(client.cache().is_empty());
    }

    // ========== Dedup Tests ==========

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_identical_calls_share_one_request() {
        let transport = MockTransport::new(|_, n| {
            ok(json!({"n": n})).after(Duration::from_millis(200))
        });
        let client = client_with(transport.clone(), signed_in());

        let calls = (0..5).map(|_| {
            let client = client.clone();
            async move {
                client
                    .perform(RequestDescriptor::post("/api/ai/process").with_body(json!({"command": "balance"})))
                    .await
            }
        });
        let results = futures::future::join_all(calls).await;

        assert_eq!(transport.count("/api/ai/process"), 1);
        assert!(results.iter().all(|r| *r == results[0]));
        assert!(results[0].success);
        assert_eq!(client.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_bodies_not_shared() {
        let transport = MockTransport::new(|_, _| ok(json!({})).after(Duration::from_millis(50)));
        let client = client_with(transport.clone(), signed_in());

        tokio::join!(
            client.perform(RequestDescriptor::post("/api/ai/process").with_body(json!({"command": "a"}))),
            client.perform(RequestDescriptor::post("/api/ai/process").with_body(json!({"command": "b"}))),
        );
        assert_eq!(transport.count("/api/ai/process"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_released_after_failure() {
        let transport = MockTransport::new(|_, _| Reply::json(400, json!({"error": "Bad input"})));
        let client = client_with(transport.clone(), signed_in());

        let envelope = client.perform(RequestDescriptor::post("/api/contacts")).await;
        assert_eq!(envelope.error.as_deref(), Some("Bad input"));
        assert_eq!(client.in_flight(), 0);

        client.perform(RequestDescriptor::post("/api/contacts")).await;
        assert_eq!(transport.count("/api/contacts"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_caller_does_not_cancel_shared_request() {
        let transport = MockTransport::new(|_, _| ok(json!("done")).after(Duration::from_millis(200)));
        let client = client_with(transport.clone(), signed_in());

        let first = {
            let client = client.clone();
            tokio::spawn(async move { client.perform(RequestDescriptor::get("/api/contacts")).await })
        };
        tokio::task::yield_now().await;
        let second = {
            let client = client.clone();
            tokio::spawn(async move { client.perform(RequestDescriptor::get("/api/contacts")).await })
        };
        tokio::task::yield_now().await;

        first.abort();
        let envelope = second.await.unwrap();
        assert_eq!(envelope.data, Some(json!("done")));
        assert_eq!(transport.count("/api/contacts"), 1);
    }

    // ========== Retry Tests ==========

    #[tokio::test(start_paused = true)]
    async fn test_server_error_retried_then_normalized() {
        let transport = MockTransport::new(|_, _| {
            Reply::json(503, json!({"success": false, "error": "Service unavailable"}))
        });
        let client = client_with(transport.clone(), signed_in());
        let start = Instant::now();

        let envelope = client.perform(RequestDescriptor::get("/api/transactions")).await;

        assert_eq!(transport.count("/api/transactions"), 4);
        assert_eq!(start.elapsed().as_secs(), 7);
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Service unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_response_normalized() {
        let transport = MockTransport::new(|_, _| Reply::no_response());
        let client = client_with(transport.clone(), signed_in());

        let envelope = client.perform(RequestDescriptor::get("/api/contacts")).await;

        assert_eq!(transport.count("/api/contacts"), 4);
        assert_eq!(envelope, Envelope::failure(NO_RESPONSE_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_error_surfaced_immediately() {
        let transport = MockTransport::new(|_, _| {
            Reply::json(404, json!({"success": false, "error": "Contact not found", "code": "NOT_FOUND"}))
        });
        let client = client_with(transport.clone(), signed_in());

        let envelope = client.perform(RequestDescriptor::get("/api/contacts/c9")).await;

        assert_eq!(transport.count("/api/contacts/c9"), 1);
        assert_eq!(envelope.error.as_deref(), Some("Contact not found"));
        assert_eq!(envelope.code.as_deref(), Some("NOT_FOUND"));
    }

    // ========== Auth Refresh Tests ==========

    #[tokio::test(start_paused = true)]
    async fn test_expired_token_refreshed_and_request_replayed() {
        let transport = expiring_token_backend(Duration::ZERO);
        let store = signed_in();
        let client = client_with(transport.clone(), store.clone());

        let envelope = client
            .perform(RequestDescriptor::get("/api/transactions").query("page", 1))
            .await;

        assert!(envelope.success);
        assert_eq!(envelope.data, Some(json!({"path": "/api/transactions"})));
        assert_eq!(
            transport.bearers("/api/transactions"),
            vec![Some("T1".to_string()), Some("T2".to_string())]
        );
        assert_eq!(transport.count(REFRESH_PATH), 1);
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(), Some("T2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_401s_share_one_refresh() {
        let transport = expiring_token_backend(Duration::from_millis(100));
        let client = client_with(transport.clone(), signed_in());

        let (contacts, history) = tokio::join!(
            client.perform(RequestDescriptor::get("/api/contacts")),
            client.perform(RequestDescriptor::get("/api/transactions/history")),
        );

        assert!(contacts.success);
        assert!(history.success);
        assert_eq!(transport.count(REFRESH_PATH), 1);
        assert_eq!(transport.bearers("/api/contacts").last(), Some(&Some("T2".to_string())));
        assert_eq!(
            transport.bearers("/api/transactions/history").last(),
            Some(&Some("T2".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_401_after_refresh_replayed_with_current_token() {
        let transport = expiring_token_backend(Duration::ZERO);
        let client = client_with(transport.clone(), signed_in());

        // The second request was sent with T1 but its 401 lands after the refresh.
        client.perform(RequestDescriptor::get("/api/contacts")).await;
        let inner = &client.inner;
        let late = inner
            .refresh
            .obtain_token(inner.transport.as_ref(), inner.store.as_ref(), Some("T1"))
            .await;

        assert_eq!(late, Ok("T2".to_string()));
        assert_eq!(transport.count(REFRESH_PATH), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_wallet_surfaces_original_401() {
        let transport = expiring_token_backend(Duration::ZERO);
        let store = Arc::new(MemoryStore::with_entries([(AUTH_TOKEN_KEY, "T1")]));
        let client = client_with(transport.clone(), store.clone());

        let envelope = client.perform(RequestDescriptor::get("/api/contacts")).await;

        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Token expired"));
        assert_eq!(transport.count(REFRESH_PATH), 0);
        assert_eq!(transport.count("/api/contacts"), 1);
        assert!(!client.refresh_coordinator().is_refreshing());

        // Wallet restored and cooldown passed: the next 401 refreshes.
        store.set(WALLET_ADDRESS_KEY, "0xabc").await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        let envelope = client.perform(RequestDescriptor::get("/api/contacts")).await;
        assert!(envelope.success);
        assert_eq!(transport.count(REFRESH_PATH), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_not_found_skips_refresh() {
        let transport = MockTransport::new(|_, _| {
            Reply::json(401, json!({"success": false, "error": "Unauthorized", "code": "ACCOUNT_NOT_FOUND"}))
        });
        let client = client_with(transport.clone(), signed_in());

        let envelope = client.perform(RequestDescriptor::get("/api/users/profile")).await;

        assert_eq!(envelope.code.as_deref(), Some("ACCOUNT_NOT_FOUND"));
        assert_eq!(transport.count(REFRESH_PATH), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_401_not_refreshed_again() {
        // Refresh succeeds but the server still rejects the new token.
        let transport = MockTransport::new(|request, _| {
            if request.descriptor.path == REFRESH_PATH {
                ok(json!({"token": "T2"}))
            } else {
                Reply::json(401, json!({"error": "Token expired"}))
            }
        });
        let client = client_with(transport.clone(), signed_in());

        let envelope = client.perform(RequestDescriptor::get("/api/contacts")).await;

        assert_eq!(envelope.error.as_deref(), Some("Token expired"));
        assert_eq!(transport.count(REFRESH_PATH), 1);
        assert_eq!(transport.count("/api/contacts"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_token_on_demand() {
        let transport = expiring_token_backend(Duration::ZERO);
        let client = client_with(transport.clone(), signed_in());

        let envelope = client.refresh_token().await;
        assert_eq!(envelope.data.map(|d| d.token), Some("T2".to_string()));
        assert_eq!(envelope.token.as_deref(), Some("T2"));
    }

    // ========== Decode Tests ==========

    #[tokio::test(start_paused = true)]
    async fn test_fetch_decode_failure_becomes_envelope() {
        let transport = MockTransport::new(|_, _| ok(json!({"unexpected": true})));
        let client = client_with(transport, signed_in());

        let envelope: Envelope<Vec<String>> = client.fetch(RequestDescriptor::get("/api/contacts")).await;
        assert!(!envelope.success);
        assert!(envelope.error.unwrap().starts_with("Failed to parse response"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutate_invalidates_prefix_on_success() {
        let transport = MockTransport::new(|_, n| ok(json!({"n": n})));
        let client = client_with(transport.clone(), signed_in());

        client.perform(RequestDescriptor::get("/api/contacts")).await;
        assert_eq!(client.cache().len(), 1);

        let created: Envelope<Value> = client
            .mutate(RequestDescriptor::post("/api/contacts").json(&json!({"name": "A"})), &["/api/contacts"])
            .await;
        assert!(created.success);
        assert!(client.cache().is_empty());
    }

    // ========== Session Boundary Tests ==========

    /// Let spawned tasks run until a request to `path` reaches the transport.
    async fn until_sent(transport: &MockTransport, path: &str) {
        while transport.count(path) == 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_in_flight_at_logout_is_not_cached() {
        let transport = MockTransport::new(|request, n| match request.descriptor.path.as_str() {
            "/api/users/logout" => ok(Value::Null),
            _ => ok(json!({"owner": request.bearer, "n": n})).after(Duration::from_millis(500)),
        });
        let client = client_with(transport.clone(), signed_in());

        let earlier = {
            let client = client.clone();
            tokio::spawn(async move { client.perform(RequestDescriptor::get("/api/contacts")).await })
        };
        until_sent(&transport, "/api/contacts").await;
        client.logout().await;

        let earlier = earlier.await.unwrap();
        assert_eq!(earlier.data, Some(json!({"owner": "T1", "n": 0})));
        assert!(client.cache().is_empty());

        let after = client.perform(RequestDescriptor::get("/api/contacts")).await;
        assert_eq!(after.data, Some(json!({"owner": null, "n": 1})));
        assert_eq!(transport.bearers("/api/contacts"), vec![Some("T1".to_string()), None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_does_not_join_previous_request() {
        let transport = MockTransport::new(|request, _| match request.descriptor.path.as_str() {
            "/api/users/login" => ok(json!({"user": {"id": "u9"}, "token": "B1"})),
            _ => ok(json!({"owner": request.bearer})).after(Duration::from_millis(500)),
        });
        let client = client_with(transport.clone(), signed_in());

        let earlier = {
            let client = client.clone();
            tokio::spawn(async move { client.perform(RequestDescriptor::get("/api/contacts")).await })
        };
        until_sent(&transport, "/api/contacts").await;
        assert!(client.login("bob@example.com", "hunter2").await.success);

        let mine = client.perform(RequestDescriptor::get("/api/contacts")).await;
        assert_eq!(mine.data, Some(json!({"owner": "B1"})));
        assert_eq!(earlier.await.unwrap().data, Some(json!({"owner": "T1"})));
        assert_eq!(transport.count("/api/contacts"), 2);

        // Only the new session's response is cached.
        let cached = client.perform(RequestDescriptor::get("/api/contacts")).await;
        assert_eq!(cached.data, Some(json!({"owner": "B1"})));
        assert_eq!(transport.count("/api/contacts"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_during_refresh_stays_logged_out() {
        let transport = MockTransport::new(|request, _| match request.descriptor.path.as_str() {
            REFRESH_PATH => ok(json!({"token": "T2"})).after(Duration::from_millis(500)),
            "/api/users/logout" => ok(Value::Null),
            _ => match request.bearer.as_deref() {
                Some("T2") => ok(json!("secret")),
                _ => Reply::json(401, json!({"success": false, "error": "Token expired"})),
            },
        });
        let store = signed_in();
        let client = client_with(transport.clone(), store.clone());

        let pending = {
            let client = client.clone();
            tokio::spawn(async move { client.perform(RequestDescriptor::get("/api/contacts")).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(client.refresh_coordinator().is_refreshing());
        client.logout().await;

        let envelope = pending.await.unwrap();
        assert!(!envelope.success);
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(WALLET_ADDRESS_KEY).await.unwrap(), None);
        assert!(!client.refresh_coordinator().is_refreshing());
        assert!(client.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_in_flight_during_mutation_is_not_cached() {
        let transport = MockTransport::new(|request, n| match request.descriptor.method.as_str() {
            "GET" => ok(json!({"n": n})).after(Duration::from_millis(200)),
            _ => ok(json!({"id": "c2"})),
        });
        let client = client_with(transport.clone(), signed_in());

        let earlier = {
            let client = client.clone();
            tokio::spawn(async move { client.perform(RequestDescriptor::get("/api/contacts")).await })
        };
        until_sent(&transport, "/api/contacts").await;

        let created: Envelope<Value> = client
            .mutate(RequestDescriptor::post("/api/contacts").json(&json!({"name": "B"})), &["/api/contacts"])
            .await;
        assert!(created.success);

        // Issued after the mutation: must not join the older read.
        let fresh = client.perform(RequestDescriptor::get("/api/contacts")).await;
        assert_eq!(fresh.data, Some(json!({"n": 2})));
        assert_eq!(earlier.await.unwrap().data, Some(json!({"n": 0})));

        let cached = client.perform(RequestDescriptor::get("/api/contacts")).await;
        assert_eq!(cached.data, Some(json!({"n": 2})));
        assert_eq!(transport.count("/api/contacts"), 3);
    }
}
