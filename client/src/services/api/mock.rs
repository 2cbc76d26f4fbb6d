//! Scripted [`Transport`] for tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::client::ApiClient;
use super::request::{TransportRequest, TransportResponse};
use crate::config::ClientConfig;
use crate::core::error::TransportError;
use crate::core::service::Transport;
use crate::storage::{MemoryStore, AUTH_TOKEN_KEY, WALLET_ADDRESS_KEY};

/// Canned outcome for one request.
pub(crate) struct Reply {
    result: Result<TransportResponse, TransportError>,
    delay: Duration,
}

impl Reply {
    pub(crate) fn json(status: u16, body: Value) -> Self {
        Self {
            result: Ok(TransportResponse::new(status, body)),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn no_response() -> Self {
        Self {
            result: Err(TransportError::NoResponse("connection refused".into())),
            delay: Duration::ZERO,
        }
    }

    /// Hold the reply back for `delay` of (tokio) time.
    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = Box<dyn Fn(&TransportRequest, usize) -> Reply + Send + Sync>;

/// Records every request and answers through a handler closure.
///
/// The handler also receives how many earlier requests hit the same path.
pub(crate) struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub(crate) fn new(
        handler: impl Fn(&TransportRequest, usize) -> Reply + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<TransportRequest> {
        self.calls.lock().clone()
    }

    /// Number of requests sent to `path`.
    pub(crate) fn count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.descriptor.path == path)
            .count()
    }

    /// Bearer tokens sent to `path`, in order.
    pub(crate) fn bearers(&self, path: &str) -> Vec<Option<String>> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.descriptor.path == path)
            .map(|call| call.bearer.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let previous = {
            let mut calls = self.calls.lock();
            let previous = calls
                .iter()
                .filter(|call| call.descriptor.path == request.descriptor.path)
                .count();
            calls.push(request.clone());
            previous
        };

        let reply = (self.handler)(request, previous);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

/// Client with default config over `transport` and `store`.
pub(crate) fn client_with(transport: Arc<MockTransport>, store: Arc<MemoryStore>) -> ApiClient {
    ApiClient::with_transport(ClientConfig::default(), transport, store)
}

/// Store holding token `T1` for wallet `0xabc`.
pub(crate) fn signed_in() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_entries([
        (AUTH_TOKEN_KEY, "T1"),
        (WALLET_ADDRESS_KEY, "0xabc"),
    ]))
}

/// `200 {success: true, data}`.
pub(crate) fn ok(data: Value) -> Reply {
    Reply::json(200, serde_json::json!({"success": true, "data": data}))
}
