//! # Auth Token Refresh
//!
//! Coordinates token refresh when requests come back `401 Unauthorized`.
//!
//! ## State Machine
//!
//! ```text
//!            401, eligible, cooldown elapsed
//!   Idle ───────────────────────────────────▶ Refreshing
//!    ▲                                            │
//!    │   success: persist token, wake waiters     │
//!    └────────  failure: reject waiters  ◀────────┘
//! ```
//!
//! The first eligible 401 leads the refresh. Every 401 that arrives while a
//! refresh is running queues a waiter and receives the same outcome, in
//! arrival order. A 401 inside the cooldown does not refresh again; if the
//! token it was sent with has since been replaced it is replayed with the
//! current one.
//!
//! The refresh call goes straight to the [`Transport`], outside the cache,
//! dedup and retry stages, with its own timeout.
//!
//! Logout and sign-in go through [`RefreshCoordinator::fence`], which bumps
//! the session epoch. A refresh that started under an older epoch neither
//! persists its token nor settles the waiters of a newer refresh.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use shared::{Envelope, RefreshTokenRequest};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::request::{RequestDescriptor, TransportRequest};
use crate::config::ClientConfig;
use crate::core::error::TransportError;
use crate::core::service::{KeyValueStore, Transport};
use crate::storage::{AUTH_TOKEN_KEY, WALLET_ADDRESS_KEY};

/// Endpoint that exchanges a wallet address for a fresh token.
pub const REFRESH_PATH: &str = "/api/users/refresh-token";

/// Structured error code the backend sends when the account behind a token is gone.
pub const ACCOUNT_NOT_FOUND_CODE: &str = "ACCOUNT_NOT_FOUND";

/// Why a token could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("No wallet address available for token refresh")]
    NoWalletAddress,

    /// The server answered but did not hand out a token.
    #[error("Token refresh rejected: {0}")]
    Rejected(String),

    #[error("Token refresh failed: {0}")]
    Transport(String),

    #[error("Token was refreshed too recently")]
    CoolingDown,

    /// The leading refresh was dropped before it settled.
    #[error("Token refresh was abandoned")]
    Abandoned,

    #[error("Token storage failed: {0}")]
    Store(String),
}

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

struct RefreshState {
    /// Bumped on every reset; a leader only acts while its epoch is current
    epoch: u64,
    refreshing: bool,
    last_refresh_at: Option<Instant>,
    waiters: VecDeque<Waiter>,
}

enum Role {
    Leader(u64),
    Follower(oneshot::Receiver<Result<String, RefreshError>>),
    CoolingDown,
}

/// Single-flight token refresh, one per client.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    /// Serializes token writes against session changes
    session_writes: tokio::sync::Mutex<()>,
    cooldown: Duration,
    timeout: Duration,
}

impl RefreshCoordinator {
    pub fn new(cooldown: Duration, timeout: Duration) -> Self {
        Self {
            state: Mutex::new(RefreshState {
                epoch: 0,
                refreshing: false,
                last_refresh_at: None,
                waiters: VecDeque::new(),
            }),
            session_writes: tokio::sync::Mutex::new(()),
            cooldown,
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.refresh_cooldown, config.refresh_timeout)
    }

    /// Whether a failed request may trigger a refresh.
    pub fn is_eligible(descriptor: &RequestDescriptor, error: &TransportError) -> bool {
        error.is_unauthorized() && descriptor.path != REFRESH_PATH && !is_account_not_found(error)
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Back to idle with no cooldown. Pending waiters are told the refresh was
    /// abandoned and a refresh still running will not persist its token.
    pub fn reset(&self) {
        let waiters = {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.refreshing = false;
            state.last_refresh_at = None;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(Err(RefreshError::Abandoned));
        }
    }

    /// Reset, then hold off token writes from refreshes until the returned
    /// guard is dropped. Session keys changed under the guard cannot be
    /// overwritten by a refresh that started before it.
    pub async fn fence(&self) -> SessionFence<'_> {
        let guard = self.session_writes.lock().await;
        self.reset();
        SessionFence { _guard: guard }
    }

    /// Get a token to replay a request that failed with 401.
    ///
    /// `sent_with` is the token the failed request carried. Leads a refresh,
    /// joins the running one, or inside the cooldown returns the current token
    /// when it differs from `sent_with`.
    pub async fn obtain_token(
        &self,
        transport: &dyn Transport,
        store: &dyn KeyValueStore,
        sent_with: Option<&str>,
    ) -> Result<String, RefreshError> {
        let role = {
            let mut state = self.state.lock();
            if state.refreshing {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Role::Follower(rx)
            } else if state
                .last_refresh_at
                .is_some_and(|at| at.elapsed() <= self.cooldown)
            {
                Role::CoolingDown
            } else {
                state.refreshing = true;
                state.last_refresh_at = Some(Instant::now());
                Role::Leader(state.epoch)
            }
        };

        match role {
            Role::Follower(rx) => {
                debug!("Waiting for in-flight token refresh");
                rx.await.unwrap_or(Err(RefreshError::Abandoned))
            }
            Role::CoolingDown => {
                let current = store
                    .get(AUTH_TOKEN_KEY)
                    .await
                    .map_err(|e| RefreshError::Store(e.to_string()))?
                    .filter(|token| !token.is_empty());
                match current {
                    Some(token) if Some(token.as_str()) != sent_with => Ok(token),
                    _ => Err(RefreshError::CoolingDown),
                }
            }
            Role::Leader(epoch) => {
                let guard = SettleGuard {
                    coordinator: self,
                    epoch,
                    settled: false,
                };
                let result = self.refresh(transport, store, epoch).await;
                guard.settle(result.clone());
                result
            }
        }
    }

    async fn refresh(
        &self,
        transport: &dyn Transport,
        store: &dyn KeyValueStore,
        epoch: u64,
    ) -> Result<String, RefreshError> {
        let wallet_address = store
            .get(WALLET_ADDRESS_KEY)
            .await
            .map_err(|e| RefreshError::Store(e.to_string()))?
            .filter(|address| !address.trim().is_empty())
            .ok_or(RefreshError::NoWalletAddress)?;

        let descriptor = RequestDescriptor::post(REFRESH_PATH)
            .json(&RefreshTokenRequest {
                wallet_address: wallet_address.clone(),
            })
            .map_err(|e| RefreshError::Transport(e.to_string()))?;
        let request = TransportRequest {
            descriptor,
            bearer: None,
            timeout: self.timeout,
        };

        let start = Instant::now();
        let response = tokio::time::timeout(self.timeout, transport.send(&request))
            .await
            .map_err(|_| RefreshError::Transport(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| RefreshError::Transport(e.to_string()))?;
        let body = response
            .into_result()
            .map_err(|e| RefreshError::Rejected(e.user_message()))?;

        let token = extract_token(body)?;
        {
            let _writes = self.session_writes.lock().await;
            if !self.is_current(epoch) {
                debug!("Session changed during token refresh, discarding token");
                return Err(RefreshError::Abandoned);
            }
            store
                .set(AUTH_TOKEN_KEY, &token)
                .await
                .map_err(|e| RefreshError::Store(e.to_string()))?;
        }

        info!(
            wallet = %shared::short_address(&wallet_address),
            duration_ms = start.elapsed().as_millis() as u64,
            "Auth token refreshed"
        );
        Ok(token)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.state.lock().epoch == epoch
    }

    /// Wake the waiters of the refresh led under `epoch`. A stale leader is a
    /// no-op: reset already released its waiters.
    fn settle(&self, epoch: u64, result: Result<String, RefreshError>) {
        let waiters = {
            let mut state = self.state.lock();
            if state.epoch != epoch {
                return;
            }
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        if let Err(error) = &result {
            warn!(error = %error, waiters = waiters.len(), "Token refresh failed");
        }
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

/// Settles the coordinator even if the leading future is dropped mid-refresh.
struct SettleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    epoch: u64,
    settled: bool,
}

impl SettleGuard<'_> {
    fn settle(mut self, result: Result<String, RefreshError>) {
        self.settled = true;
        self.coordinator.settle(self.epoch, result);
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(self.epoch, Err(RefreshError::Abandoned));
        }
    }
}

/// Held while session keys are rewritten; see [`RefreshCoordinator::fence`].
pub struct SessionFence<'a> {
    _guard: tokio::sync::MutexGuard<'a, ()>,
}

/// `data.token`, or a top-level `token`, from a refresh response.
fn extract_token(body: Value) -> Result<String, RefreshError> {
    let envelope = Envelope::from_body(body);
    if !envelope.success {
        return Err(RefreshError::Rejected(
            envelope
                .error_message()
                .unwrap_or("refresh unsuccessful")
                .to_string(),
        ));
    }

    envelope
        .data
        .as_ref()
        .and_then(|data| data.get("token"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or(envelope.token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| RefreshError::Rejected("response carried no token".to_string()))
}

/// The 401 means the account itself is gone, so refreshing cannot help.
///
/// The structured code decides when present; older backends only say so in text.
pub fn is_account_not_found(error: &TransportError) -> bool {
    if error.code() == Some(ACCOUNT_NOT_FOUND_CODE) {
        return true;
    }
    match error {
        TransportError::Status { message, .. } => {
            let message = message.to_lowercase();
            message.contains("account not found") || message.contains("user not found")
        }
        _ => false,
    }
}
