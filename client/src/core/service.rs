//! # Service Traits
//!
//! Seams for dependency injection. The API client talks to the network only
//! through [`Transport`] and to persistent storage only through
//! [`KeyValueStore`], so tests swap in scripted implementations.

use async_trait::async_trait;

use crate::core::error::{StoreError, TransportError};
use crate::services::api::request::{TransportRequest, TransportResponse};

/// One raw HTTP exchange.
///
/// Implementations return `Ok` for every response the server produced,
/// whatever its status; `Err` is reserved for "no response" and local faults.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// String key-value persistence (auth token, wallet marker, local preferences).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}
