//! # Core Abstractions
//!
//! Error types and the service traits the client is built against.
//!
//! - **[`error`]**: [`TransportError`], [`StoreError`], [`ConfigError`], [`AppError`]
//! - **[`service`]**: [`Transport`] and [`KeyValueStore`] seams
//!
//! ## Dependency Injection
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wallet_client::config::ClientConfig;
//! use wallet_client::core::{KeyValueStore, Transport};
//! use wallet_client::services::api::{ApiClient, ReqwestTransport};
//! use wallet_client::storage::MemoryStore;
//!
//! let config = ClientConfig::default();
//! // In production: reqwest over the configured base URL
//! let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config).unwrap());
//! let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
//! let api = ApiClient::with_transport(config, transport, store);
//! // In tests: a scripted Transport implementation instead
//! ```

pub mod error;
pub mod service;

pub use error::{AppError, ConfigError, Result, StoreError, TransportError};
pub use service::{KeyValueStore, Transport};
