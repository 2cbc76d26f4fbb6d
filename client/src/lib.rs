//! # Wallet Client - Library Root
//!
//! Resilient HTTP client for a crypto-wallet and chat backend.
//!
//! ## Features
//!
//! - **Typed endpoints**: auth, profile, transactions, contacts, tokens, AI chat,
//!   notifications and payment requests, all returning [`shared::Envelope`]
//! - **Response cache**: successful GETs cached with a TTL and LRU bound
//! - **Request dedup**: identical concurrent calls share one round trip
//! - **Retry**: exponential backoff on network failures, 5xx and 429
//! - **Token refresh**: one refresh per burst of 401s, requests replayed after it
//!
//! ## Module Structure
//!
//! - **config**: [`ClientConfig`] from environment variables
//! - **core**: error types and the `Transport` / `KeyValueStore` seams
//! - **logging**: tracing subscriber with a rolling file appender
//! - **services**: the API client and its pipeline stages
//! - **storage**: in-memory and file-backed key-value stores
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wallet_client::{ApiClient, ClientConfig};
//! use wallet_client::storage::MemoryStore;
//!
//! # async fn run() -> wallet_client::Result<()> {
//! let api = ApiClient::new(ClientConfig::from_env()?, Arc::new(MemoryStore::new()))?;
//! let prices = api.get_token_prices(&["ETH", "USDC"]).await;
//! if let Some(prices) = prices.data {
//!     println!("{} prices", prices.prices.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod services;
pub mod storage;

pub use crate::config::ClientConfig;
pub use crate::core::{AppError, Result};
pub use services::api::ApiClient;
