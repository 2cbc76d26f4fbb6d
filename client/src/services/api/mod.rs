//! # Backend API Client Module
//!
//! Resilient HTTP client for the wallet backend.
//!
//! ## Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs            - Module exports and documentation
//! ├── request.rs        - Request descriptors and fingerprints
//! ├── transport.rs      - reqwest transport (headers, timeout, bearer)
//! ├── cache.rs          - TTL + LRU response cache
//! ├── dedup.rs          - In-flight request sharing
//! ├── retry.rs          - Exponential backoff
//! ├── auth_refresh.rs   - Single-flight token refresh on 401
//! ├── client.rs         - ApiClient facade tying the stages together
//! ├── auth.rs           - Login, register, wallet connect, logout, profile
//! ├── transactions.rs   - Transaction list, detail, record, execute, track
//! ├── contacts.rs       - Address book
//! ├── tokens.rs         - Balances and prices
//! ├── chat.rs           - AI assistant and chat sessions
//! ├── notifications.rs  - Feed, push tokens, preferences, price alerts
//! └── payments.rs       - Payment requests
//! ```

pub mod auth;
pub mod auth_refresh;
pub mod cache;
pub mod chat;
pub mod client;
pub mod contacts;
pub mod dedup;
pub mod notifications;
pub mod payments;
pub mod request;
pub mod retry;
pub mod tokens;
pub mod transactions;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use auth_refresh::{RefreshCoordinator, RefreshError, REFRESH_PATH};
pub use cache::ResponseCache;
pub use client::ApiClient;
pub use dedup::DedupRegistry;
pub use request::{Method, RequestDescriptor, TransportRequest, TransportResponse};
pub use retry::RetryPolicy;
pub use transport::ReqwestTransport;
