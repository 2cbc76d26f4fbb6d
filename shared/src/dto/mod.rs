//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! the wallet client and the backend via the REST API.
//!
//! ## Module Organization
//!
//! - [`auth`] - Login, registration, wallet-connect, third-party auth, profile
//! - [`transactions`] - Transaction listing, detail, recording, stats, execution, tracking
//! - [`contacts`] - Address book CRUD
//! - [`tokens`] - Token balances and prices
//! - [`chat`] - AI assistant processing, chat sessions and messages
//! - [`notifications`] - Notification feed, push tokens, preferences, price alerts
//! - [`payments`] - Payment requests
//!
//! ## Serialization Format
//!
//! - **Field naming**: camelCase on the wire (`walletAddress`, `createdAt`)
//! - **Optional fields**: Omitted when `None`
//! - **Enums**: lowercase strings, with an `Unknown` fallback for forward compatibility
//!
//! ## Example JSON Communication
//!
//! ```text
//! POST /api/users/refresh-token
//! Content-Type: application/json
//!
//! { "walletAddress": "0x9f2c...41aa" }
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK
//!
//! { "success": true, "data": { "token": "eyJhbGciOi..." } }
//! ```

pub mod auth;
pub mod chat;
pub mod contacts;
pub mod notifications;
pub mod payments;
pub mod tokens;
pub mod transactions;

pub use auth::*;
pub use chat::*;
pub use contacts::*;
pub use notifications::*;
pub use payments::*;
pub use tokens::*;
pub use transactions::*;
