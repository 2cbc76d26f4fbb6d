//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the wallet client and the backend API.
//! All DTOs use JSON serialization via `serde` for API communication.
//!
//! ## Structure
//!
//! - **[`envelope`]**: The `{success, data, error, message, token}` wrapper every endpoint returns
//! - **[`dto`]**: Data Transfer Objects for API communication
//!   - **[`dto::auth`]**: Login, registration, wallet-connect and profile DTOs
//!   - **[`dto::transactions`]**: Transaction listing, recording and execution
//!   - **[`dto::contacts`]**: Address book entries
//!   - **[`dto::tokens`]**: Token balances and prices
//!   - **[`dto::chat`]**: AI assistant and chat sessions
//!   - **[`dto::notifications`]**: Notifications, push tokens, preferences, price alerts
//!   - **[`dto::payments`]**: Payment requests
//! - **[`deep_link`]**: Typed destinations decoded from push notification payloads
//! - **[`utils`]**: Address and token masking for logs and display
//!
//! ## Wire Format
//!
//! The backend speaks camelCase JSON, so every DTO carries
//! `#[serde(rename_all = "camelCase")]`:
//! - Optional fields are omitted from JSON when `None`
//! - Unknown enum values decode to an `Unknown` variant instead of failing
//!
//! ## Usage
//!
//! ```rust
//! use shared::envelope::Envelope;
//! use shared::dto::contacts::Contact;
//!
//! let raw = r#"{"success":true,"data":{"id":"c1","name":"Alice","walletAddress":"0xabc"}}"#;
//! let envelope: Envelope<serde_json::Value> = serde_json::from_str(raw).unwrap();
//! let contact: Envelope<Contact> = envelope.decode();
//! assert_eq!(contact.data.unwrap().name, "Alice");
//! ```

pub mod deep_link;
pub mod dto;
pub mod envelope;
pub mod utils;

pub use deep_link::Destination;
pub use dto::*;
pub use envelope::Envelope;
pub use utils::*;
