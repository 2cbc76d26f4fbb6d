//! # Key-Value Storage
//!
//! Persistent string storage behind the [`KeyValueStore`](crate::core::KeyValueStore)
//! trait.
//!
//! - [`MemoryStore`]: process-local map, used by tests and short-lived tools
//! - [`FileStore`]: JSON file on disk, written through on every change
//! - [`AuthSession`]: typed view over the token and wallet-address keys

mod file;
mod memory;
mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::AuthSession;

/// Bearer token of the signed-in user.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Wallet address the session belongs to; required for token refresh.
pub const WALLET_ADDRESS_KEY: &str = "current_wallet_address";
/// Last notification preferences saved on this device.
pub const PREFERENCES_KEY: &str = "notification_preferences";
