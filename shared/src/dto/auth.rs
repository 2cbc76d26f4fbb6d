//! # Authentication Data Transfer Objects
//!
//! Request and response structures for login, registration, wallet connection,
//! third-party sign-in, token refresh and the user profile.

use serde::{Deserialize, Serialize};

/// Email/password login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// New account registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

/// Sign in (or sign up) by proving control of a wallet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnectRequest {
    pub wallet_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Supported third-party identity providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Apple,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Google => "google",
            AuthProvider::Apple => "apple",
        }
    }
}

/// Third-party sign-in with a provider-issued identity token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyAuthRequest {
    pub id_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

/// Token refresh request, keyed by the wallet the session belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub wallet_address: String,
}

/// `data` of a successful refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshTokenData {
    pub token: String,
}

/// User information (public, safe to send to client)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// `data` of a successful login/register/wallet-connect/third-party auth
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: UserProfile,
    /// Some endpoints nest the token in `data`, others put it on the envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl AuthPayload {
    /// Wallet address for the session, preferring the explicit field.
    pub fn session_wallet(&self) -> Option<&str> {
        self.wallet_address
            .as_deref()
            .or(self.user.wallet_address.as_deref())
    }
}

/// Partial profile update; only `Some` fields are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_refresh_request_uses_camel_case() {
        let body = serde_json::to_value(RefreshTokenRequest {
            wallet_address: "0xabc".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"walletAddress": "0xabc"}));
    }

    #[test]
    fn test_session_wallet_prefers_explicit_field() {
        let payload: AuthPayload = serde_json::from_value(json!({
            "user": {"id": "u1", "username": "alice", "walletAddress": "0xuser"},
            "walletAddress": "0xexplicit"
        }))
        .unwrap();
        assert_eq!(payload.session_wallet(), Some("0xexplicit"));
    }

    #[test]
    fn test_profile_update_omits_unset_fields() {
        let body = serde_json::to_value(UpdateProfileRequest {
            display_name: Some("Al".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"displayName": "Al"}));
    }
}
