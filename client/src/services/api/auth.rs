//! # Authentication Endpoints
//!
//! Login, registration, wallet connection, third-party sign-in, logout and the
//! user profile. Successful sign-ins persist the session token and wallet
//! address so later requests and token refreshes can use them.

use serde_json::Value;
use shared::{
    AuthPayload, AuthProvider, Envelope, LoginRequest, RegisterRequest, ThirdPartyAuthRequest,
    UpdateProfileRequest, UserProfile, WalletConnectRequest,
};
use tracing::{info, warn};

use super::client::ApiClient;
use super::request::RequestDescriptor;
use crate::storage::{AuthSession, PREFERENCES_KEY};

pub const PROFILE_PATH: &str = "/api/users/profile";

impl ApiClient {
    /// Login with email and password.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Envelope<AuthPayload> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let envelope = self
            .submit(RequestDescriptor::post("/api/users/login").json(&request))
            .await;
        self.start_session(envelope).await
    }

    /// Create an account.
    #[tracing::instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Envelope<AuthPayload> {
        let envelope = self
            .submit(RequestDescriptor::post("/api/users/register").json(request))
            .await;
        self.start_session(envelope).await
    }

    /// Sign in by wallet. The wallet address doubles as the session's refresh key.
    #[tracing::instrument(
        skip(self, request),
        fields(wallet = %shared::short_address(&request.wallet_address))
    )]
    pub async fn wallet_connect(&self, request: &WalletConnectRequest) -> Envelope<AuthPayload> {
        let envelope = self
            .submit(RequestDescriptor::post("/api/users/wallet-connect").json(request))
            .await;
        let envelope = self.start_session(envelope).await;

        // Older backends omit the wallet from the payload; keep the one we connected with.
        if envelope.success {
            let session = AuthSession {
                token: None,
                wallet_address: Some(request.wallet_address.clone()),
            };
            let missing_wallet = envelope
                .data
                .as_ref()
                .map_or(true, |payload| payload.session_wallet().is_none());
            if missing_wallet {
                if let Err(e) = session.save(self.store().as_ref()).await {
                    warn!(error = %e, "Failed to store wallet address");
                }
            }
        }
        envelope
    }

    /// Sign in with a Google or Apple identity token.
    #[tracing::instrument(skip(self, request), fields(provider = provider.as_str()))]
    pub async fn third_party_auth(
        &self,
        provider: AuthProvider,
        request: &ThirdPartyAuthRequest,
    ) -> Envelope<AuthPayload> {
        let path = format!("/api/users/auth/{}", provider.as_str());
        let envelope = self
            .submit(RequestDescriptor::post(path).json(request))
            .await;
        self.start_session(envelope).await
    }

    /// End the session.
    ///
    /// The server is told first, while the token is still available; local
    /// state is cleared whatever it answers. That covers the token, the wallet,
    /// saved preferences, cached and in-flight responses and any running refresh.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Envelope<Value> {
        let envelope = self
            .perform(RequestDescriptor::post("/api/users/logout"))
            .await;
        if !envelope.success {
            warn!(
                error = envelope.error_message().unwrap_or_default(),
                "Server logout failed, clearing local session anyway"
            );
        }

        let fence = self.refresh_coordinator().fence().await;
        if let Err(e) = AuthSession::clear(self.store().as_ref()).await {
            warn!(error = %e, "Failed to clear stored session");
        }
        if let Err(e) = self.store().remove(PREFERENCES_KEY).await {
            warn!(error = %e, "Failed to clear saved notification preferences");
        }
        self.discard_session_state();
        drop(fence);
        info!("Logged out");
        envelope
    }

    pub async fn get_profile(&self) -> Envelope<UserProfile> {
        self.fetch(RequestDescriptor::get(PROFILE_PATH)).await
    }

    /// Update profile fields; only the `Some` fields are sent.
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Envelope<UserProfile> {
        self.mutate(RequestDescriptor::put(PROFILE_PATH).json(request), &[PROFILE_PATH])
            .await
    }

    /// Replace the stored session with the one from a successful sign-in and
    /// drop everything left over from the previous user.
    async fn start_session(&self, envelope: Envelope<AuthPayload>) -> Envelope<AuthPayload> {
        if !envelope.success {
            return envelope;
        }

        let token = envelope
            .token
            .clone()
            .or_else(|| envelope.data.as_ref().and_then(|p| p.token.clone()));
        let Some(token) = token else {
            warn!("Sign-in succeeded without a token");
            return Envelope::failure("Authentication response did not include a token");
        };

        let session = AuthSession {
            token: Some(token),
            wallet_address: envelope
                .data
                .as_ref()
                .and_then(|p| p.session_wallet())
                .map(str::to_string),
        };
        let fence = self.refresh_coordinator().fence().await;
        let saved = session.replace(self.store().as_ref()).await;
        self.discard_session_state();
        drop(fence);
        if let Err(e) = saved {
            warn!(error = %e, "Failed to store session");
            return Envelope::failure(format!("Failed to store session: {}", e));
        }

        info!(
            user_id = envelope.data.as_ref().map(|p| p.user.id.as_str()).unwrap_or_default(),
            "Session started"
        );
        envelope
    }
}
