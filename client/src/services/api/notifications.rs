//! # Notification Endpoints
//!
//! Notification feed, push-token registration, delivery preferences, test
//! pushes and price alerts.
//!
//! Preferences are also kept on the device: every update is saved locally
//! before it is sent, and a failed read falls back to the saved copy.

use serde_json::Value;
use shared::{
    CreatePriceAlertRequest, Envelope, NotificationPage, NotificationPreferences, PriceAlert,
    PushTokenRequest, TestNotificationRequest,
};
use tracing::{debug, warn};

use super::client::ApiClient;
use super::request::RequestDescriptor;
use crate::storage::PREFERENCES_KEY;

pub const NOTIFICATIONS_PATH: &str = "/api/notifications";
pub const PREFERENCES_PATH: &str = "/api/notifications/preferences";
pub const PUSH_TOKEN_PATH: &str = "/api/notifications/push-token";
pub const PRICE_ALERTS_PATH: &str = "/api/notifications/price-alerts";

impl ApiClient {
    pub async fn get_notifications(&self, page: u32, limit: u32) -> Envelope<NotificationPage> {
        self.fetch(
            RequestDescriptor::get(NOTIFICATIONS_PATH)
                .query("page", page)
                .query("limit", limit),
        )
        .await
    }

    pub async fn mark_notification_read(&self, id: &str) -> Envelope<Value> {
        self.mutate(
            Ok(RequestDescriptor::put(format!("{}/{}/read", NOTIFICATIONS_PATH, id))),
            &[NOTIFICATIONS_PATH],
        )
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Envelope<Value> {
        self.mutate(
            Ok(RequestDescriptor::put(format!("{}/read-all", NOTIFICATIONS_PATH))),
            &[NOTIFICATIONS_PATH],
        )
        .await
    }

    /// Register this device for push delivery. The platform comes from the client config.
    #[tracing::instrument(skip(self, token), fields(token = %shared::mask_token(token)))]
    pub async fn register_push_token(&self, token: &str) -> Envelope<Value> {
        self.submit(RequestDescriptor::post(PUSH_TOKEN_PATH).json(&self.push_token_request(token)))
            .await
    }

    #[tracing::instrument(skip(self, token), fields(token = %shared::mask_token(token)))]
    pub async fn remove_push_token(&self, token: &str) -> Envelope<Value> {
        self.submit(RequestDescriptor::delete(PUSH_TOKEN_PATH).json(&self.push_token_request(token)))
            .await
    }

    /// Server preferences merged over defaults, or the locally saved copy when
    /// the server cannot be read.
    pub async fn get_notification_preferences(&self) -> Envelope<NotificationPreferences> {
        let envelope: Envelope<NotificationPreferences> =
            self.fetch(RequestDescriptor::get(PREFERENCES_PATH)).await;

        if envelope.success {
            if envelope.data.is_some() {
                return envelope;
            }
            let local = self.local_preferences().await.unwrap_or_default();
            return Envelope::ok(local);
        }

        match self.local_preferences().await {
            Some(local) => {
                debug!(
                    error = envelope.error_message().unwrap_or_default(),
                    "Using locally saved notification preferences"
                );
                Envelope::ok(local).with_message("Using locally saved preferences")
            }
            None => envelope,
        }
    }

    /// Save preferences locally, then on the server.
    #[tracing::instrument(skip(self, preferences))]
    pub async fn update_notification_preferences(
        &self,
        preferences: &NotificationPreferences,
    ) -> Envelope<NotificationPreferences> {
        match serde_json::to_string(preferences) {
            Ok(raw) => {
                if let Err(e) = self.store().set(PREFERENCES_KEY, &raw).await {
                    warn!(error = %e, "Failed to save notification preferences locally");
                }
            }
            Err(e) => return Envelope::failure(format!("Failed to serialize preferences: {}", e)),
        }

        let envelope: Envelope<NotificationPreferences> = self
            .mutate(
                RequestDescriptor::put(PREFERENCES_PATH).json(preferences),
                &[PREFERENCES_PATH],
            )
            .await;

        // Some backends answer with an empty body; echo what was saved.
        if envelope.success && envelope.data.is_none() {
            return Envelope {
                data: Some(preferences.clone()),
                ..envelope
            };
        }
        envelope
    }

    pub async fn send_test_notification(&self, request: &TestNotificationRequest) -> Envelope<Value> {
        self.submit(RequestDescriptor::post(format!("{}/test", NOTIFICATIONS_PATH)).json(request))
            .await
    }

    pub async fn get_price_alerts(&self) -> Envelope<Vec<PriceAlert>> {
        self.fetch(RequestDescriptor::get(PRICE_ALERTS_PATH)).await
    }

    pub async fn create_price_alert(&self, request: &CreatePriceAlertRequest) -> Envelope<PriceAlert> {
        self.mutate(
            RequestDescriptor::post(PRICE_ALERTS_PATH).json(request),
            &[PRICE_ALERTS_PATH],
        )
        .await
    }

    pub async fn delete_price_alert(&self, id: &str) -> Envelope<Value> {
        self.mutate(
            Ok(RequestDescriptor::delete(format!("{}/{}", PRICE_ALERTS_PATH, id))),
            &[PRICE_ALERTS_PATH],
        )
        .await
    }

    fn push_token_request(&self, token: &str) -> PushTokenRequest {
        PushTokenRequest {
            token: token.to_string(),
            platform: self.config().platform.clone(),
        }
    }

    async fn local_preferences(&self) -> Option<NotificationPreferences> {
        let raw = match self.store().get(PREFERENCES_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read saved notification preferences");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(preferences) => Some(preferences),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable saved notification preferences");
                None
            }
        }
    }
}
