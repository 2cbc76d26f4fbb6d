//! # Notification Data Transfer Objects
//!
//! Notification feed, push-token registration, delivery preferences (including
//! quiet hours) and price alerts.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A notification in the user's feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub read: bool,
    /// Free-form payload; decode with [`crate::Destination::from_payload`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub unread_count: u64,
}

/// Register a device push token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenRequest {
    pub token: String,
    pub platform: String,
}

/// Ask the backend to deliver a test push to this device
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestNotificationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Time-of-day range during which delivery is suppressed.
///
/// Ranges may cross midnight (`22:00` → `07:00`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct QuietHours {
    pub enabled: bool,
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl QuietHours {
    /// Whether `time` falls inside the quiet window. `start` is inclusive, `end` exclusive.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if !self.enabled {
            return false;
        }
        if self.start <= self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

/// Delivery preferences. Missing fields take their defaults, so a partial
/// server document is always merged over [`NotificationPreferences::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub push_enabled: bool,
    pub transactions: bool,
    pub payment_requests: bool,
    pub chat_messages: bool,
    pub price_alerts: bool,
    pub security_alerts: bool,
    pub marketing: bool,
    pub quiet_hours: QuietHours,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push_enabled: true,
            transactions: true,
            payment_requests: true,
            chat_messages: true,
            price_alerts: true,
            security_alerts: true,
            marketing: false,
            quiet_hours: QuietHours::default(),
        }
    }
}

impl NotificationPreferences {
    /// Whether a notification of `category` may be delivered at `time`.
    ///
    /// Security alerts ignore quiet hours.
    pub fn allows(&self, category: NotificationCategory, time: NaiveTime) -> bool {
        if !self.push_enabled {
            return false;
        }
        let enabled = match category {
            NotificationCategory::Transaction => self.transactions,
            NotificationCategory::PaymentRequest => self.payment_requests,
            NotificationCategory::Chat => self.chat_messages,
            NotificationCategory::PriceAlert => self.price_alerts,
            NotificationCategory::Security => return self.security_alerts,
            NotificationCategory::Marketing => self.marketing,
        };
        enabled && !self.quiet_hours.contains(time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Transaction,
    PaymentRequest,
    Chat,
    PriceAlert,
    Security,
    Marketing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub id: String,
    pub symbol: String,
    pub target_price: f64,
    pub direction: AlertDirection,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePriceAlertRequest {
    pub symbol: String,
    pub target_price: f64,
    pub direction: AlertDirection,
}

fn default_true() -> bool {
    true
}

/// `HH:MM` wire format for times of day. `HH:MM:SS` is accepted on input.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // ========== Quiet Hours Tests ==========

    #[test]
    fn test_quiet_hours_disabled_never_contains() {
        let quiet = QuietHours::default();
        assert!(!quiet.contains(at(23, 0)));
    }

    #[test]
    fn test_quiet_hours_across_midnight() {
        let quiet = QuietHours {
            enabled: true,
            ..QuietHours::default()
        };
        assert!(quiet.contains(at(22, 0)));
        assert!(quiet.contains(at(2, 30)));
        assert!(!quiet.contains(at(7, 0)));
        assert!(!quiet.contains(at(12, 0)));
    }

    #[test]
    fn test_quiet_hours_same_day_range() {
        let quiet = QuietHours {
            enabled: true,
            start: at(13, 0),
            end: at(14, 0),
        };
        assert!(quiet.contains(at(13, 30)));
        assert!(!quiet.contains(at(14, 0)));
        assert!(!quiet.contains(at(12, 59)));
    }

    // ========== Preferences Tests ==========

    #[test]
    fn test_partial_preferences_merge_over_defaults() {
        let prefs: NotificationPreferences = serde_json::from_value(json!({
            "marketing": true,
            "quietHours": {"enabled": true, "start": "23:30", "end": "06:00"}
        }))
        .unwrap();
        assert!(prefs.marketing);
        assert!(prefs.push_enabled);
        assert!(prefs.transactions);
        assert_eq!(prefs.quiet_hours.start, at(23, 30));
    }

    #[test]
    fn test_quiet_hours_serialize_as_hhmm() {
        let value = serde_json::to_value(QuietHours::default()).unwrap();
        assert_eq!(value, json!({"enabled": false, "start": "22:00", "end": "07:00"}));
    }

    #[test]
    fn test_security_alerts_ignore_quiet_hours() {
        let prefs = NotificationPreferences {
            quiet_hours: QuietHours {
                enabled: true,
                ..QuietHours::default()
            },
            ..NotificationPreferences::default()
        };
        assert!(!prefs.allows(NotificationCategory::Transaction, at(23, 0)));
        assert!(prefs.allows(NotificationCategory::Security, at(23, 0)));
        assert!(prefs.allows(NotificationCategory::Transaction, at(12, 0)));
    }
}
