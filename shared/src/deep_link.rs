//! # Notification Deep Links
//!
//! Push payloads name the screen to open with a loose string tag (`screen` or
//! `type`) plus an id field. [`Destination::from_payload`] decodes that once,
//! at the boundary, into a closed enum so callers match on variants instead of
//! comparing strings.
//!
//! ```rust
//! use shared::Destination;
//! use serde_json::json;
//!
//! let payload = json!({"screen": "PaymentRequest", "requestId": "pr_42"});
//! assert_eq!(
//!     Destination::from_payload(&payload),
//!     Destination::PaymentRequest { request_id: "pr_42".to_string() }
//! );
//! ```

use serde_json::Value;

/// Where a notification tap should navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Home,
    Wallet,
    Notifications,
    TransactionDetail { transaction_id: String },
    PaymentRequest { request_id: String },
    ChatSession { session_id: String },
    Contact { contact_id: String },
    PriceAlert { symbol: String },
}

impl Destination {
    /// Decode a push payload. Unknown tags, or known tags missing their id, open [`Destination::Home`].
    pub fn from_payload(payload: &Value) -> Self {
        let Some(tag) = payload
            .get("screen")
            .or_else(|| payload.get("type"))
            .and_then(Value::as_str)
        else {
            return Destination::Home;
        };

        let id = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|k| payload.get(*k))
                .find_map(|v| match v {
                    Value::String(s) if !s.is_empty() => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
        };

        let destination = match normalize_tag(tag).as_str() {
            "home" => Some(Destination::Home),
            "wallet" | "balances" => Some(Destination::Wallet),
            "notifications" => Some(Destination::Notifications),
            "transaction" | "transactiondetail" | "transactiondetails" => id(&["transactionId", "id"])
                .map(|transaction_id| Destination::TransactionDetail { transaction_id }),
            "paymentrequest" | "paymentrequestdetail" => id(&["requestId", "paymentRequestId", "id"])
                .map(|request_id| Destination::PaymentRequest { request_id }),
            "chat" | "chatsession" | "chatmessage" => {
                id(&["sessionId", "id"]).map(|session_id| Destination::ChatSession { session_id })
            }
            "contact" | "contactdetail" => {
                id(&["contactId", "id"]).map(|contact_id| Destination::Contact { contact_id })
            }
            "pricealert" => id(&["symbol"]).map(|symbol| Destination::PriceAlert { symbol }),
            _ => None,
        };

        destination.unwrap_or(Destination::Home)
    }
}

/// `Transaction_Detail`, `transaction-detail` and `TransactionDetail` all compare equal.
fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
