//! # Payment Request Data Transfer Objects
//!
//! A payment request asks another wallet to send funds. The payer can preview,
//! accept (with the settling transaction hash) or decline it; the requester can
//! cancel it while it is pending.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRequestStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
    Expired,
    Paid,
    #[serde(other)]
    Unknown,
}

impl PaymentRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentRequestStatus::Pending => "pending",
            PaymentRequestStatus::Accepted => "accepted",
            PaymentRequestStatus::Declined => "declined",
            PaymentRequestStatus::Cancelled => "cancelled",
            PaymentRequestStatus::Expired => "expired",
            PaymentRequestStatus::Paid => "paid",
            PaymentRequestStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub id: String,
    pub requester_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_address: Option<String>,
    pub amount: String,
    pub token_symbol: String,
    pub status: PaymentRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    /// Omitted for an open request shared as a link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer_address: Option<String>,
    pub amount: String,
    pub token_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_hours: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentResponseAction {
    Accept,
    Decline,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RespondPaymentRequest {
    pub action: PaymentResponseAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AcceptPaymentRequest {
    pub transaction_hash: String,
}

/// What the payer sees before deciding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestPreview {
    pub request: PaymentRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_name: Option<String>,
    #[serde(default)]
    pub can_accept: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentDirection {
    Incoming,
    Outgoing,
}

/// Filters for listing payment requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentRequestFilter {
    pub status: Option<PaymentRequestStatus>,
    pub direction: Option<PaymentDirection>,
}

impl PaymentRequestFilter {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(direction) = self.direction {
            let direction = match direction {
                PaymentDirection::Incoming => "incoming",
                PaymentDirection::Outgoing => "outgoing",
            };
            pairs.push(("direction".to_string(), direction.to_string()));
        }
        pairs
    }
}
