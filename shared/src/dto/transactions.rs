//! # Transaction Data Transfer Objects
//!
//! Listing, detail, recording, statistics, execution and on-chain tracking.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Unknown => "unknown",
        }
    }
}

/// A wallet transaction as recorded by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub from_address: String,
    pub to_address: String,
    /// Decimal string to avoid float rounding on token amounts
    pub amount: String,
    pub token_symbol: String,
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// One page of transactions
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default)]
    pub has_more: bool,
}

/// Filters for the transaction list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<TransactionStatus>,
    pub token_symbol: Option<String>,
}

impl TransactionQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.as_str().to_string()));
        }
        if let Some(symbol) = &self.token_symbol {
            pairs.push(("token".to_string(), symbol.clone()));
        }
        pairs
    }
}

/// Record a transaction that was signed and broadcast client-side
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    pub hash: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: String,
    pub token_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Ask the backend to build and submit a transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTransactionRequest {
    pub to_address: String,
    pub amount: String,
    pub token_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Result of an executed transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTransactionResult {
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

/// Start tracking an on-chain transaction until it settles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackTransactionRequest {
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

/// Tracking status of an on-chain transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedTransaction {
    pub hash: String,
    pub status: TransactionStatus,
    #[serde(default)]
    pub confirmations: u64,
}

/// Aggregate numbers for the activity screen
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStats {
    #[serde(default)]
    pub total_sent: String,
    #[serde(default)]
    pub total_received: String,
    #[serde(default)]
    pub transaction_count: u64,
    #[serde(default)]
    pub pending_count: u64,
}
