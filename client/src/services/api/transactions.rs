//! # Transaction Endpoints
//!
//! Paged listing, detail, recording, history, stats, execution and on-chain
//! tracking of wallet transactions.

use shared::{
    Envelope, ExecuteTransactionRequest, ExecuteTransactionResult, RecordTransactionRequest,
    TrackTransactionRequest, TrackedTransaction, Transaction, TransactionPage, TransactionQuery,
    TransactionStats,
};

use super::client::ApiClient;
use super::request::RequestDescriptor;
use super::tokens::BALANCES_PATH;

pub const TRANSACTIONS_PATH: &str = "/api/transactions";

impl ApiClient {
    /// List transactions, newest first.
    pub async fn get_transactions(&self, query: &TransactionQuery) -> Envelope<TransactionPage> {
        self.fetch(RequestDescriptor::get(TRANSACTIONS_PATH).query_pairs(query.to_pairs()))
            .await
    }

    pub async fn get_transaction(&self, id: &str) -> Envelope<Transaction> {
        self.fetch(RequestDescriptor::get(format!("{}/{}", TRANSACTIONS_PATH, id)))
            .await
    }

    /// Full history across networks, including transactions not initiated here.
    pub async fn get_transaction_history(&self, query: &TransactionQuery) -> Envelope<TransactionPage> {
        self.fetch(
            RequestDescriptor::get(format!("{}/history", TRANSACTIONS_PATH))
                .query_pairs(query.to_pairs()),
        )
        .await
    }

    pub async fn get_transaction_stats(&self) -> Envelope<TransactionStats> {
        self.fetch(RequestDescriptor::get(format!("{}/stats", TRANSACTIONS_PATH)))
            .await
    }

    /// Record a transaction that was signed and broadcast elsewhere.
    #[tracing::instrument(skip(self, request), fields(hash = %request.hash))]
    pub async fn record_transaction(&self, request: &RecordTransactionRequest) -> Envelope<Transaction> {
        self.mutate(
            RequestDescriptor::post(TRANSACTIONS_PATH).json(request),
            &[TRANSACTIONS_PATH],
        )
        .await
    }

    /// Ask the backend to build, sign and broadcast a transfer.
    #[tracing::instrument(
        skip(self, request),
        fields(to = %shared::short_address(&request.to_address), amount = %request.amount)
    )]
    pub async fn execute_transaction(
        &self,
        request: &ExecuteTransactionRequest,
    ) -> Envelope<ExecuteTransactionResult> {
        self.mutate(
            RequestDescriptor::post(format!("{}/execute", TRANSACTIONS_PATH)).json(request),
            &[TRANSACTIONS_PATH, BALANCES_PATH],
        )
        .await
    }

    /// Start (or poll) tracking of a broadcast transaction.
    pub async fn track_transaction(&self, request: &TrackTransactionRequest) -> Envelope<TrackedTransaction> {
        self.submit(RequestDescriptor::post(format!("{}/track", TRANSACTIONS_PATH)).json(request))
            .await
    }
}
