//! # Payment Request Endpoints
//!
//! Create, list, preview, respond to, accept and cancel payment requests.

use shared::{
    AcceptPaymentRequest, CreatePaymentRequest, Envelope, PaymentRequest, PaymentRequestFilter,
    PaymentRequestPreview, RespondPaymentRequest,
};

use super::client::ApiClient;
use super::request::RequestDescriptor;

pub const PAYMENT_REQUESTS_PATH: &str = "/api/payment-requests";

impl ApiClient {
    #[tracing::instrument(skip(self, request), fields(amount = %request.amount, token = %request.token_symbol))]
    pub async fn create_payment_request(&self, request: &CreatePaymentRequest) -> Envelope<PaymentRequest> {
        self.mutate(
            RequestDescriptor::post(PAYMENT_REQUESTS_PATH).json(request),
            &[PAYMENT_REQUESTS_PATH],
        )
        .await
    }

    pub async fn get_payment_requests(&self, filter: &PaymentRequestFilter) -> Envelope<Vec<PaymentRequest>> {
        self.fetch(RequestDescriptor::get(PAYMENT_REQUESTS_PATH).query_pairs(filter.to_pairs()))
            .await
    }

    /// What the payer sees before accepting or declining.
    pub async fn preview_payment_request(&self, id: &str) -> Envelope<PaymentRequestPreview> {
        self.fetch(RequestDescriptor::get(request_path(id, "preview")))
            .await
    }

    pub async fn respond_to_payment_request(
        &self,
        id: &str,
        response: &RespondPaymentRequest,
    ) -> Envelope<PaymentRequest> {
        self.mutate(
            RequestDescriptor::post(request_path(id, "respond")).json(response),
            &[PAYMENT_REQUESTS_PATH],
        )
        .await
    }

    /// Mark a request paid by the transaction that settled it.
    pub async fn accept_payment_request(&self, id: &str, transaction_hash: &str) -> Envelope<PaymentRequest> {
        let request = AcceptPaymentRequest {
            transaction_hash: transaction_hash.to_string(),
        };
        self.mutate(
            RequestDescriptor::post(request_path(id, "accept")).json(&request),
            &[PAYMENT_REQUESTS_PATH],
        )
        .await
    }

    pub async fn cancel_payment_request(&self, id: &str) -> Envelope<PaymentRequest> {
        self.mutate(
            Ok(RequestDescriptor::post(request_path(id, "cancel"))),
            &[PAYMENT_REQUESTS_PATH],
        )
        .await
    }
}

fn request_path(id: &str, action: &str) -> String {
    format!("{}/{}/{}", PAYMENT_REQUESTS_PATH, id, action)
}
