//! # Common Error Types
//!
//! Consolidated error handling for the wallet client.
//!
//! ## Error Categories
//!
//! - [`TransportError`]: one HTTP exchange failed (no response, non-2xx status, or a
//!   local fault building the request). Retry and auth-refresh decisions are made
//!   on this type.
//! - [`StoreError`]: the key-value store adapter failed.
//! - [`ConfigError`]: environment configuration is missing or invalid.
//! - [`AppError`]: umbrella for the few operations that can genuinely fail
//!   (constructing a client, loading config). API calls never return it; they
//!   return an [`shared::Envelope`] with `success = false` instead.
//!
//! ## Envelope Conversion
//!
//! ```rust
//! use shared::Envelope;
//! use wallet_client::core::error::{TransportError, NO_RESPONSE_MESSAGE};
//!
//! let envelope: Envelope<()> = TransportError::NoResponse("connection refused".into()).into_envelope();
//! assert!(!envelope.success);
//! assert_eq!(envelope.error.as_deref(), Some(NO_RESPONSE_MESSAGE));
//! ```

use serde_json::Value;
use shared::Envelope;
use thiserror::Error;

/// Error text surfaced to callers when the server could not be reached.
pub const NO_RESPONSE_MESSAGE: &str = "No response from server. Please check your connection.";

/// Failure of a single HTTP exchange.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The request never produced a response (connect failure, timeout, DNS).
    #[error("No response from server: {0}")]
    NoResponse(String),

    /// The server answered with a non-2xx status.
    #[error("Request failed with status {status}: {message}")]
    Status {
        status: u16,
        message: String,
        code: Option<String>,
        body: Option<Value>,
    },

    /// The request could not be built or its payload serialized.
    #[error("Invalid request: {0}")]
    Local(String),
}

impl TransportError {
    /// Build a status error from a non-2xx response body.
    ///
    /// The body is not assumed to be an envelope: `error`, then `message`, then a
    /// bare string body are tried before falling back to a generic message.
    pub fn from_status(status: u16, body: Value) -> Self {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| body.get("message").and_then(Value::as_str))
            .or_else(|| body.as_str().filter(|s| !s.trim().is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        let code = body.get("code").and_then(Value::as_str).map(str::to_string);

        TransportError::Status {
            status,
            message,
            code,
            body: if body.is_null() { None } else { Some(body) },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            TransportError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Transport failures, 5xx and 429 are worth another attempt; other 4xx are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::NoResponse(_) => true,
            TransportError::Status { status, .. } => *status >= 500 || *status == 429,
            TransportError::Local(_) => false,
        }
    }

    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::NoResponse(_) => NO_RESPONSE_MESSAGE.to_string(),
            TransportError::Status { message, .. } => message.clone(),
            TransportError::Local(message) => message.clone(),
        }
    }

    /// Normalize into a failed envelope.
    pub fn into_envelope<T>(self) -> Envelope<T> {
        let code = self.code().map(str::to_string);
        Envelope::failure(self.user_message()).with_code(code)
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Local(format!("Failed to serialize request: {}", err))
    }
}

/// Key-value store adapter failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration loading/validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} has the wrong format")]
    WrongFormat(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application-wide error type for operations outside the envelope contract.
#[derive(Debug, Error)]
pub enum AppError {
    /// HTTP client construction or transport failure.
    #[error("API error: {0}")]
    Api(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation failure.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        AppError::Api(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========== Classification Tests ==========

    #[test]
    fn test_retryable_statuses() {
        for status in [500, 502, 503, 429] {
            assert!(TransportError::from_status(status, Value::Null).is_retryable(), "{status}");
        }
        for status in [400, 401, 403, 404, 422] {
            assert!(!TransportError::from_status(status, Value::Null).is_retryable(), "{status}");
        }
        assert!(TransportError::NoResponse("timeout".into()).is_retryable());
        assert!(!TransportError::Local("bad".into()).is_retryable());
    }

    // ========== Message Extraction Tests ==========

    #[test]
    fn test_status_message_prefers_error_field() {
        let err = TransportError::from_status(
            400,
            json!({"success": false, "error": "Amount too low", "message": "ignored", "code": "MIN_AMOUNT"}),
        );
        assert_eq!(err.user_message(), "Amount too low");
        assert_eq!(err.code(), Some("MIN_AMOUNT"));
    }

    #[test]
    fn test_status_message_from_plain_text_body() {
        let err = TransportError::from_status(502, Value::String("Bad Gateway".into()));
        assert_eq!(err.user_message(), "Bad Gateway");
    }

    #[test]
    fn test_status_message_fallback() {
        let err = TransportError::from_status(503, Value::Null);
        assert_eq!(err.user_message(), "Request failed with status 503");
    }

    #[test]
    fn test_into_envelope_keeps_code() {
        let envelope: Envelope<()> =
            TransportError::from_status(404, json!({"error": "Gone", "code": "NOT_FOUND"})).into_envelope();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Gone"));
        assert_eq!(envelope.code.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(
            AppError::Validation("Amount must be positive".to_string()).to_string(),
            "Validation error: Amount must be positive"
        );
        assert_eq!(
            TransportError::Local("oops".into()).to_string(),
            "Invalid request: oops"
        );
    }
}
