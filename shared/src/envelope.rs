//! # Response Envelope
//!
//! Every backend endpoint answers with the same wrapper:
//!
//! ```text
//! { "success": true,  "data": { ... }, "message": "optional" }
//! { "success": false, "error": "Contact not found", "code": "NOT_FOUND" }
//! ```
//!
//! The client never throws for expected failures; it hands callers an
//! [`Envelope`] with `success = false` and a human-readable `error`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical response wrapper returned by every API method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Machine-readable error code (e.g. `ACCOUNT_NOT_FOUND`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            token: None,
            code: None,
        }
    }

    /// Failed envelope carrying an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            token: None,
            code: None,
        }
    }

    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The best available description of a failure: `error`, then `message`.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }

    /// Transform the payload while keeping the rest of the envelope intact.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            message: self.message,
            token: self.token,
            code: self.code,
        }
    }

    /// Convert into a `Result`, turning `success = false` into the error message.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .or(self.message)
                .unwrap_or_else(|| "Request failed".to_string()))
        }
    }
}

impl Envelope<Value> {
    /// Normalize an arbitrary 2xx body into an envelope.
    ///
    /// Bodies that already look like an envelope (an object with a boolean
    /// `success` field) are decoded as such; anything else is treated as the
    /// payload of a successful response.
    pub fn from_body(body: Value) -> Self {
        let is_envelope = body
            .get("success")
            .map(Value::is_boolean)
            .unwrap_or(false);

        if is_envelope {
            match serde_json::from_value::<Envelope<Value>>(body.clone()) {
                Ok(envelope) => return envelope,
                Err(_) => return Envelope::ok(body),
            }
        }

        match body {
            Value::Null => Self {
                data: None,
                ..Envelope::ok(Value::Null)
            },
            other => Envelope::ok(other),
        }
    }

    /// Decode the JSON payload into a typed envelope.
    ///
    /// A payload that does not match `T` becomes a failed envelope; a `null`
    /// payload becomes `data: None`.
    pub fn decode<T: DeserializeOwned>(self) -> Envelope<T> {
        let Envelope {
            success,
            data,
            error,
            message,
            token,
            code,
        } = self;

        let data = match data {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    return Envelope::failure(format!("Failed to parse response: {}", e))
                        .with_code(code);
                }
            },
        };

        Envelope {
            success,
            data,
            error,
            message,
            token,
            code,
        }
    }
}
