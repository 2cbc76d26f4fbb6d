//! # Request Descriptors
//!
//! A [`RequestDescriptor`] is the immutable description of one API call. Its
//! [`fingerprint`](RequestDescriptor::fingerprint) identifies the call for the
//! response cache and the in-flight dedup registry.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method, path, ordered query pairs and optional JSON body of an API call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a serialized JSON body. Serialization failure is a local fault.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, TransportError> {
        let value = serde_json::to_value(body)?;
        Ok(self.with_body(value))
    }

    /// Only idempotent reads are eligible for the response cache.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::Get
    }

    /// Deterministic key over method, path, query and body.
    ///
    /// Query pairs keep their given order. Body objects are written with
    /// sorted keys, so equal bodies give equal keys regardless of the field
    /// order they were built with.
    pub fn fingerprint(&self) -> String {
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let body = self
            .body
            .as_ref()
            .map(canonical_json)
            .unwrap_or_default();
        format!("{} {}?{}#{}", self.method, self.path, query, body)
    }
}

fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let fields = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), canonical_json(v)))
                .collect::<Vec<_>>()
                .join(",");
            format!("{{{}}}", fields)
        }
        Value::Array(items) => {
            let items = items.iter().map(canonical_json).collect::<Vec<_>>().join(",");
            format!("[{}]", items)
        }
        scalar => scalar.to_string(),
    }
}

/// What a [`crate::core::Transport`] is asked to send.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub descriptor: RequestDescriptor,
    pub bearer: Option<String>,
    pub timeout: Duration,
}

/// Raw response: status plus body parsed as JSON (`Value::String` for non-JSON text, `Null` when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `Ok(body)` for 2xx, a [`TransportError::Status`] otherwise.
    pub fn into_result(self) -> Result<Value, TransportError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(TransportError::from_status(self.status, self.body))
        }
    }
}
