//! # HTTP Transport
//!
//! [`ReqwestTransport`] is the production [`Transport`]: one pooled
//! `reqwest::Client` with the default JSON/platform headers, a per-request
//! timeout and optional bearer authorization.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

use super::request::{Method, TransportRequest, TransportResponse};
use crate::config::ClientConfig;
use crate::core::error::{AppError, TransportError};
use crate::core::service::Transport;

/// Header identifying the calling platform to the backend.
pub const PLATFORM_HEADER: &str = "x-platform";

/// HTTP client for communicating with the backend API server.
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport with the configured base URL, platform and default timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let platform = HeaderValue::from_str(&config.platform)
            .map_err(|e| AppError::Validation(format!("Invalid platform header: {}", e)))?;
        headers.insert(HeaderName::from_static(PLATFORM_HEADER), platform);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Api(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let descriptor = &request.descriptor;
        let url = format!("{}{}", self.base_url, descriptor.path);

        let mut builder = self
            .client
            .request(Self::method(descriptor.method), &url)
            .timeout(request.timeout);
        if !descriptor.query.is_empty() {
            builder = builder.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::Local(e.to_string())
            } else {
                tracing::debug!(error = %e, url = %url, "Network error");
                TransportError::NoResponse(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::NoResponse(format!("Failed to read response body: {}", e)))?;

        Ok(TransportResponse::new(status, parse_body(&text)))
    }
}

/// Empty bodies become `Null`, non-JSON text is kept as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
