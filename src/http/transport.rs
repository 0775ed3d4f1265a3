//! Transport contract
//!
//! The request loop only needs "send a request, get status, headers and body
//! back". Anything that can do that implements [`Transport`].

use crate::error::Result;
use crate::types::{BodyMode, Method, StringMap};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;

/// A fully-resolved request ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL
    pub url: String,
    /// Query string parameters
    pub query: StringMap,
    /// Body parameters
    pub body: StringMap,
    /// Body encoding, `None` for methods without a body
    pub body_mode: Option<BodyMode>,
}

/// Status, headers and body of a response
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Bytes,
}

impl RawResponse {
    /// Create a response with no headers
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a header
    ///
    /// Header names or values that are not valid HTTP are skipped.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_bytes()),
            reqwest::header::HeaderValue::from_str(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value as a string, if present and valid UTF-8
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests on behalf of the request loop
///
/// Implementations own authentication, TLS and connection reuse. A returned
/// error is a transport failure (connection, DNS, TLS, timeout); HTTP error
/// statuses are returned as ordinary responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse>;
}
