//! reqwest-backed transport
//!
//! Provides the production [`Transport`]:
//! - Bearer token and CSRF header on every request
//! - Session cookies for per-identity access
//! - Form or JSON bodies
//! - Request timeout

use super::transport::{OutboundRequest, RawResponse, Transport};
use crate::error::{Error, Result};
use crate::types::BodyMode;
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/72.0.3626.109 Safari/537.36";

/// Immutable per-run client settings shared by every request
#[derive(Debug, Clone)]
pub struct ClientContext {
    /// Application bearer token
    pub bearer_token: String,
    /// Optional per-identity session token, sent as the `auth_token` cookie
    pub session_token: Option<String>,
    /// CSRF token, sent as `x-csrf-token` and the `ct0` cookie
    pub csrf_token: String,
    /// User agent string
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
}

impl ClientContext {
    /// Create a context builder for the given bearer token
    pub fn builder(bearer_token: impl Into<String>) -> ClientContextBuilder {
        ClientContextBuilder {
            context: ClientContext {
                bearer_token: bearer_token.into(),
                session_token: None,
                csrf_token: generate_csrf_token(false),
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout: Duration::from_secs(30),
            },
        }
    }

    /// Cookie header value
    pub fn cookie_header(&self) -> String {
        match &self.session_token {
            Some(token) => format!("ct0={}; auth_token={token}", self.csrf_token),
            None => format!("ct0={}", self.csrf_token),
        }
    }
}

/// Builder for [`ClientContext`]
pub struct ClientContextBuilder {
    context: ClientContext,
}

impl ClientContextBuilder {
    /// Set the session token
    #[must_use]
    pub fn session_token(mut self, token: Option<String>) -> Self {
        self.context.session_token = token;
        self
    }

    /// Generate a CSRF token in legacy (32 hex) or current (160 hex) form
    #[must_use]
    pub fn legacy_csrf(mut self, legacy: bool) -> Self {
        self.context.csrf_token = generate_csrf_token(legacy);
        self
    }

    /// Use a fixed CSRF token
    #[must_use]
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.context.csrf_token = token.into();
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.context.user_agent = agent.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.context.timeout = timeout;
        self
    }

    /// Build the context
    pub fn build(self) -> ClientContext {
        self.context
    }
}

/// Random lowercase hex CSRF token
pub fn generate_csrf_token(legacy: bool) -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let len = if legacy { 32 } else { 160 };
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
        .collect()
}

/// HTTP transport built on reqwest
pub struct HttpClient {
    client: Client,
    context: ClientContext,
}

impl HttpClient {
    /// Create a client for the given context
    pub fn new(context: ClientContext) -> Result<Self> {
        let client = Client::builder()
            .timeout(context.timeout)
            .user_agent(&context.user_agent)
            .build()?;

        Ok(Self { client, context })
    }

    /// The context this client was built from
    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    fn build(&self, request: &OutboundRequest) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .request(request.method.into(), &request.url)
            .header(ACCEPT, "application/json")
            .header("x-csrf-token", &self.context.csrf_token)
            .header(COOKIE, self.context.cookie_header())
            .bearer_auth(&self.context.bearer_token);

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        match request.body_mode {
            Some(BodyMode::Json) => req.json(&request.body),
            Some(BodyMode::Form) if !request.body.is_empty() => req.form(&request.body),
            _ => req,
        }
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse> {
        debug!(
            "{} {} query={:?} body={:?}",
            request.method, request.url, request.query, request.body
        );

        let response = self.build(request).send().await.map_err(Error::Transport)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Error::Transport)?;

        debug!("HTTP {status}, {} bytes", body.len());
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("user_agent", &self.context.user_agent)
            .field("timeout", &self.context.timeout)
            .field("has_session", &self.context.session_token.is_some())
            .finish_non_exhaustive()
    }
}
