//! HTTP module
//!
//! Transport contract, the reqwest transport, and the rate governor.
//!
//! # Features
//!
//! - **Transport**: `send(request) -> response` seam used by the request loop
//! - **Client context**: Bearer token, CSRF token and session cookies built once per run
//! - **Rate governor**: Reset-time retries and steady-state pacing from `x-rate-limit-*` headers

mod client;
mod rate_limit;
mod transport;

pub use client::{generate_csrf_token, ClientContext, ClientContextBuilder, HttpClient};
pub use rate_limit::{
    GovernorConfig, RateDecision, RateGovernor, RateWindow, ResetPolicy, LIMIT_HEADER,
    RATE_LIMIT_STATUSES, REMAINING_HEADER, RESET_HEADER,
};
pub use transport::{OutboundRequest, RawResponse, Transport};
