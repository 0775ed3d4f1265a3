// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagewalk
//!
//! A polling engine for paginated, rate-limited REST APIs.
//!
//! ## Features
//!
//! - **Resumable pagination**: `next_cursor` and `max_id` progress is saved before
//!   every request and picked up again on the next run
//! - **Header-driven pacing**: Requests are spread across the server's rate window
//! - **Rate-limit recovery**: Throttled requests sleep until reset and are resent
//! - **JSON lines output**: Every response body is one line on stdout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::engine::{JsonLinesSink, LoopConfig, RequestLoop};
//! use pagewalk::http::{ClientContext, HttpClient};
//! use pagewalk::{Method, RequestDescriptor, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = HttpClient::new(ClientContext::builder("AAAA...").build())?;
//!     let request = RequestDescriptor::new(
//!         Method::GET,
//!         "https://api.twitter.com/1.1/followers/ids.json",
//!     )
//!     .param("screen_name", "jack");
//!
//!     let request_loop = RequestLoop::new(
//!         Arc::new(client),
//!         LoopConfig::new().with_follow_cursor(true),
//!     );
//!     let report = request_loop.run(&request, &mut JsonLinesSink::stdout()).await?;
//!     println!("{} pages", report.stats.pages_emitted);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       Request Loop                         │
//! │     INIT → SEND → CLASSIFY → ADVANCE → SEND ... → STOP     │
//! └────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────┬──────────────┼──────────────┬───────────────┐
//! │ Fingerprint │ Resume Store │ Rate Governor│  Pagination   │
//! ├─────────────┼──────────────┼──────────────┼───────────────┤
//! │ SHA-256 of  │ {cursor,     │ 420/429 wait │ next_cursor   │
//! │ the request │  max_id}     │ Pacing       │ max_id, stall │
//! └─────────────┴──────────────┴──────────────┴───────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Logical request descriptors
pub mod request;

/// Request fingerprinting
pub mod fingerprint;

/// Resume state persistence
pub mod state;

/// Transport, client and rate governor
pub mod http;

/// Continuation extraction
pub mod pagination;

/// The request loop
pub mod engine;

/// Credential and endpoint configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::AppConfig;
pub use engine::{LoopConfig, LoopReport, RequestLoop};
pub use fingerprint::Fingerprint;
pub use request::RequestDescriptor;
pub use state::Continuation;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
