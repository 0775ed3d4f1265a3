//! Engine types
//!
//! Configuration, statistics and the clock/output seams of the request loop.

use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::http::GovernorConfig;
use crate::state::{Continuation, DEFAULT_STATE_DIR};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Clock
// ============================================================================

/// Source of wall-clock time and sleeps for the request loop
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds
    fn now(&self) -> f64;

    /// Wait for the given duration
    async fn sleep(&self, delay: Duration);
}

/// Real time, tokio sleeps
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }

    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

// ============================================================================
// Output
// ============================================================================

/// Receives one JSON value per emitted response
pub trait OutputSink: Send {
    /// Emit a response body
    fn emit(&mut self, value: &JsonValue) -> Result<()>;
}

/// Writes one compact JSON value per line and flushes after each
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> OutputSink for JsonLinesSink<W> {
    fn emit(&mut self, value: &JsonValue) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl OutputSink for Vec<JsonValue> {
    fn emit(&mut self, value: &JsonValue) -> Result<()> {
        self.push(value.clone());
        Ok(())
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a polling run
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Follow `next_cursor`/`max_id` across pages
    pub follow_cursor: bool,
    /// Load saved continuation state when none is given explicitly
    pub resume: bool,
    /// Directory holding resume records
    pub state_dir: PathBuf,
    /// Rate governor settings
    pub governor: GovernorConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            follow_cursor: false,
            resume: true,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            governor: GovernorConfig::default(),
        }
    }
}

impl LoopConfig {
    /// Create a new loop config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow continuation tokens across pages
    #[must_use]
    pub fn with_follow_cursor(mut self, follow: bool) -> Self {
        self.follow_cursor = follow;
        self
    }

    /// Enable or disable resuming from saved state
    #[must_use]
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Set the state directory
    #[must_use]
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Set the governor configuration
    #[must_use]
    pub fn with_governor(mut self, governor: GovernorConfig) -> Self {
        self.governor = governor;
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// Why a run ended cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Cursor following is disabled; one page was fetched
    SinglePage,
    /// The server signalled the last page
    Complete,
    /// The body matched no pagination convention
    Exhausted,
    /// The page repeated the previous `max_id`
    Stalled,
}

/// Statistics from a run
#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    /// Requests sent, including throttled ones
    pub requests_sent: usize,
    /// Responses emitted to the output
    pub pages_emitted: usize,
    /// Throttled responses that were retried
    pub throttled: usize,
    /// Total time spent sleeping
    pub slept: Duration,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl LoopStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a sent request
    pub fn add_request(&mut self) {
        self.requests_sent += 1;
    }

    /// Count an emitted page
    pub fn add_page(&mut self) {
        self.pages_emitted += 1;
    }

    /// Count a throttled response
    pub fn add_throttled(&mut self) {
        self.throttled += 1;
    }

    /// Add sleep time
    pub fn add_sleep(&mut self, delay: Duration) {
        self.slept += delay;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Outcome of a clean run
#[derive(Debug, Clone)]
pub struct LoopReport {
    /// Fingerprint of the request
    pub fingerprint: Fingerprint,
    /// Continuation after the last page
    pub continuation: Continuation,
    /// Why the run stopped
    pub stop_reason: StopReason,
    /// Run statistics
    pub stats: LoopStats,
}
