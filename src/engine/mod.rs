//! Execution engine module
//!
//! The request loop: send, classify, emit, advance.
//!
//! # Overview
//!
//! The engine module provides:
//! - `RequestLoop` - Runs one logical request to completion, page by page
//! - `LoopConfig` - Cursor following, resume and pacing settings
//! - `Clock` / `OutputSink` - Seams for time and output
//!
//! Each iteration saves the continuation it is about to send before sending
//! it, so an interrupted run always leaves a resumable record behind.

mod types;

pub use types::{
    Clock, JsonLinesSink, LoopConfig, LoopReport, LoopStats, OutputSink, StopReason, SystemClock,
};

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use crate::http::{RateDecision, RateGovernor, RateWindow, RawResponse, Transport};
use crate::pagination::{PaginationDriver, ResponseShape};
use crate::request::RequestDescriptor;
use crate::state::{Continuation, ResumeHandle, ResumeStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Drives a logical request across pages
pub struct RequestLoop {
    /// Transport used for every request
    transport: Arc<dyn Transport>,
    /// Time source and sleeper
    clock: Arc<dyn Clock>,
    /// Loop configuration
    config: LoopConfig,
    governor: RateGovernor,
    driver: PaginationDriver,
}

impl RequestLoop {
    /// Create a loop using the system clock
    pub fn new(transport: Arc<dyn Transport>, config: LoopConfig) -> Self {
        let governor = RateGovernor::new(config.governor.clone());
        Self {
            transport,
            clock: Arc::new(SystemClock),
            config,
            governor,
            driver: PaginationDriver::new(),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get the loop configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run the request until pagination ends
    ///
    /// Every non-throttled response body is emitted to `sink`. A non-2xx
    /// response is emitted first and then returned as [`Error::HttpStatus`].
    pub async fn run(
        &self,
        request: &RequestDescriptor,
        sink: &mut dyn OutputSink,
    ) -> Result<LoopReport> {
        let start = Instant::now();
        let mut stats = LoopStats::new();

        let fingerprint = Fingerprint::of(request)?;
        debug!("Request hash: {fingerprint}");

        let record = ResumeStore::new(&self.config.state_dir)
            .open(&fingerprint)
            .await?;
        let mut continuation = self.initial_continuation(request, &record).await?;

        let stop_reason = loop {
            let outbound = request.outbound(&continuation);
            record.save(&continuation).await?;

            debug!("{} {} ({continuation})", request.method, request.url);
            let response = self.transport.send(&outbound).await?;
            stats.add_request();

            let now = self.clock.now();
            let pacing = match self.governor.assess(response.status, &response.headers, now) {
                RateDecision::Retry(delay) => {
                    log_throttle(&response, delay, now);
                    stats.add_throttled();
                    self.pause(delay, &mut stats).await;
                    continue;
                }
                RateDecision::Stop => {
                    warn!("Rate limit exceeded, reset time unknown - giving up");
                    return Err(Error::RateLimitUnresolved {
                        status: response.status,
                    });
                }
                RateDecision::Continue(delay) => delay,
            };

            let shape = ResponseShape::parse(response.status, &response.body);
            sink.emit(&shape.to_json())?;
            stats.add_page();
            if let Some(count) = shape.item_count() {
                debug!("Page {} with {count} items", stats.pages_emitted);
            }

            if !response.is_success() {
                return Err(Error::http_status(response.status, response.text()));
            }

            let outcome = self.driver.advance(&shape, &continuation);
            continuation = outcome.next.clone();

            if outcome.stalled {
                debug!("Pagination stalled at {continuation}");
                break StopReason::Stalled;
            }
            if !self.config.follow_cursor {
                break StopReason::SinglePage;
            }
            if outcome.exhausted {
                break StopReason::Exhausted;
            }
            if outcome.is_terminal() {
                break StopReason::Complete;
            }

            debug!(
                "{}",
                pacing_message(
                    &RateWindow::from_headers(&response.headers),
                    pacing,
                    now,
                    self.config.governor.force_fixed_wait,
                )
            );
            self.pause(pacing, &mut stats).await;
        };

        if !continuation.has_cursor() {
            record.clear().await?;
        }

        stats.set_duration(start.elapsed().as_millis() as u64);
        debug!(
            "Finished after {} requests ({} throttled): {stop_reason:?}",
            stats.requests_sent, stats.throttled
        );

        Ok(LoopReport {
            fingerprint,
            continuation,
            stop_reason,
            stats,
        })
    }

    /// Explicit values win; otherwise load the saved record unless resume is off
    async fn initial_continuation(
        &self,
        request: &RequestDescriptor,
        record: &ResumeHandle,
    ) -> Result<Continuation> {
        if !request.explicit.is_empty() {
            return Ok(request.explicit.clone());
        }
        if !self.config.resume {
            return Ok(Continuation::new());
        }

        let saved = record.load().await?;
        if !saved.is_empty() {
            info!("Resuming from {saved} (use --no-resume to disable)");
        }
        Ok(saved)
    }

    async fn pause(&self, delay: Duration, stats: &mut LoopStats) {
        if delay.is_zero() {
            return;
        }
        self.clock.sleep(delay).await;
        stats.add_sleep(delay);
    }
}

impl std::fmt::Debug for RequestLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLoop")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn log_throttle(response: &RawResponse, delay: Duration, now: f64) {
    let window = RateWindow::from_headers(&response.headers);
    match window.seconds_to_reset(now) {
        Some(delta) if delta > 0.0 => {
            warn!("Rate limit exceeded, reset in {delta:.1}s");
        }
        _ => warn!(
            "Rate limit exceeded, reset time unknown - sleeping for {:.1}s",
            delay.as_secs_f64()
        ),
    }
}

/// Pacing log line; the header window is only shown when it drove the delay
fn pacing_message(window: &RateWindow, delay: Duration, now: f64, fixed: bool) -> String {
    match (window.remaining, window.seconds_to_reset(now)) {
        (Some(remaining), Some(delta)) if !fixed => format!(
            "Sleeping for {:.2}s (ratelimit {remaining}/{}, reset {delta:.0}s)",
            delay.as_secs_f64(),
            window
                .limit
                .map_or_else(|| "?".to_string(), |limit| limit.to_string()),
        ),
        _ => format!("Sleeping for {:.2}s", delay.as_secs_f64()),
    }
}
