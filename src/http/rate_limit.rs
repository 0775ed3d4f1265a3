//! Rate governor
//!
//! Reads the server's rate-limit headers and decides how long to wait
//! before the next request. The governor never sleeps itself; it returns a
//! [`RateDecision`] that the request loop acts on.

use reqwest::header::HeaderMap;
use std::time::Duration;

/// Statuses the server uses to signal an exhausted rate window
pub const RATE_LIMIT_STATUSES: [u16; 2] = [420, 429];

/// Requests allowed in the current window
pub const LIMIT_HEADER: &str = "x-rate-limit-limit";
/// Requests left in the current window
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
/// Unix time at which the window resets
pub const RESET_HEADER: &str = "x-rate-limit-reset";

/// What to do after a response
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateDecision {
    /// Throttled: wait, then resend the same request
    Retry(Duration),
    /// Not throttled: wait this long before the next page
    Continue(Duration),
    /// Throttled with no usable reset time, give up
    Stop,
}

/// Behavior when a throttled response carries no usable reset time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Sleep the fallback duration and retry
    #[default]
    Fallback,
    /// Abort the run
    Abort,
}

/// Configuration for the rate governor
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    /// Wait between pages when headers give no pacing information
    pub fixed_wait: Duration,
    /// Sleep when throttled and the reset time is unknown
    pub fallback: Duration,
    /// Policy when throttled and the reset time is unknown
    pub reset_policy: ResetPolicy,
    /// Always use `fixed_wait` between pages, ignoring headers
    pub force_fixed_wait: bool,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            fixed_wait: Duration::ZERO,
            fallback: Duration::from_secs(900),
            reset_policy: ResetPolicy::Fallback,
            force_fixed_wait: false,
        }
    }
}

impl GovernorConfig {
    /// Create a default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixed wait between pages
    #[must_use]
    pub fn with_fixed_wait(mut self, wait: Duration) -> Self {
        self.fixed_wait = wait;
        self
    }

    /// Set the fallback sleep for unknown reset times
    #[must_use]
    pub fn with_fallback(mut self, fallback: Duration) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set the unknown-reset policy
    #[must_use]
    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    /// Ignore rate-limit headers when pacing
    #[must_use]
    pub fn with_force_fixed_wait(mut self, force: bool) -> Self {
        self.force_fixed_wait = force;
        self
    }
}

/// Rate window reported by the server on one response
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateWindow {
    /// Requests allowed per window
    pub limit: Option<u64>,
    /// Requests left in the window
    pub remaining: Option<f64>,
    /// Unix time (seconds) when the window resets
    pub reset_epoch: Option<f64>,
}

impl RateWindow {
    /// Parse the window from response headers; missing or non-numeric values are `None`
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: header_number(headers, LIMIT_HEADER).map(|v| v.max(0.0) as u64),
            remaining: header_number(headers, REMAINING_HEADER),
            reset_epoch: header_number(headers, RESET_HEADER),
        }
    }

    /// Seconds until reset, if the reset time is known
    pub fn seconds_to_reset(&self, now: f64) -> Option<f64> {
        self.reset_epoch.map(|reset| reset - now)
    }
}

/// Decides retry and pacing delays from response status and headers
#[derive(Debug, Clone, Default)]
pub struct RateGovernor {
    config: GovernorConfig,
}

impl RateGovernor {
    /// Create a governor
    pub fn new(config: GovernorConfig) -> Self {
        Self { config }
    }

    /// The governor's configuration
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Whether a status signals an exhausted rate window
    pub fn is_rate_limited(status: u16) -> bool {
        RATE_LIMIT_STATUSES.contains(&status)
    }

    /// Classify a response
    ///
    /// `now` is the current Unix time in seconds.
    pub fn assess(&self, status: u16, headers: &HeaderMap, now: f64) -> RateDecision {
        let window = RateWindow::from_headers(headers);

        if Self::is_rate_limited(status) {
            return match self.reset_delay(&window, now) {
                Some(delay) => RateDecision::Retry(delay),
                None => match self.config.reset_policy {
                    ResetPolicy::Fallback => RateDecision::Retry(self.config.fallback),
                    ResetPolicy::Abort => RateDecision::Stop,
                },
            };
        }

        RateDecision::Continue(self.pacing_delay(&window, now))
    }

    /// Time until a future reset; `None` when unknown, non-positive or already past
    pub fn reset_delay(&self, window: &RateWindow, now: f64) -> Option<Duration> {
        let reset = window.reset_epoch.filter(|reset| *reset > 0.0)?;
        let delta = reset - now;
        (delta > 0.0).then(|| secs(delta))
    }

    /// Delay before the next page after a successful response
    ///
    /// Spreads the remaining budget evenly over the rest of the window.
    pub fn pacing_delay(&self, window: &RateWindow, now: f64) -> Duration {
        if self.config.force_fixed_wait {
            return self.config.fixed_wait;
        }

        match (window.remaining, window.reset_epoch) {
            (Some(remaining), Some(reset)) if remaining > 0.0 => {
                secs((reset - now) / remaining.max(1.0))
            }
            _ => self.config.fixed_wait,
        }
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<f64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Non-negative seconds to a `Duration`
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use test_case::test_case;

    const NOW: f64 = 1_700_000_000.0;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn assert_close(actual: Duration, expected_secs: f64) {
        assert!(
            (actual.as_secs_f64() - expected_secs).abs() < 1e-6,
            "expected {expected_secs}s, got {actual:?}"
        );
    }

    #[test]
    fn test_governor_config_default() {
        let config = GovernorConfig::default();
        assert_eq!(config.fixed_wait, Duration::ZERO);
        assert_eq!(config.fallback, Duration::from_secs(900));
        assert_eq!(config.reset_policy, ResetPolicy::Fallback);
        assert!(!config.force_fixed_wait);
    }

    #[test_case(420, true ; "enhance your calm")]
    #[test_case(429, true ; "too many requests")]
    #[test_case(200, false ; "ok")]
    #[test_case(503, false ; "unavailable")]
    fn test_is_rate_limited(status: u16, expected: bool) {
        assert_eq!(RateGovernor::is_rate_limited(status), expected);
    }

    #[test]
    fn test_rate_window_from_headers() {
        let window = RateWindow::from_headers(&headers(&[
            (LIMIT_HEADER, "900"),
            (REMAINING_HEADER, "899"),
            (RESET_HEADER, "1700000900"),
        ]));
        assert_eq!(window.limit, Some(900));
        assert_eq!(window.remaining, Some(899.0));
        assert_eq!(window.reset_epoch, Some(1_700_000_900.0));
        assert_eq!(window.seconds_to_reset(NOW), Some(900.0));
    }

    #[test]
    fn test_rate_window_non_numeric_headers() {
        let window = RateWindow::from_headers(&headers(&[
            (REMAINING_HEADER, "lots"),
            (RESET_HEADER, ""),
        ]));
        assert_eq!(window, RateWindow::default());
    }

    #[test]
    fn test_throttled_with_future_reset_retries_until_reset() {
        let governor = RateGovernor::default();
        let reset = format!("{}", NOW + 42.0);
        let decision = governor.assess(429, &headers(&[(RESET_HEADER, &reset)]), NOW);
        match decision {
            RateDecision::Retry(delay) => assert_close(delay, 42.0),
            other => panic!("Expected Retry, got {other:?}"),
        }
    }

    #[test_case(&[] ; "missing reset")]
    #[test_case(&[(RESET_HEADER, "0")] ; "zero reset")]
    #[test_case(&[(RESET_HEADER, "-5")] ; "negative reset")]
    #[test_case(&[(RESET_HEADER, "1699999000")] ; "reset in the past")]
    #[test_case(&[(RESET_HEADER, "soon")] ; "non numeric reset")]
    fn test_throttled_without_usable_reset(pairs: &[(&'static str, &str)]) {
        let fallback = RateGovernor::new(
            GovernorConfig::new().with_fallback(Duration::from_secs(60)),
        );
        assert_eq!(
            fallback.assess(420, &headers(pairs), NOW),
            RateDecision::Retry(Duration::from_secs(60))
        );

        let abort =
            RateGovernor::new(GovernorConfig::new().with_reset_policy(ResetPolicy::Abort));
        assert_eq!(abort.assess(429, &headers(pairs), NOW), RateDecision::Stop);
    }

    #[test]
    fn test_pacing_spreads_remaining_budget() {
        let governor = RateGovernor::default();
        let reset = format!("{}", NOW + 100.0);
        let decision = governor.assess(
            200,
            &headers(&[(REMAINING_HEADER, "10"), (RESET_HEADER, &reset)]),
            NOW,
        );
        match decision {
            RateDecision::Continue(delay) => assert_close(delay, 10.0),
            other => panic!("Expected Continue, got {other:?}"),
        }
    }

    #[test]
    fn test_pacing_zero_remaining_uses_fixed_wait() {
        let governor =
            RateGovernor::new(GovernorConfig::new().with_fixed_wait(Duration::from_secs(3)));
        let reset = format!("{}", NOW + 100.0);
        let decision = governor.assess(
            200,
            &headers(&[(REMAINING_HEADER, "0"), (RESET_HEADER, &reset)]),
            NOW,
        );
        assert_eq!(decision, RateDecision::Continue(Duration::from_secs(3)));
    }

    #[test]
    fn test_pacing_fractional_remaining_is_clamped() {
        let governor = RateGovernor::default();
        let window = RateWindow {
            limit: None,
            remaining: Some(0.5),
            reset_epoch: Some(NOW + 20.0),
        };
        assert_close(governor.pacing_delay(&window, NOW), 20.0);
    }

    #[test]
    fn test_pacing_past_reset_is_zero() {
        let governor = RateGovernor::default();
        let window = RateWindow {
            limit: Some(900),
            remaining: Some(5.0),
            reset_epoch: Some(NOW - 30.0),
        };
        assert_eq!(governor.pacing_delay(&window, NOW), Duration::ZERO);
    }

    #[test]
    fn test_pacing_missing_headers_uses_fixed_wait() {
        let governor =
            RateGovernor::new(GovernorConfig::new().with_fixed_wait(Duration::from_millis(1500)));
        assert_eq!(
            governor.assess(200, &HeaderMap::new(), NOW),
            RateDecision::Continue(Duration::from_millis(1500))
        );
        assert_eq!(
            governor.assess(200, &headers(&[(REMAINING_HEADER, "10")]), NOW),
            RateDecision::Continue(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_force_fixed_wait_ignores_headers() {
        let governor = RateGovernor::new(
            GovernorConfig::new()
                .with_fixed_wait(Duration::from_secs(2))
                .with_force_fixed_wait(true),
        );
        let reset = format!("{}", NOW + 100.0);
        assert_eq!(
            governor.assess(
                200,
                &headers(&[(REMAINING_HEADER, "1"), (RESET_HEADER, &reset)]),
                NOW
            ),
            RateDecision::Continue(Duration::from_secs(2))
        );
    }

    #[test]
    fn test_error_status_is_not_throttled() {
        let governor = RateGovernor::default();
        assert_eq!(
            governor.assess(404, &HeaderMap::new(), NOW),
            RateDecision::Continue(Duration::ZERO)
        );
    }
}
