//! CLI arguments and parsing

use crate::config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::engine::LoopConfig;
use crate::error::{Error, Result};
use crate::http::{GovernorConfig, ResetPolicy};
use crate::request::{parse_param, RequestDescriptor};
use crate::state::DEFAULT_STATE_DIR;
use crate::types::{BodyMode, Method};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Poll a paginated, rate-limited REST API and print each response as a JSON line
#[derive(Parser, Debug, Clone)]
#[command(name = "pagewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use API v2 instead of v1.1
    #[arg(short = '2', long = "api-v2")]
    pub api_v2: bool,

    /// Send a POST request instead of GET
    #[arg(short, long)]
    pub post: bool,

    /// Send POST data as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Query parameters or POST data (key=value, repeatable)
    #[arg(short, long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// Wait time between requests in seconds, used when rate-limit headers give no pacing
    #[arg(short, long, default_value_t = 0.0)]
    pub wait: f64,

    /// Seconds to sleep when rate limited and the reset time is unknown
    #[arg(short, long, default_value_t = 900.0)]
    pub ratelimit: f64,

    /// Exit with an error instead of sleeping when the reset time is unknown
    #[arg(long)]
    pub abort_on_unknown_reset: bool,

    /// Don't add delays to accommodate rate limits
    #[arg(short = 'F', long)]
    pub ignore_ratelimit: bool,

    /// Follow next_cursor/max_id to fetch multiple pages
    #[arg(short = 'c', long)]
    pub follow_cursor: bool,

    /// Do not save/restore the last cursor/max_id
    #[arg(short = 'N', long)]
    pub no_resume: bool,

    /// Enable debug logging
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// User to authenticate as
    #[arg(short, long)]
    pub user: Option<String>,

    /// Credential file (TOML, or YAML by extension)
    #[arg(short = 'C', long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding resume records
    #[arg(long, default_value = DEFAULT_STATE_DIR)]
    pub state_dir: PathBuf,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// API endpoint, e.g. statuses/user_timeline
    pub endpoint: String,
}

impl Cli {
    /// HTTP method for the request
    pub fn method(&self) -> Method {
        if self.post {
            Method::POST
        } else {
            Method::GET
        }
    }

    /// Body encoding for POST data
    pub fn body_mode(&self) -> BodyMode {
        if self.json {
            BodyMode::Json
        } else {
            BodyMode::Form
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Rate governor settings from the flags
    pub fn governor_config(&self) -> Result<GovernorConfig> {
        let policy = if self.abort_on_unknown_reset {
            ResetPolicy::Abort
        } else {
            ResetPolicy::Fallback
        };

        Ok(GovernorConfig::new()
            .with_fixed_wait(seconds("wait", self.wait)?)
            .with_fallback(seconds("ratelimit", self.ratelimit)?)
            .with_reset_policy(policy)
            .with_force_fixed_wait(self.ignore_ratelimit))
    }

    /// Loop settings from the flags
    pub fn loop_config(&self) -> Result<LoopConfig> {
        Ok(LoopConfig::new()
            .with_follow_cursor(self.follow_cursor)
            .with_resume(!self.no_resume)
            .with_state_dir(&self.state_dir)
            .with_governor(self.governor_config()?))
    }

    /// Build the request descriptor
    pub fn request(&self, config: &AppConfig) -> Result<RequestDescriptor> {
        let url = config.endpoint_url(&self.endpoint, self.api_v2)?;
        let params = self
            .data
            .iter()
            .map(|raw| parse_param(raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(RequestDescriptor::new(self.method(), url)
            .params(params)
            .body_mode(self.body_mode()))
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        Error::invalid_value(field, format!("'{value}' is not a valid number of seconds"))
    })
}
