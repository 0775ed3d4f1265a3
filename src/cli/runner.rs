//! CLI runner - wires config, transport and the request loop

use crate::cli::commands::Cli;
use crate::config::AppConfig;
use crate::engine::{JsonLinesSink, LoopReport, OutputSink, RequestLoop};
use crate::error::Result;
use crate::http::HttpClient;
use crate::types::OptionStringExt;
use std::sync::Arc;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parsed arguments
    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Run the request, printing every response to stdout
    pub async fn run(&self) -> Result<LoopReport> {
        let mut sink = JsonLinesSink::stdout();
        self.run_into(&mut sink).await
    }

    /// Run the request, emitting every response to `sink`
    pub async fn run_into(&self, sink: &mut dyn OutputSink) -> Result<LoopReport> {
        let config = AppConfig::load(&self.cli.config)?;
        let request = self.cli.request(&config)?;
        let user = self.cli.user.clone().none_if_empty();
        let context = config.client_context(user.as_deref(), self.cli.timeout())?;
        let client = HttpClient::new(context)?;

        let request_loop = RequestLoop::new(Arc::new(client), self.cli.loop_config()?);
        let report = request_loop.run(&request, sink).await?;

        debug!(
            "{} page(s) in {}ms, slept {:.1}s",
            report.stats.pages_emitted,
            report.stats.duration_ms,
            report.stats.slept.as_secs_f64()
        );
        Ok(report)
    }
}
