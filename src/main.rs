// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! pagewalk CLI
//!
//! Polls one API endpoint and prints each response as a JSON line

use clap::Parser;
use pagewalk::cli::{Cli, Runner};
use pagewalk::Error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; payloads own stdout, logs go to stderr
    let default_filter = if cli.debug {
        "info,pagewalk=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let runner = Runner::new(cli);

    let result = tokio::select! {
        result = runner.run() => result.map(|_| ()),
        _ = tokio::signal::ctrl_c() => Err(Error::Interrupted),
    };

    if let Err(e) = result {
        match &e {
            Error::Interrupted => warn!("Interrupted, resume state kept"),
            other => eprintln!("Error: {other}"),
        }
        std::process::exit(e.exit_code());
    }
}
