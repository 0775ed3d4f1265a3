//! CLI module
//!
//! Command-line interface for polling an endpoint.
//!
//! `pagewalk [OPTIONS] <ENDPOINT>` sends one logical request, optionally
//! following pagination, and prints every response body as a JSON line.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;
