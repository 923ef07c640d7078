//! Bifrost Eval CLI
//!
//! Runs evaluation suites against recorded pipeline traces, compares
//! configurations and diffs saved results.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/bifrost-cli
//! ```

mod args;
mod commands;
mod console;
mod router;
mod signal_handler;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Cli;
use console::CliConsole;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --verbose selects debug
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match router::route(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            CliConsole::new(false).error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
