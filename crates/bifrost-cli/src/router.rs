//! Command routing logic for CLI

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::args::{Cli, Commands};
use crate::commands;
use crate::signal_handler::SignalHandler;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<()> {
    let verbose = cli.verbose;
    match cli.command {
        Commands::Validate { suite } => commands::validate::validate(&suite),
        Commands::Run(args) => {
            let (_signals, token) = interruptible()?;
            commands::run::run(args, token, verbose).await
        }
        Commands::Compare(args) => {
            let (_signals, token) = interruptible()?;
            commands::compare::compare(args, token, verbose).await
        }
        Commands::Report { input, format } => commands::report::report(&input, format).await,
        Commands::Diff {
            baseline,
            current,
            fail_on_regression,
        } => commands::report::diff(&baseline, &current, fail_on_regression).await,
    }
}

/// Cancellation token wired to Ctrl+C for as long as the handler lives
fn interruptible() -> Result<(SignalHandler, CancellationToken)> {
    let token = CancellationToken::new();
    let mut handler = SignalHandler::new(token.clone());
    handler.start()?;
    Ok((handler, token))
}
