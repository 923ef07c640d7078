//! Suite run command

use std::sync::Arc;

use anyhow::Result;
use bifrost_eval::{EvalRunner, generate_report};
use tokio_util::sync::CancellationToken;

use super::{load_config, load_replayer, load_suite, progress_printer};
use crate::args::RunArgs;
use crate::console::CliConsole;

/// Run a suite against recorded traces and print the report
pub async fn run(args: RunArgs, cancel: CancellationToken, verbose: bool) -> Result<()> {
    let console = CliConsole::new(verbose);

    let mut config = load_config(&args.options)?;
    if let Some(dir) = &args.output {
        config = config.with_output_dir(dir);
    }

    let suite = load_suite(&args.suite, &config)?;
    let replayer = load_replayer(&args.traces, &args.options)?;

    let mut runner = EvalRunner::from_config(&config)?.with_cancellation(cancel.clone());
    if verbose {
        runner = runner.with_progress_callback(progress_printer());
    }

    console.info(&format!(
        "Running suite '{}' ({} scenarios, max concurrency {})",
        suite.name,
        suite.len(),
        runner.max_concurrency()
    ));

    let result = runner.run(&suite, Arc::new(replayer)).await?;

    println!("{}", generate_report(&result, args.options.format)?);

    if cancel.is_cancelled() {
        console.warn("Evaluation was cancelled; results are partial");
    }
    console.success(&format!(
        "Evaluation complete: {}/{} scenarios passed ({:.1}%), grade {}",
        result.passed_count(),
        result.total_count(),
        result.pass_rate() * 100.0,
        result.grade()
    ));

    Ok(())
}
