//! Configuration comparison command

use std::sync::Arc;

use anyhow::Result;
use bifrost_eval::{ComparisonRunner, EvalRunner, PipelineExecutor, generate_comparison_report};
use tokio_util::sync::CancellationToken;

use super::{load_config, load_replayer, load_suite, progress_printer};
use crate::args::CompareArgs;
use crate::console::CliConsole;

/// Replay each named configuration over the suite and rank them
pub async fn compare(args: CompareArgs, cancel: CancellationToken, verbose: bool) -> Result<()> {
    let console = CliConsole::new(verbose);

    let config = load_config(&args.options)?;
    let suite = load_suite(&args.suite, &config)?;

    let mut configurations: Vec<(String, Arc<dyn PipelineExecutor>)> =
        Vec::with_capacity(args.configurations.len());
    for (name, traces) in &args.configurations {
        let replayer = load_replayer(traces, &args.options)?;
        console.info(&format!(
            "Configuration '{}': {} recorded traces",
            name,
            replayer.library().len()
        ));
        let executor: Arc<dyn PipelineExecutor> = Arc::new(replayer);
        configurations.push((name.clone(), executor));
    }

    let mut runner = EvalRunner::from_config(&config)?.with_cancellation(cancel.clone());
    if verbose {
        runner = runner.with_progress_callback(progress_printer());
    }
    let comparison = ComparisonRunner::new(runner)
        .with_parallel(args.parallel || config.parallel_configurations)
        .compare(&suite, configurations)
        .await?;

    println!(
        "{}",
        generate_comparison_report(&comparison, args.options.format)?
    );

    if cancel.is_cancelled() {
        console.warn("Comparison was cancelled; results are partial");
    }
    console.success(&format!("Winner: {}", comparison.winner));

    Ok(())
}
