//! Report and diff commands for saved results

use std::path::Path;

use anyhow::{Context, Result, bail};
use bifrost_eval::{
    ComparisonResult, EvalResult, RegressionDetector, ReportFormat, generate_comparison_report,
    generate_report,
};

use crate::console::CliConsole;

async fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn load_result(path: &Path) -> Result<EvalResult> {
    serde_json::from_value(read_json(path).await?)
        .with_context(|| format!("{} is not a saved evaluation result", path.display()))
}

/// Show a report from a previous run or comparison
pub async fn report(input: &Path, format: ReportFormat) -> Result<()> {
    let value = read_json(input).await?;

    let report = if value.get("winner").is_some() {
        let comparison: ComparisonResult = serde_json::from_value(value)
            .with_context(|| format!("{} is not a saved comparison", input.display()))?;
        generate_comparison_report(&comparison, format)?
    } else {
        let result: EvalResult = serde_json::from_value(value)
            .with_context(|| format!("{} is not a saved evaluation result", input.display()))?;
        generate_report(&result, format)?
    };
    println!("{}", report);

    Ok(())
}

/// Compare two evaluation results
pub async fn diff(baseline: &Path, current: &Path, fail_on_regression: bool) -> Result<()> {
    let baseline_result = load_result(baseline).await?;
    let current_result = load_result(current).await?;

    let regressions = RegressionDetector::with_defaults().detect(&baseline_result, &current_result);

    println!("Comparison: {} vs {}\n", baseline.display(), current.display());
    println!(
        "{:<20} {:>15} {:>15} {:>15}",
        "Metric", "Baseline", "Current", "Change"
    );
    println!("{:-<65}", "");

    let baseline_rate = baseline_result.pass_rate() * 100.0;
    let current_rate = current_result.pass_rate() * 100.0;
    println!(
        "{:<20} {:>14.1}% {:>14.1}% {:>+14.1}%",
        "Pass Rate",
        baseline_rate,
        current_rate,
        current_rate - baseline_rate
    );

    let baseline_score = baseline_result.mean_score();
    let current_score = current_result.mean_score();
    println!(
        "{:<20} {:>15.3} {:>15.3} {:>+15.3}",
        "Mean Score",
        baseline_score,
        current_score,
        current_score - baseline_score
    );

    let baseline_cost = baseline_result.total_cost.total_usd;
    let current_cost = current_result.total_cost.total_usd;
    println!(
        "{:<20} {:>15.4} {:>15.4} {:>+15.4}",
        "Total Cost ($)",
        baseline_cost,
        current_cost,
        current_cost - baseline_cost
    );

    let baseline_p95 = baseline_result.total_latency.p95_ms;
    let current_p95 = current_result.total_latency.p95_ms;
    println!(
        "{:<20} {:>13.0}ms {:>13.0}ms {:>+13.0}ms",
        "p95 Latency",
        baseline_p95,
        current_p95,
        current_p95 - baseline_p95
    );

    println!();
    println!("{}", RegressionDetector::summarize(&regressions));

    if fail_on_regression && !regressions.is_empty() {
        bail!("{} regression(s) detected", regressions.len());
    }
    if regressions.is_empty() {
        CliConsole::new(false).success("No regressions");
    }

    Ok(())
}
