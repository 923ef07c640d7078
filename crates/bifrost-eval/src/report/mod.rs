//! Report generation for evaluation results
//!
//! Generates reports in various formats (JSON, Markdown, terminal table).

mod json;
mod markdown;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

use std::str::FromStr;

use anyhow::Result;

use crate::compare::ComparisonResult;
use crate::error::BifrostError;
use crate::model::{EvalResult, ScenarioStatus};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    Json,
    Markdown,
    #[default]
    Table,
}

impl ReportFormat {
    /// File extension for reports written to disk
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
            ReportFormat::Table => "txt",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = BifrostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "table" | "text" => Ok(ReportFormat::Table),
            other => Err(BifrostError::config(format!(
                "Unknown report format '{}', expected json, markdown or table",
                other
            ))),
        }
    }
}

/// Generate a report in the specified format
pub fn generate_report(result: &EvalResult, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => JsonReporter::generate(result),
        ReportFormat::Markdown => MarkdownReporter::generate(result),
        ReportFormat::Table => Ok(generate_table(result)),
    }
}

/// Generate a comparison report in the specified format
pub fn generate_comparison_report(
    comparison: &ComparisonResult,
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Json => JsonReporter::generate_comparison(comparison),
        ReportFormat::Markdown => MarkdownReporter::generate_comparison(comparison),
        ReportFormat::Table => Ok(generate_comparison_table(comparison)),
    }
}

/// Generate a simple table report for terminal output
fn generate_table(result: &EvalResult) -> String {
    let mut output = String::new();

    // Header
    output.push_str(&format!(
        "\n{:=<70}\n",
        format!("= Evaluation Results: {} ", result.suite_name)
    ));
    output.push_str(&format!("Run: {}\n", result.run_id));
    output.push_str(&format!(
        "Timestamp: {}\n",
        result.run_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("{:=<70}\n\n", ""));

    // Summary
    output.push_str("SUMMARY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "Passed: {}/{} ({:.1}%)\n",
        result.passed_count(),
        result.total_count(),
        result.pass_rate() * 100.0
    ));
    output.push_str(&format!("Mean Score: {:.3}\n", result.mean_score()));
    output.push_str(&format!("Grade: {}\n", result.grade()));
    output.push_str(&format!(
        "Total Cost: {} ({} tokens)\n",
        result.total_cost.format_cost(),
        result.total_cost.total_tokens()
    ));
    output.push_str(&format!(
        "Latency: total {:.0}ms | p50 {:.0}ms | p95 {:.0}ms | p99 {:.0}ms\n\n",
        result.total_latency.total_ms,
        result.total_latency.p50_ms,
        result.total_latency.p95_ms,
        result.total_latency.p99_ms
    ));

    // Scenario Results
    output.push_str("SCENARIO RESULTS\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<30} {:>10} {:>11} {:>7} {:>9}\n",
        "Scenario", "Status", "Grade", "Score", "Time"
    ));
    output.push_str(&format!("{:-<70}\n", ""));

    for outcome in &result.outcomes {
        let status = match outcome.status {
            ScenarioStatus::Completed if outcome.passed => "PASS",
            ScenarioStatus::Completed => "FAIL",
            ScenarioStatus::TimedOut => "TIMEOUT",
            ScenarioStatus::Errored => "ERROR",
            ScenarioStatus::Pending | ScenarioStatus::Running => "PENDING",
        };

        output.push_str(&format!(
            "{:<30} {:>10} {:>11} {:>7.3} {:>7.0}ms\n",
            truncate(&outcome.scenario_name, 28),
            status,
            outcome.grade.display_name(),
            outcome.weighted_score(),
            outcome.latency.total_ms
        ));
    }

    output.push_str(&format!("{:=<70}\n", ""));
    output
}

fn generate_comparison_table(comparison: &ComparisonResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{:=<70}\n",
        format!("= Comparison: {} ", comparison.suite_name)
    ));
    output.push_str(&format!(
        "{:<24} {:>8} {:>8} {:>10} {:>10}\n",
        "Configuration", "Score", "Pass", "Cost", "Latency"
    ));
    output.push_str(&format!("{:-<70}\n", ""));

    for (name, summary) in &comparison.summary {
        let marker = if *name == comparison.winner { "*" } else { " " };
        output.push_str(&format!(
            "{}{:<23} {:>8.3} {:>7.1}% {:>10.4} {:>8.0}ms\n",
            marker,
            truncate(name, 22),
            summary.mean_score,
            summary.pass_rate * 100.0,
            summary.total_cost_usd,
            summary.total_latency_ms
        ));
    }

    output.push_str(&format!("{:-<70}\n", ""));
    if comparison.winner.is_empty() {
        output.push_str("Winner: none\n");
    } else {
        output.push_str(&format!("Winner: {}\n", comparison.winner));
    }
    output.push_str(&format!("{:=<70}\n", ""));
    output
}

fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() > max_chars {
        let head: String = name.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
