//! Markdown report generation

use anyhow::Result;

use crate::compare::ComparisonResult;
use crate::model::{EvalResult, ScenarioStatus};

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(result: &EvalResult) -> Result<String> {
        let mut md = String::new();

        md.push_str(&format!("# Evaluation Report: {}\n\n", result.suite_name));

        // Overview
        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Run ID**: {}\n", result.run_id));
        md.push_str(&format!(
            "- **Timestamp**: {}\n",
            result.run_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        md.push_str(&format!("- **Scenarios**: {}\n", result.total_count()));
        md.push_str(&format!("- **Grade**: {}\n\n", result.grade()));

        // Summary
        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Value |\n|--------|-------|\n");
        md.push_str(&format!(
            "| Pass Rate | {}/{} ({:.1}%) |\n",
            result.passed_count(),
            result.total_count(),
            result.pass_rate() * 100.0
        ));
        md.push_str(&format!("| Mean Score | {:.3} |\n", result.mean_score()));
        md.push_str(&format!(
            "| Total Cost | {} |\n",
            result.total_cost.format_cost()
        ));
        md.push_str(&format!(
            "| Total Tokens | {} |\n",
            result.total_cost.total_tokens()
        ));
        md.push_str(&format!(
            "| Total Latency | {:.0}ms |\n",
            result.total_latency.total_ms
        ));
        md.push_str(&format!(
            "| Latency p50 / p95 / p99 | {:.0}ms / {:.0}ms / {:.0}ms |\n\n",
            result.total_latency.p50_ms, result.total_latency.p95_ms, result.total_latency.p99_ms
        ));

        // Scenarios
        md.push_str("## Scenario Results\n\n");
        md.push_str("| Scenario | Status | Grade | Score | Latency | Cost |\n");
        md.push_str("|----------|--------|-------|-------|---------|------|\n");

        for outcome in &result.outcomes {
            let status_emoji = match outcome.status {
                ScenarioStatus::Completed if outcome.passed => "✅",
                ScenarioStatus::Completed => "❌",
                ScenarioStatus::TimedOut => "⏱️",
                ScenarioStatus::Errored => "💥",
                ScenarioStatus::Pending | ScenarioStatus::Running => "⏳",
            };

            md.push_str(&format!(
                "| {} | {} | {} | {:.3} | {:.0}ms | {} |\n",
                outcome.scenario_name,
                status_emoji,
                outcome.grade,
                outcome.weighted_score(),
                outcome.latency.total_ms,
                outcome.cost.format_cost()
            ));
        }
        md.push('\n');

        // Failed scenario details
        let failed: Vec<_> = result.outcomes.iter().filter(|o| !o.passed).collect();

        if !failed.is_empty() {
            md.push_str("## Failed Scenarios\n\n");

            for outcome in failed {
                md.push_str(&format!("### {}\n\n", outcome.scenario_name));
                md.push_str(&format!("- **Status**: {}\n", outcome.status));
                md.push_str(&format!("- **Grade**: {}\n", outcome.grade));

                if let Some(ref error) = outcome.error {
                    md.push_str(&format!("- **Error**: {}\n", error));
                }

                for score in &outcome.scores {
                    md.push_str(&format!(
                        "- `{}` = {:.3} (weight {}): {}\n",
                        score.name(),
                        score.value(),
                        score.weight(),
                        score.details()
                    ));
                }
                md.push('\n');
            }
        }

        Ok(md)
    }

    /// Generate a Markdown comparison report
    pub fn generate_comparison(comparison: &ComparisonResult) -> Result<String> {
        let mut md = String::new();

        md.push_str(&format!("# Comparison Report: {}\n\n", comparison.suite_name));

        if comparison.winner.is_empty() {
            md.push_str("No configurations were compared.\n");
            return Ok(md);
        }
        md.push_str(&format!("**Winner**: {}\n\n", comparison.winner));

        md.push_str("| Configuration | Mean Score | Pass Rate | Cost | Latency | Grade |\n");
        md.push_str("|---------------|------------|-----------|------|---------|-------|\n");
        for (name, summary) in &comparison.summary {
            let name = if *name == comparison.winner {
                format!("**{}**", name)
            } else {
                name.clone()
            };
            md.push_str(&format!(
                "| {} | {:.3} | {:.1}% | ${:.4} | {:.0}ms | {} |\n",
                name,
                summary.mean_score,
                summary.pass_rate * 100.0,
                summary.total_cost_usd,
                summary.total_latency_ms,
                summary.grade
            ));
        }
        md.push('\n');

        Ok(md)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CostBreakdown, EvalScore, ExecutionTrace, LatencyBreakdown, ScenarioOutcome};

    fn create_test_result() -> EvalResult {
        let mut passed = ScenarioOutcome::from_trace("greet", ExecutionTrace::new("hello"));
        passed.scores.push(EvalScore::new("accuracy", 1.0).unwrap());
        passed.grade = crate::model::GradeLevel::Excellent;

        let timed_out = ScenarioOutcome::timed_out("slow", 1000.0, 1000.0);

        EvalResult::new(
            "smoke",
            vec![passed, timed_out],
            CostBreakdown::with_total(0.5),
            LatencyBreakdown::with_total(1200.0),
        )
    }

    #[test]
    fn test_markdown_generation() {
        let md = MarkdownReporter::generate(&create_test_result()).unwrap();

        assert!(md.contains("# Evaluation Report: smoke"));
        assert!(md.contains("| Pass Rate | 1/2 (50.0%) |"));
        assert!(md.contains("| greet | ✅ | EXCELLENT |"));
        assert!(md.contains("## Failed Scenarios"));
        assert!(md.contains("### slow"));
        assert!(md.contains("- **Status**: timed_out"));
    }

    #[test]
    fn test_comparison_markdown_marks_winner() {
        let comparison = ComparisonResult::from_results(
            "smoke",
            vec![("baseline".to_string(), create_test_result())],
        );
        let md = MarkdownReporter::generate_comparison(&comparison).unwrap();

        assert!(md.contains("**Winner**: baseline"));
        assert!(md.contains("| **baseline** |"));
    }

    #[test]
    fn test_empty_comparison_markdown() {
        let comparison = ComparisonResult::from_results("smoke", Vec::new());
        let md = MarkdownReporter::generate_comparison(&comparison).unwrap();
        assert!(md.contains("No configurations were compared."));
    }
}
