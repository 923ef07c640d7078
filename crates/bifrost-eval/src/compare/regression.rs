//! Regression detection for evaluation results
//!
//! Compares a current result against a baseline run of the same suite.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::EvalResult;

/// A detected regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub regression_type: RegressionType,

    pub description: String,

    /// Baseline value, formatted
    pub baseline_value: String,

    /// Current value, formatted
    pub current_value: String,

    /// Severity (0.0 - 1.0)
    pub severity: f64,
}

/// Type of regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionType {
    /// Pass rate decreased
    PassRateDecrease,
    /// Mean weighted score decreased
    ScoreDecrease,
    /// Total cost increased significantly
    CostIncrease,
    /// p95 latency increased significantly
    LatencyIncrease,
    /// Previously passing scenario now fails
    ScenarioRegression,
}

/// Regression detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// Absolute pass rate decrease tolerated (0.05 = 5 points)
    pub pass_rate_threshold: f64,

    /// Absolute mean score decrease tolerated
    pub score_threshold: f64,

    /// Relative total cost increase tolerated (0.20 = 20%)
    pub cost_threshold: f64,

    /// Relative p95 latency increase tolerated (0.50 = 50%)
    pub latency_threshold: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            pass_rate_threshold: 0.05,
            score_threshold: 0.05,
            cost_threshold: 0.20,
            latency_threshold: 0.50,
        }
    }
}

/// Detector for finding regressions between evaluation runs
#[derive(Debug, Clone, Default)]
pub struct RegressionDetector {
    config: RegressionConfig,
}

impl RegressionDetector {
    pub fn new(config: RegressionConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(RegressionConfig::default())
    }

    /// Compare current result against baseline
    pub fn detect(&self, baseline: &EvalResult, current: &EvalResult) -> Vec<Regression> {
        let mut regressions: Vec<Regression> = [
            self.check_pass_rate(baseline, current),
            self.check_score(baseline, current),
            self.check_cost(baseline, current),
            self.check_latency(baseline, current),
        ]
        .into_iter()
        .flatten()
        .collect();

        regressions.extend(self.check_scenario_regressions(baseline, current));

        if !regressions.is_empty() {
            tracing::info!(
                suite = %current.suite_name,
                count = regressions.len(),
                "Regressions detected"
            );
        }
        regressions
    }

    fn check_pass_rate(&self, baseline: &EvalResult, current: &EvalResult) -> Option<Regression> {
        let baseline_rate = baseline.pass_rate();
        let current_rate = current.pass_rate();

        (baseline_rate - current_rate > self.config.pass_rate_threshold).then(|| Regression {
            regression_type: RegressionType::PassRateDecrease,
            description: format!(
                "Pass rate decreased from {:.1}% to {:.1}%",
                baseline_rate * 100.0,
                current_rate * 100.0
            ),
            baseline_value: format!("{:.1}%", baseline_rate * 100.0),
            current_value: format!("{:.1}%", current_rate * 100.0),
            severity: ((baseline_rate - current_rate) / baseline_rate.max(0.01)).min(1.0),
        })
    }

    fn check_score(&self, baseline: &EvalResult, current: &EvalResult) -> Option<Regression> {
        let baseline_score = baseline.mean_score();
        let current_score = current.mean_score();

        (baseline_score - current_score > self.config.score_threshold).then(|| Regression {
            regression_type: RegressionType::ScoreDecrease,
            description: format!(
                "Mean score decreased from {:.3} to {:.3}",
                baseline_score, current_score
            ),
            baseline_value: format!("{:.3}", baseline_score),
            current_value: format!("{:.3}", current_score),
            severity: ((baseline_score - current_score) / baseline_score.max(0.01)).min(1.0),
        })
    }

    fn check_cost(&self, baseline: &EvalResult, current: &EvalResult) -> Option<Regression> {
        let baseline_cost = baseline.total_cost.total_usd;
        let current_cost = current.total_cost.total_usd;

        let increase = relative_increase(baseline_cost, current_cost)?;
        (increase > self.config.cost_threshold).then(|| Regression {
            regression_type: RegressionType::CostIncrease,
            description: format!("Total cost increased by {:.1}%", increase * 100.0),
            baseline_value: baseline.total_cost.format_cost(),
            current_value: current.total_cost.format_cost(),
            severity: (increase / 2.0).min(1.0),
        })
    }

    fn check_latency(&self, baseline: &EvalResult, current: &EvalResult) -> Option<Regression> {
        let baseline_p95 = baseline.total_latency.p95_ms;
        let current_p95 = current.total_latency.p95_ms;

        let increase = relative_increase(baseline_p95, current_p95)?;
        (increase > self.config.latency_threshold).then(|| Regression {
            regression_type: RegressionType::LatencyIncrease,
            description: format!("p95 latency increased by {:.1}%", increase * 100.0),
            baseline_value: format!("{:.0}ms", baseline_p95),
            current_value: format!("{:.0}ms", current_p95),
            severity: (increase / 3.0).min(1.0),
        })
    }

    fn check_scenario_regressions(
        &self,
        baseline: &EvalResult,
        current: &EvalResult,
    ) -> Vec<Regression> {
        let baseline_map: HashMap<&str, bool> = baseline
            .outcomes
            .iter()
            .map(|o| (o.scenario_name.as_str(), o.passed))
            .collect();

        current
            .outcomes
            .iter()
            .filter(|o| !o.passed && baseline_map.get(o.scenario_name.as_str()) == Some(&true))
            .map(|o| Regression {
                regression_type: RegressionType::ScenarioRegression,
                description: format!(
                    "Scenario '{}' was passing but now fails",
                    o.scenario_name
                ),
                baseline_value: "PASS".to_string(),
                current_value: match &o.error {
                    Some(error) => format!("{} ({})", o.grade, error),
                    None => o.grade.to_string(),
                },
                severity: 0.8,
            })
            .collect()
    }

    /// Generate a summary of regressions
    pub fn summarize(regressions: &[Regression]) -> String {
        if regressions.is_empty() {
            return "No regressions detected.".to_string();
        }

        let mut summary = format!("Found {} regression(s):\n", regressions.len());

        for (i, reg) in regressions.iter().enumerate() {
            summary.push_str(&format!(
                "  {}. [{:?}] {} (severity: {:.0}%)\n",
                i + 1,
                reg.regression_type,
                reg.description,
                reg.severity * 100.0
            ));
        }

        summary
    }
}

fn relative_increase(baseline: f64, current: f64) -> Option<f64> {
    (baseline > 0.0).then(|| (current - baseline) / baseline)
}
