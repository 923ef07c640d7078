//! Scoring metrics
//!
//! A metric turns one scenario outcome plus the scenario's expectation into a
//! single normalized [`EvalScore`]. Metrics are pure: they never mutate the
//! outcome and never perform I/O.

mod accuracy;
mod cost;
mod latency;
mod tool_correctness;

pub use accuracy::{AccuracyMetric, OutputComparator};
pub use cost::{CostEfficiencyMetric, DEFAULT_COST_BUDGET_USD};
pub use latency::{DEFAULT_LATENCY_TARGET_MS, LatencyMetric};
pub use tool_correctness::{ToolCorrectnessMetric, lcs_ratio};

use std::sync::Arc;

use serde_json::Value;

use crate::error::{BifrostError, BifrostResult};
use crate::model::{EvalScore, ScenarioOutcome};
use crate::suite::Scenario;

/// Metric name for output accuracy
pub const ACCURACY: &str = "accuracy";
/// Metric name for tool-call correctness
pub const TOOL_CORRECTNESS: &str = "tool_correctness";
/// Metric name for latency against a target
pub const LATENCY: &str = "latency";
/// Metric name for cost against a budget
pub const COST_EFFICIENCY: &str = "cost_efficiency";

/// The expectation handed to a metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expected<'a> {
    /// Nothing to compare against
    None,
    /// Expected final output
    Output(&'a Value),
    /// Expected tool names in call order
    ToolCalls(&'a [String]),
}

impl<'a> Expected<'a> {
    /// Resolve the expectation a metric receives from a scenario, by metric name.
    ///
    /// `accuracy` gets the expected output, `tool_correctness` the expected
    /// tool sequence, and every other metric gets nothing.
    pub fn resolve(metric_name: &str, scenario: &'a Scenario) -> Self {
        match metric_name {
            ACCURACY => scenario
                .expected_output
                .as_ref()
                .map_or(Expected::None, Expected::Output),
            TOOL_CORRECTNESS => Expected::ToolCalls(&scenario.expected_tool_calls),
            _ => Expected::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Expected::None)
    }
}

/// A polymorphic scoring unit
pub trait Metric: Send + Sync {
    /// Stable metric name, copied into produced scores
    fn name(&self) -> &str;

    /// Weight copied into produced scores
    fn weight(&self) -> f64;

    /// Score one outcome against its expectation
    fn score(&self, outcome: &ScenarioOutcome, expected: Expected<'_>) -> BifrostResult<EvalScore>;
}

/// Build a score carrying the metric's name and weight
pub(crate) fn metric_score(
    metric: &dyn Metric,
    value: f64,
    details: impl Into<String>,
) -> BifrostResult<EvalScore> {
    Ok(EvalScore::new(metric.name(), value)?
        .with_weight(metric.weight())?
        .with_details(details))
}

pub(crate) fn check_weight(metric: &str, weight: f64) -> BifrostResult<f64> {
    if weight.is_nan() || weight < 0.0 {
        return Err(BifrostError::InvalidWeight {
            name: metric.to_string(),
            weight,
        });
    }
    Ok(weight)
}

/// Ratio score shared by latency and cost: vacuous pass without data,
/// otherwise `min(1, limit / actual)`
pub(crate) fn ratio_score(limit: f64, actual: f64) -> Option<f64> {
    if actual <= 0.0 {
        return None;
    }
    Some((limit / actual).min(1.0))
}

/// The four built-in metrics with default settings
pub fn default_metrics() -> Vec<Arc<dyn Metric>> {
    vec![
        Arc::new(AccuracyMetric::new()),
        Arc::new(ToolCorrectnessMetric::new()),
        Arc::new(LatencyMetric::new(DEFAULT_LATENCY_TARGET_MS)),
        Arc::new(CostEfficiencyMetric::new(DEFAULT_COST_BUDGET_USD)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_expected_by_metric_name() {
        let scenario = Scenario::new("s")
            .with_expected_output(json!({ "answer": 4 }))
            .with_expected_tools(["calculator"]);

        assert_eq!(
            Expected::resolve(ACCURACY, &scenario),
            Expected::Output(&json!({ "answer": 4 }))
        );
        assert_eq!(
            Expected::resolve(TOOL_CORRECTNESS, &scenario),
            Expected::ToolCalls(&["calculator".to_string()])
        );
        assert!(Expected::resolve(LATENCY, &scenario).is_none());
        assert!(Expected::resolve("custom", &scenario).is_none());
    }

    #[test]
    fn test_missing_expected_output_resolves_to_none() {
        let scenario = Scenario::new("s");
        assert!(Expected::resolve(ACCURACY, &scenario).is_none());
    }

    #[test]
    fn test_default_metric_names() {
        let names: Vec<String> = default_metrics()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec![ACCURACY, TOOL_CORRECTNESS, LATENCY, COST_EFFICIENCY]);
    }

    #[test]
    fn test_ratio_score() {
        assert_eq!(ratio_score(100.0, 0.0), None);
        assert_eq!(ratio_score(100.0, 50.0), Some(1.0));
        assert_eq!(ratio_score(100.0, 100.0), Some(1.0));
        assert_eq!(ratio_score(100.0, 200.0), Some(0.5));
    }
}
