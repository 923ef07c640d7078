//! Output accuracy metric

use std::sync::Arc;

use serde_json::Value;

use super::{ACCURACY, Expected, Metric, check_weight, metric_score};
use crate::error::{BifrostError, BifrostResult};
use crate::model::{EvalScore, ScenarioOutcome};

/// Equality check between an actual and an expected output
pub type OutputComparator = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Binary match of the actual output against the expected output.
///
/// Uses structural equality unless a comparator is supplied.
#[derive(Clone)]
pub struct AccuracyMetric {
    weight: f64,
    comparator: Option<OutputComparator>,
}

impl AccuracyMetric {
    pub fn new() -> Self {
        Self {
            weight: 1.0,
            comparator: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> BifrostResult<Self> {
        self.weight = check_weight(ACCURACY, weight)?;
        Ok(self)
    }

    /// Replace structural equality with a custom comparison
    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    fn matches(&self, actual: &Value, expected: &Value) -> bool {
        match &self.comparator {
            Some(compare) => compare(actual, expected),
            None => actual == expected,
        }
    }
}

impl Default for AccuracyMetric {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AccuracyMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccuracyMetric")
            .field("weight", &self.weight)
            .field("custom_comparator", &self.comparator.is_some())
            .finish()
    }
}

impl Metric for AccuracyMetric {
    fn name(&self) -> &str {
        ACCURACY
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, outcome: &ScenarioOutcome, expected: Expected<'_>) -> BifrostResult<EvalScore> {
        match expected {
            Expected::None => metric_score(self, 1.0, "No expected output; skipped"),
            Expected::Output(expected) => {
                let matched = self.matches(&outcome.actual_output, expected);
                metric_score(
                    self,
                    if matched { 1.0 } else { 0.0 },
                    format!("Match: {}", matched),
                )
            }
            Expected::ToolCalls(_) => Err(BifrostError::metric(
                ACCURACY,
                "expected an output, got a tool call sequence",
            )),
        }
    }
}
