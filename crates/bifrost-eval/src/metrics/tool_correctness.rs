//! Tool-call correctness metric

use std::collections::HashSet;

use super::{Expected, Metric, TOOL_CORRECTNESS, check_weight, metric_score};
use crate::error::{BifrostError, BifrostResult};
use crate::model::{EvalScore, ScenarioOutcome};

const PRESENCE_WEIGHT: f64 = 0.5;
const ORDER_WEIGHT: f64 = 0.3;
const EXTRA_PENALTY_WEIGHT: f64 = 0.2;

/// Scores the called tool names against the expected sequence.
///
/// Combines presence of expected tools, (optionally strict) call order, and a
/// penalty for unexpected tools:
/// `(presence * 0.5 + order * 0.3) * (1 - extra_penalty * 0.2)`.
#[derive(Debug, Clone)]
pub struct ToolCorrectnessMetric {
    weight: f64,
    strict_order: bool,
}

impl ToolCorrectnessMetric {
    pub fn new() -> Self {
        Self {
            weight: 1.0,
            strict_order: false,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> BifrostResult<Self> {
        self.weight = check_weight(TOOL_CORRECTNESS, weight)?;
        Ok(self)
    }

    /// Score call order by longest common subsequence instead of ignoring it
    pub fn with_strict_order(mut self, strict_order: bool) -> Self {
        self.strict_order = strict_order;
        self
    }

    pub fn strict_order(&self) -> bool {
        self.strict_order
    }
}

impl Default for ToolCorrectnessMetric {
    fn default() -> Self {
        Self::new()
    }
}

impl Metric for ToolCorrectnessMetric {
    fn name(&self) -> &str {
        TOOL_CORRECTNESS
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, outcome: &ScenarioOutcome, expected: Expected<'_>) -> BifrostResult<EvalScore> {
        let expected = match expected {
            Expected::None => &[][..],
            Expected::ToolCalls(tools) => tools,
            Expected::Output(_) => {
                return Err(BifrostError::metric(
                    TOOL_CORRECTNESS,
                    "expected a tool call sequence, got an output",
                ));
            }
        };
        if expected.is_empty() {
            return metric_score(self, 1.0, "No expected tool calls; skipped");
        }

        let actual = outcome.tool_call_names();
        let expected_set: HashSet<&str> = expected.iter().map(String::as_str).collect();
        let actual_set: HashSet<&str> = actual.iter().copied().collect();

        let presence =
            expected_set.intersection(&actual_set).count() as f64 / expected_set.len() as f64;
        let order = if self.strict_order {
            lcs_ratio(expected, &actual)
        } else {
            1.0
        };
        let extras = actual_set.difference(&expected_set).count();
        let extra_penalty = extras as f64 / actual.len().max(1) as f64;

        let value = ((presence * PRESENCE_WEIGHT + order * ORDER_WEIGHT)
            * (1.0 - extra_penalty * EXTRA_PENALTY_WEIGHT))
            .clamp(0.0, 1.0);

        metric_score(
            self,
            value,
            format!(
                "Presence: {:.2}, Order: {:.2}, Extras: {}, Expected: {:?}, Actual: {:?}",
                presence, order, extras, expected, actual
            ),
        )
    }
}

/// Longest common subsequence of two name sequences, divided by the
/// expected length. Exact, case-sensitive token match; 0.0 when either side
/// is empty.
pub fn lcs_ratio<E, A>(expected: &[E], actual: &[A]) -> f64
where
    E: AsRef<str>,
    A: AsRef<str>,
{
    if expected.is_empty() || actual.is_empty() {
        return 0.0;
    }

    let cols = actual.len() + 1;
    let mut table = vec![0usize; (expected.len() + 1) * cols];
    for (i, e) in expected.iter().enumerate() {
        for (j, a) in actual.iter().enumerate() {
            table[(i + 1) * cols + j + 1] = if e.as_ref() == a.as_ref() {
                table[i * cols + j] + 1
            } else {
                table[i * cols + j + 1].max(table[(i + 1) * cols + j])
            };
        }
    }

    table[expected.len() * cols + actual.len()] as f64 / expected.len() as f64
}
