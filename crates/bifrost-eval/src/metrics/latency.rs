//! Latency metric

use super::{Expected, LATENCY, Metric, check_weight, metric_score, ratio_score};
use crate::error::{BifrostError, BifrostResult};
use crate::model::{EvalScore, ScenarioOutcome};

/// Default latency target in milliseconds
pub const DEFAULT_LATENCY_TARGET_MS: f64 = 5_000.0;

/// `min(1, target / actual)` over the outcome's total latency
#[derive(Debug, Clone)]
pub struct LatencyMetric {
    target_ms: f64,
    weight: f64,
}

impl LatencyMetric {
    pub fn new(target_ms: f64) -> Self {
        Self {
            target_ms,
            weight: 1.0,
        }
    }

    /// Create with a target that must be positive
    pub fn try_new(target_ms: f64) -> BifrostResult<Self> {
        if target_ms.is_nan() || target_ms <= 0.0 {
            return Err(BifrostError::config(format!(
                "latency target must be positive, got {}",
                target_ms
            )));
        }
        Ok(Self::new(target_ms))
    }

    pub fn with_weight(mut self, weight: f64) -> BifrostResult<Self> {
        self.weight = check_weight(LATENCY, weight)?;
        Ok(self)
    }

    pub fn target_ms(&self) -> f64 {
        self.target_ms
    }
}

impl Default for LatencyMetric {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_TARGET_MS)
    }
}

impl Metric for LatencyMetric {
    fn name(&self) -> &str {
        LATENCY
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, outcome: &ScenarioOutcome, _expected: Expected<'_>) -> BifrostResult<EvalScore> {
        let actual = outcome.latency.total_ms;
        match ratio_score(self.target_ms, actual) {
            None => metric_score(self, 1.0, "No latency data; skipped"),
            Some(value) => metric_score(
                self,
                value,
                format!("Latency: {:.0}ms, Target: {:.0}ms", actual, self.target_ms),
            ),
        }
    }
}
