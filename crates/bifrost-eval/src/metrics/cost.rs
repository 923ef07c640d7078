//! Cost efficiency metric

use super::{COST_EFFICIENCY, Expected, Metric, check_weight, metric_score, ratio_score};
use crate::error::{BifrostError, BifrostResult};
use crate::model::{EvalScore, ScenarioOutcome};

/// Default per-scenario budget in USD
pub const DEFAULT_COST_BUDGET_USD: f64 = 0.10;

/// `min(1, budget / actual)` over the outcome's total cost
#[derive(Debug, Clone)]
pub struct CostEfficiencyMetric {
    budget_usd: f64,
    weight: f64,
}

impl CostEfficiencyMetric {
    pub fn new(budget_usd: f64) -> Self {
        Self {
            budget_usd,
            weight: 1.0,
        }
    }

    /// Create with a budget that must be positive
    pub fn try_new(budget_usd: f64) -> BifrostResult<Self> {
        if budget_usd.is_nan() || budget_usd <= 0.0 {
            return Err(BifrostError::config(format!(
                "cost budget must be positive, got {}",
                budget_usd
            )));
        }
        Ok(Self::new(budget_usd))
    }

    pub fn with_weight(mut self, weight: f64) -> BifrostResult<Self> {
        self.weight = check_weight(COST_EFFICIENCY, weight)?;
        Ok(self)
    }

    pub fn budget_usd(&self) -> f64 {
        self.budget_usd
    }
}

impl Default for CostEfficiencyMetric {
    fn default() -> Self {
        Self::new(DEFAULT_COST_BUDGET_USD)
    }
}

impl Metric for CostEfficiencyMetric {
    fn name(&self) -> &str {
        COST_EFFICIENCY
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn score(&self, outcome: &ScenarioOutcome, _expected: Expected<'_>) -> BifrostResult<EvalScore> {
        let actual = outcome.cost.total_usd;
        match ratio_score(self.budget_usd, actual) {
            None => metric_score(self, 1.0, "No cost data; skipped"),
            Some(value) => metric_score(
                self,
                value,
                format!("Cost: ${:.4}, Budget: ${:.4}", actual, self.budget_usd),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CostBreakdown, ExecutionTrace};

    fn outcome(total_usd: f64) -> ScenarioOutcome {
        ScenarioOutcome::from_trace(
            "s",
            ExecutionTrace::new("ok").with_cost(CostBreakdown::with_total(total_usd)),
        )
    }

    #[test]
    fn test_budget_ratio() {
        let metric = CostEfficiencyMetric::new(0.10);
        let at_budget = metric.score(&outcome(0.10), Expected::None).unwrap();
        assert_eq!(at_budget.value(), 1.0);

        let double = metric.score(&outcome(0.20), Expected::None).unwrap();
        assert!((double.value() - 0.5).abs() < 1e-12);
        assert_eq!(double.details(), "Cost: $0.2000, Budget: $0.1000");
    }

    #[test]
    fn test_free_run_is_vacuous_pass() {
        let score = CostEfficiencyMetric::default()
            .score(&outcome(0.0), Expected::None)
            .unwrap();
        assert_eq!(score.value(), 1.0);
    }

    #[test]
    fn test_budget_must_be_positive() {
        assert!(CostEfficiencyMetric::try_new(0.0).is_err());
        assert!(CostEfficiencyMetric::try_new(0.01).is_ok());
    }
}
