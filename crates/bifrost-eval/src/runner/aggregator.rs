//! Suite-level cost and latency aggregation

use crate::model::{CostBreakdown, LatencyBreakdown, ScenarioOutcome};

/// Field-wise sum of every outcome's cost
pub fn aggregate_costs(outcomes: &[ScenarioOutcome]) -> CostBreakdown {
    outcomes
        .iter()
        .fold(CostBreakdown::default(), |mut total, outcome| {
            total.merge(&outcome.cost);
            total
        })
}

/// Summed latency plus p50/p95/p99 over per-outcome totals
pub fn aggregate_latencies(outcomes: &[ScenarioOutcome]) -> LatencyBreakdown {
    let mut total = LatencyBreakdown::default();
    for outcome in outcomes {
        total.merge(&outcome.latency);
    }

    let mut samples: Vec<f64> = outcomes.iter().map(|o| o.latency.total_ms).collect();
    samples.sort_by(f64::total_cmp);

    total.p50_ms = percentile(&samples, 50.0);
    total.p95_ms = percentile(&samples, 95.0);
    total.p99_ms = percentile(&samples, 99.0);
    total
}

/// Linear-interpolation percentile of an ascending slice; 0.0 when empty
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let rank = (sorted.len() - 1) as f64 * pct / 100.0;
    let lower = rank.floor() as usize;
    let upper = lower + 1;
    if upper >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[lower] + (rank - lower as f64) * (sorted[upper] - sorted[lower])
}
