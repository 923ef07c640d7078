//! Single-scenario harness
//!
//! Drives one scenario through PENDING → RUNNING → COMPLETED / TIMED_OUT /
//! ERRORED, then scores and grades completed outcomes.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::PipelineExecutor;
use crate::metrics::{Expected, Metric};
use crate::model::{EvalScore, ExecutionTrace, ScenarioOutcome, ScenarioStatus};
use crate::scoring::Scorer;
use crate::suite::Scenario;

/// Error recorded on scenarios interrupted by run-level cancellation
pub const CANCELLED_ERROR: &str = "Cancelled";

enum Execution {
    Completed(ExecutionTrace),
    Failed(anyhow::Error),
    TimedOut,
    Cancelled,
}

/// Runs single scenarios and scores their outcomes
pub struct ScenarioHarness {
    metrics: Vec<Arc<dyn Metric>>,
    scorer: Scorer,
}

impl ScenarioHarness {
    pub fn new(metrics: Vec<Arc<dyn Metric>>, scorer: Scorer) -> Self {
        Self { metrics, scorer }
    }

    pub fn metrics(&self) -> &[Arc<dyn Metric>] {
        &self.metrics
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Execute one scenario under its timeout and the cancellation token.
    ///
    /// Never fails: timeouts, executor errors and cancellation all become
    /// failing outcomes.
    pub async fn run<E>(
        &self,
        executor: &E,
        scenario: &Scenario,
        cancel: &CancellationToken,
    ) -> ScenarioOutcome
    where
        E: PipelineExecutor + ?Sized,
    {
        let started = Instant::now();
        tracing::debug!(
            scenario = %scenario.name,
            status = %ScenarioStatus::Running,
            timeout_ms = scenario.timeout_ms,
            "Scenario started"
        );

        let execution = tokio::select! {
            biased;
            _ = cancel.cancelled() => Execution::Cancelled,
            result = tokio::time::timeout(scenario.timeout(), executor.execute(scenario)) => {
                match result {
                    Ok(Ok(trace)) => Execution::Completed(trace),
                    Ok(Err(e)) => Execution::Failed(e),
                    Err(_) => Execution::TimedOut,
                }
            }
        };
        let elapsed_ms = elapsed_ms(started);

        let outcome = match execution {
            Execution::Completed(mut trace) => {
                if trace.latency.total_ms <= 0.0 {
                    trace.latency.total_ms = elapsed_ms;
                }
                let mut outcome = ScenarioOutcome::from_trace(&scenario.name, trace);
                self.score(scenario, &mut outcome);
                self.scorer.apply_grade(&mut outcome);
                outcome
            }
            Execution::Failed(e) => {
                tracing::warn!(
                    scenario = %scenario.name,
                    elapsed_ms,
                    error = %e,
                    "Executor failed"
                );
                ScenarioOutcome::errored(&scenario.name, e.to_string(), elapsed_ms)
            }
            Execution::TimedOut => {
                tracing::warn!(
                    scenario = %scenario.name,
                    elapsed_ms,
                    limit_ms = scenario.timeout_ms,
                    "Scenario timed out"
                );
                ScenarioOutcome::timed_out(&scenario.name, elapsed_ms, scenario.timeout_ms)
            }
            Execution::Cancelled => {
                tracing::warn!(scenario = %scenario.name, elapsed_ms, "Scenario cancelled");
                ScenarioOutcome::errored(&scenario.name, CANCELLED_ERROR, elapsed_ms)
            }
        };

        tracing::debug!(
            scenario = %scenario.name,
            status = %outcome.status,
            passed = outcome.passed,
            grade = %outcome.grade,
            elapsed_ms,
            "Scenario finished"
        );
        outcome
    }

    /// Like [`run`](Self::run), but a panic inside the executor or a metric
    /// becomes an errored outcome for this scenario only
    pub async fn run_isolated<E>(
        &self,
        executor: &E,
        scenario: &Scenario,
        cancel: &CancellationToken,
    ) -> ScenarioOutcome
    where
        E: PipelineExecutor + ?Sized,
    {
        let started = Instant::now();
        match AssertUnwindSafe(self.run(executor, scenario, cancel))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(scenario = %scenario.name, panic = %message, "Scenario panicked");
                ScenarioOutcome::errored(
                    &scenario.name,
                    format!("Scenario panicked: {}", message),
                    elapsed_ms(started),
                )
            }
        }
    }

    /// Append one score per configured metric, in configuration order
    fn score(&self, scenario: &Scenario, outcome: &mut ScenarioOutcome) {
        let mut scores = Vec::with_capacity(self.metrics.len());
        for metric in &self.metrics {
            let expected = Expected::resolve(metric.name(), scenario);
            match metric.score(outcome, expected) {
                Ok(score) => scores.push(score),
                Err(e) => {
                    tracing::warn!(
                        scenario = %scenario.name,
                        metric = metric.name(),
                        error = %e,
                        "Metric failed; recording zero score"
                    );
                    match failed_score(metric.as_ref(), &e.to_string()) {
                        Some(score) => scores.push(score),
                        None => tracing::warn!(
                            metric = metric.name(),
                            "Metric reports an invalid weight; dimension skipped"
                        ),
                    }
                }
            }
        }
        outcome.scores.extend(scores);
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_micros() as f64 / 1000.0
}

fn failed_score(metric: &dyn Metric, error: &str) -> Option<EvalScore> {
    EvalScore::new(metric.name(), 0.0)
        .and_then(|score| score.with_weight(metric.weight()))
        .map(|score| score.with_details(format!("Metric error: {}", error)))
        .ok()
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;

    use crate::error::{BifrostError, BifrostResult};
    use crate::metrics::{AccuracyMetric, LatencyMetric, ToolCorrectnessMetric};
    use crate::model::{GradeLevel, LatencyBreakdown};
    use crate::runner::{FnExecutor, MockPipelineExecutor};

    struct BrokenMetric;

    impl Metric for BrokenMetric {
        fn name(&self) -> &str {
            "broken"
        }

        fn weight(&self) -> f64 {
            2.0
        }

        fn score(&self, _: &ScenarioOutcome, _: Expected<'_>) -> BifrostResult<EvalScore> {
            Err(BifrostError::metric("broken", "no data"))
        }
    }

    fn harness(metrics: Vec<Arc<dyn Metric>>) -> ScenarioHarness {
        ScenarioHarness::new(metrics, Scorer::default())
    }

    #[tokio::test]
    async fn test_completed_outcome_is_scored_and_graded() {
        let mut executor = MockPipelineExecutor::new();
        executor.expect_execute().times(1).returning(|_| {
            Ok(ExecutionTrace::new(json!(4))
                .with_tools(["calculator"])
                .with_latency(LatencyBreakdown::with_total(10.0)))
        });

        let scenario = Scenario::new("calc")
            .with_expected_output(4)
            .with_expected_tools(["calculator"]);
        let harness = harness(vec![
            Arc::new(AccuracyMetric::new()),
            Arc::new(ToolCorrectnessMetric::new()),
        ]);
        let outcome = harness
            .run(&executor, &scenario, &CancellationToken::new())
            .await;

        assert_eq!(outcome.status, ScenarioStatus::Completed);
        let names: Vec<_> = outcome.scores.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["accuracy", "tool_correctness"]);
        assert_eq!(outcome.latency.total_ms, 10.0);
        assert!((outcome.weighted_score() - 0.9).abs() < 1e-9);
        assert!(outcome.grade.is_passing());
        assert!(outcome.passed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_produces_unscored_failure() {
        let executor = FnExecutor::new(|_s: Scenario| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, anyhow::Error>(ExecutionTrace::new("late"))
        });
        let scenario = Scenario::new("slow").with_timeout_ms(100.0);
        let outcome = harness(vec![Arc::new(AccuracyMetric::new())])
            .run(&executor, &scenario, &CancellationToken::new())
            .await;

        assert_eq!(outcome.status, ScenarioStatus::TimedOut);
        assert!(!outcome.passed);
        assert_eq!(outcome.grade, GradeLevel::Fail);
        assert!(outcome.scores.is_empty());
        let error = outcome.error.as_deref().unwrap();
        assert!(error.starts_with("Timeout after"));
        assert!(error.ends_with("(limit 100ms)"));
        assert!((outcome.latency.total_ms - 100.0).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_executor_error_is_preserved_verbatim() {
        let mut executor = MockPipelineExecutor::new();
        executor
            .expect_execute()
            .returning(|_| Err(anyhow::anyhow!("upstream returned 503")));

        let outcome = harness(vec![Arc::new(AccuracyMetric::new())])
            .run(&executor, &Scenario::new("s"), &CancellationToken::new())
            .await;
        assert_eq!(outcome.status, ScenarioStatus::Errored);
        assert_eq!(outcome.error.as_deref(), Some("upstream returned 503"));
        assert!(outcome.scores.is_empty());
        assert!(!outcome.passed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_backfill_only_when_missing() {
        let executor = FnExecutor::new(|s: Scenario| async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            let trace = ExecutionTrace::new("ok");
            if s.name == "reported" {
                Ok::<_, anyhow::Error>(trace.with_latency(LatencyBreakdown::with_total(7.0)))
            } else {
                Ok(trace)
            }
        });
        let harness = harness(vec![Arc::new(LatencyMetric::default())]);
        let cancel = CancellationToken::new();

        let measured = harness.run(&executor, &Scenario::new("measured"), &cancel).await;
        assert!((measured.latency.total_ms - 40.0).abs() < 1.0);

        let reported = harness.run(&executor, &Scenario::new("reported"), &cancel).await;
        assert_eq!(reported.latency.total_ms, 7.0);
    }

    #[tokio::test]
    async fn test_failing_metric_records_zero_score() {
        let mut executor = MockPipelineExecutor::new();
        executor
            .expect_execute()
            .returning(|_| Ok(ExecutionTrace::new(json!("x"))));

        let outcome = harness(vec![Arc::new(BrokenMetric), Arc::new(AccuracyMetric::new())])
            .run(&executor, &Scenario::new("s"), &CancellationToken::new())
            .await;

        assert_eq!(outcome.scores.len(), 2);
        let broken = outcome.score("broken").unwrap();
        assert_eq!(broken.value(), 0.0);
        assert_eq!(broken.weight(), 2.0);
        assert!(broken.details().contains("no data"));
        assert_eq!(outcome.score("accuracy").unwrap().value(), 1.0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mut executor = MockPipelineExecutor::new();
        executor
            .expect_execute()
            .returning(|_| Ok(ExecutionTrace::new("never scored")));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = harness(vec![])
            .run(&executor, &Scenario::new("s"), &cancel)
            .await;
        assert_eq!(outcome.status, ScenarioStatus::Errored);
        assert_eq!(outcome.error.as_deref(), Some(CANCELLED_ERROR));
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let executor = FnExecutor::new(|s: Scenario| async move {
            if s.name == "boom" {
                panic!("executor blew up");
            }
            Ok::<_, anyhow::Error>(ExecutionTrace::new("ok"))
        });
        let harness = harness(vec![]);
        let cancel = CancellationToken::new();

        let outcome = harness
            .run_isolated(&executor, &Scenario::new("boom"), &cancel)
            .await;
        assert_eq!(outcome.status, ScenarioStatus::Errored);
        assert!(outcome.error.unwrap().contains("executor blew up"));

        let fine = harness
            .run_isolated(&executor, &Scenario::new("fine"), &cancel)
            .await;
        assert_eq!(fine.status, ScenarioStatus::Completed);
    }
}
