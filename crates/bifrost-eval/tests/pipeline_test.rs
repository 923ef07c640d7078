//! End-to-end tests for running, grading, comparing and replaying suites

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bifrost_eval::compare::RegressionType;
use bifrost_eval::metrics::{ACCURACY, TOOL_CORRECTNESS, default_metrics};
use bifrost_eval::runner::{CANCELLED_ERROR, EvalProgress};
use bifrost_eval::{
    ComparisonRunner, CostBreakdown, EvalRunner, EvalSuite, ExecutionTrace, GradeLevel,
    LatencyBreakdown, PipelineExecutor, RegressionDetector, ReportFormat, Scenario,
    ScenarioStatus, Scorer, TraceRecorder, TraceReplayer, WeightedGrader, generate_report,
};
use common::{ScriptedExecutor, numbered_suite};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn mixed_suite() -> EvalSuite {
    EvalSuite::new("mixed")
        .with_scenario(
            Scenario::new("capital")
                .with_expected_output("Paris")
                .with_expected_tools(["search", "answer"]),
        )
        .with_scenario(Scenario::new("arithmetic").with_expected_output(4))
        .with_scenario(Scenario::new("slow").with_timeout_ms(500.0))
        .with_scenario(Scenario::new("broken"))
        .with_scenario(Scenario::new("explodes"))
}

fn mixed_executor() -> ScriptedExecutor {
    ScriptedExecutor::new()
        .respond(
            "arithmetic",
            ExecutionTrace::new(5)
                .with_latency(LatencyBreakdown::with_total(100.0))
                .with_cost(CostBreakdown::with_total(0.01)),
        )
        .respond_after("slow", Duration::from_secs(5), ExecutionTrace::new("late"))
        .fail("broken", "upstream returned 503")
        .panic_on("explodes")
}

/// Runner whose grader fails anything that is not exactly right
fn strict_runner() -> EvalRunner {
    EvalRunner::new(
        default_metrics(),
        Scorer::new(Arc::new(WeightedGrader::new().require(ACCURACY, 1.0))),
    )
}

#[tokio::test(start_paused = true)]
async fn test_mixed_suite_end_to_end() {
    let executor = Arc::new(mixed_executor());
    let result = EvalRunner::default()
        .with_max_concurrency(3)
        .run(&mixed_suite(), executor.clone())
        .await
        .unwrap();

    let names: Vec<_> = result.outcomes.iter().map(|o| o.scenario_name.as_str()).collect();
    assert_eq!(names, vec!["capital", "arithmetic", "slow", "broken", "explodes"]);
    assert_eq!(executor.calls(), 5);

    let capital = result.outcome("capital").unwrap();
    assert_eq!(capital.status, ScenarioStatus::Completed);
    assert_eq!(capital.grade, GradeLevel::Excellent);
    assert_eq!(capital.score(TOOL_CORRECTNESS).unwrap().value(), 1.0);
    assert!(capital.passed);

    let arithmetic = result.outcome("arithmetic").unwrap();
    assert_eq!(arithmetic.score(ACCURACY).unwrap().value(), 0.0);
    assert!((arithmetic.weighted_score() - 0.75).abs() < 1e-9);
    assert_eq!(arithmetic.grade, GradeLevel::Good);

    let slow = result.outcome("slow").unwrap();
    assert_eq!(slow.status, ScenarioStatus::TimedOut);
    assert!(slow.scores.is_empty());
    assert!(slow.error.as_deref().unwrap().starts_with("Timeout after"));
    assert!(slow.latency.total_ms >= 500.0);

    let broken = result.outcome("broken").unwrap();
    assert_eq!(broken.status, ScenarioStatus::Errored);
    assert_eq!(broken.error.as_deref(), Some("upstream returned 503"));

    let explodes = result.outcome("explodes").unwrap();
    assert_eq!(explodes.status, ScenarioStatus::Errored);
    assert!(!explodes.passed);
    assert!(explodes.error.as_deref().unwrap().contains("executor exploded"));

    assert_eq!(result.passed_count(), 2);
    assert!((result.total_cost.total_usd - 0.02).abs() < 1e-9);
    let latency = &result.total_latency;
    assert!(latency.p50_ms <= latency.p95_ms && latency.p95_ms <= latency.p99_ms);
    assert!(latency.p99_ms <= 1000.0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_bounded_and_order_preserved() {
    let executor = Arc::new(ScriptedExecutor::new().with_default_delay(Duration::from_millis(50)));
    let result = EvalRunner::default()
        .with_max_concurrency(3)
        .run(&numbered_suite(8), executor.clone())
        .await
        .unwrap();

    assert!(executor.max_in_flight() <= 3);
    assert!(executor.max_in_flight() > 1);
    let names: Vec<_> = result.outcomes.iter().map(|o| o.scenario_name.clone()).collect();
    let expected: Vec<_> = (0..8).map(|i| format!("s{}", i)).collect();
    assert_eq!(names, expected);
    assert_eq!(result.pass_rate(), 1.0);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_runs_one_at_a_time() {
    let executor = Arc::new(ScriptedExecutor::new());
    let result = EvalRunner::default()
        .run(&numbered_suite(4), executor.clone())
        .await
        .unwrap();

    assert_eq!(executor.max_in_flight(), 1);
    assert_eq!(executor.seen(), vec!["s0", "s1", "s2", "s3"]);
    assert_eq!(result.total_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_record_then_replay_reproduces_scores() {
    let recorder = Arc::new(TraceRecorder::new(mixed_executor()));
    let live = EvalRunner::default()
        .run(&mixed_suite(), recorder.clone())
        .await
        .unwrap();

    let library = recorder.snapshot();
    let recorded: Vec<_> = library.scenario_names().collect();
    assert_eq!(recorded, vec!["arithmetic", "capital"]);

    let replayed = EvalRunner::default()
        .run(&mixed_suite(), Arc::new(TraceReplayer::new(library)))
        .await
        .unwrap();

    for name in ["capital", "arithmetic"] {
        assert_eq!(
            live.outcome(name).unwrap().scores,
            replayed.outcome(name).unwrap().scores
        );
    }
    // Neither produced a trace live, so neither was recorded
    for name in ["slow", "broken"] {
        let outcome = replayed.outcome(name).unwrap();
        assert_eq!(outcome.status, ScenarioStatus::Errored);
        assert_eq!(
            outcome.error.clone().unwrap(),
            format!("no recorded trace for scenario '{}'", name)
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_compare_and_detect_regressions() {
    let suite = numbered_suite(4);
    let baseline: Arc<dyn PipelineExecutor> = Arc::new(ScriptedExecutor::new());
    let degraded: Arc<dyn PipelineExecutor> = Arc::new(
        ScriptedExecutor::new()
            .respond("s1", ExecutionTrace::new(json!("wrong")))
            .respond("s3", ExecutionTrace::new(json!("wrong"))),
    );

    let comparison = ComparisonRunner::new(strict_runner())
        .with_parallel(true)
        .compare(
            &suite,
            vec![
                ("degraded".to_string(), degraded),
                ("baseline".to_string(), baseline),
            ],
        )
        .await
        .unwrap();

    assert_eq!(comparison.winner, "baseline");
    assert_eq!(comparison.names(), vec!["degraded", "baseline"]);
    assert_eq!(comparison.summary_for("degraded").unwrap().pass_rate, 0.5);

    let regressions = RegressionDetector::with_defaults().detect(
        comparison.result("baseline").unwrap(),
        comparison.result("degraded").unwrap(),
    );
    let types: Vec<_> = regressions.iter().map(|r| r.regression_type).collect();
    assert!(types.contains(&RegressionType::PassRateDecrease));
    assert!(types.contains(&RegressionType::ScoreDecrease));
    assert_eq!(
        types
            .iter()
            .filter(|t| **t == RegressionType::ScenarioRegression)
            .count(),
        2
    );
    assert!(RegressionDetector::summarize(&regressions).starts_with("Found"));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_finishes_run_with_cancelled_outcomes() {
    let token = CancellationToken::new();
    let progress = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&progress);

    let runner = EvalRunner::default()
        .with_max_concurrency(2)
        .with_cancellation(token.clone())
        .with_progress_callback(Arc::new(move |_p: EvalProgress| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    let executor = Arc::new(ScriptedExecutor::new().with_default_delay(Duration::from_secs(10)));

    let cancel = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
    });
    let result = runner.run(&numbered_suite(5), executor).await.unwrap();
    cancel.await.unwrap();

    assert_eq!(result.total_count(), 5);
    assert_eq!(progress.load(Ordering::SeqCst), 5);
    for outcome in &result.outcomes {
        assert_eq!(outcome.status, ScenarioStatus::Errored);
        assert_eq!(outcome.error.as_deref(), Some(CANCELLED_ERROR));
    }
}

#[tokio::test(start_paused = true)]
async fn test_reports_render_real_run() {
    let result = EvalRunner::default()
        .run(&mixed_suite(), Arc::new(mixed_executor()))
        .await
        .unwrap();

    let markdown = generate_report(&result, ReportFormat::Markdown).unwrap();
    assert!(markdown.contains("# Evaluation Report: mixed"));
    assert!(markdown.contains("### broken"));
    assert!(markdown.contains("upstream returned 503"));

    let table = generate_report(&result, ReportFormat::Table).unwrap();
    assert!(table.contains("TIMEOUT"));

    let json = generate_report(&result, ReportFormat::Json).unwrap();
    let reloaded: bifrost_eval::EvalResult = serde_json::from_str(&json).unwrap();
    assert_eq!(reloaded.outcomes.len(), 5);
}
