//! Bifrost Pipeline Evaluation
//!
//! This crate runs suites of test scenarios against a pluggable pipeline
//! executor, scores each outcome along several weighted dimensions, grades
//! it, and aggregates results so alternative pipeline configurations can be
//! compared on the same suite.
//!
//! # Features
//!
//! - **Scenario Suites**: Scenarios with inputs, expected outputs, expected
//!   tool sequences, tags and per-scenario timeouts, loaded from YAML or JSON
//! - **Metrics**: Accuracy, tool correctness (LCS ordering), latency and
//!   cost efficiency, each producing a weighted score in [0, 1]
//! - **Grading**: Threshold and weighted grading strategies
//! - **Runner**: Bounded concurrency, timeouts, cancellation and progress
//!   with declaration-order results and latency percentiles
//! - **Comparison**: Multi-configuration ranking and regression detection
//! - **Replay**: Record live traces and replay them as an executor
//! - **Report Generation**: JSON, Markdown and terminal table output
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bifrost_eval::{EvalRunner, ExecutionTrace, FnExecutor, SuiteLoader};
//!
//! let suite = SuiteLoader::new().load_file("suites/qa.yaml")?;
//! let executor = Arc::new(FnExecutor::new(|scenario| async move {
//!     Ok(ExecutionTrace::new(call_my_pipeline(&scenario).await?))
//! }));
//! let result = EvalRunner::default().run(&suite, executor).await?;
//! println!("pass rate: {:.1}%", result.pass_rate() * 100.0);
//! ```

pub mod compare;
pub mod error;
pub mod metrics;
pub mod model;
pub mod replay;
pub mod report;
pub mod runner;
pub mod scoring;
pub mod suite;

// Re-exports for convenience
pub use compare::{ComparisonResult, ComparisonRunner, RegressionDetector};
pub use error::{BifrostError, BifrostResult};
pub use metrics::{
    AccuracyMetric, CostEfficiencyMetric, LatencyMetric, Metric, ToolCorrectnessMetric,
};
pub use model::{
    CostBreakdown, EvalResult, EvalScore, ExecutionTrace, GradeLevel, GradeThresholds,
    LatencyBreakdown, ScenarioOutcome, ScenarioStatus, ToolCallRecord,
};
pub use replay::{TraceLibrary, TraceRecorder, TraceReplayer};
pub use report::{ReportFormat, generate_comparison_report, generate_report};
pub use runner::{EvalConfig, EvalRunner, FnExecutor, PipelineExecutor};
pub use scoring::{GradingStrategy, Scorer, ThresholdGrader, WeightedGrader};
pub use suite::{EvalSuite, Scenario, SuiteLoader};
