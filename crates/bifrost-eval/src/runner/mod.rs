//! Evaluation runner components
//!
//! This module provides the execution infrastructure: the executor
//! capability, the single-scenario harness, and the suite runner.

mod aggregator;
mod config;
mod executor;
mod harness;
mod suite_runner;

pub use aggregator::{aggregate_costs, aggregate_latencies, percentile};
pub use config::{ENV_PREFIX, EvalConfig, GradingConfig, MetricsConfig};
#[cfg(test)]
pub use executor::MockPipelineExecutor;
pub use executor::{FnExecutor, PipelineExecutor};
pub use harness::{CANCELLED_ERROR, ScenarioHarness};
pub use suite_runner::{EvalProgress, EvalRunner, ProgressCallback, save_result};
