//! Suite runner
//!
//! Runs every scenario of a suite against one executor, sequentially or with
//! bounded parallelism, and rolls the outcomes up into an [`EvalResult`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::aggregator::{aggregate_costs, aggregate_latencies};
use super::{EvalConfig, PipelineExecutor, ScenarioHarness};
use crate::error::BifrostResult;
use crate::metrics::{Metric, default_metrics};
use crate::model::{EvalResult, ScenarioOutcome, ScenarioStatus};
use crate::scoring::Scorer;
use crate::suite::EvalSuite;

/// Callback for progress updates during evaluation
pub type ProgressCallback = Arc<dyn Fn(EvalProgress) + Send + Sync>;

/// Progress update, emitted after each scenario finishes
#[derive(Debug, Clone)]
pub struct EvalProgress {
    /// Scenarios finished so far, including this one
    pub current: usize,
    /// Total number of scenarios
    pub total: usize,
    /// Scenario that just finished
    pub scenario: String,
    /// Its terminal status
    pub status: ScenarioStatus,
    /// Status message
    pub message: String,
}

/// Runs suites against an executor
#[derive(Clone)]
pub struct EvalRunner {
    harness: Arc<ScenarioHarness>,
    max_concurrency: usize,
    tags: Vec<String>,
    output_dir: Option<PathBuf>,
    cancellation: CancellationToken,
    progress_callback: Option<ProgressCallback>,
    metadata: HashMap<String, Value>,
}

impl EvalRunner {
    /// Create a sequential runner
    pub fn new(metrics: Vec<Arc<dyn Metric>>, scorer: Scorer) -> Self {
        Self {
            harness: Arc::new(ScenarioHarness::new(metrics, scorer)),
            max_concurrency: 1,
            tags: Vec::new(),
            output_dir: None,
            cancellation: CancellationToken::new(),
            progress_callback: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a runner from a validated configuration
    pub fn from_config(config: &EvalConfig) -> BifrostResult<Self> {
        let mut runner = Self::new(config.build_metrics()?, config.build_scorer()?)
            .with_max_concurrency(config.max_concurrency)
            .with_tags(config.tags.clone());
        if config.save_results {
            runner.output_dir = Some(
                config
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(".")),
            );
        }
        Ok(runner)
    }

    /// Values of 1 or less run scenarios one at a time
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Only run scenarios carrying one of these tags (empty = all)
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Write every result as JSON into `dir`
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Tie the run to an external token. Cancelling it finishes pending and
    /// in-flight scenarios as errored.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Set progress callback
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Stamp every result from this runner with `key`
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn harness(&self) -> &ScenarioHarness {
        &self.harness
    }

    /// Run a suite.
    ///
    /// Fails only if the suite is malformed; every scenario produces an
    /// outcome, in declaration order.
    pub async fn run(
        &self,
        suite: &EvalSuite,
        executor: Arc<dyn PipelineExecutor>,
    ) -> BifrostResult<EvalResult> {
        suite.validate()?;
        let suite = suite.filter_by_tags(&self.tags);

        tracing::info!(
            suite = %suite.name,
            scenarios = suite.len(),
            max_concurrency = self.max_concurrency,
            "Starting evaluation"
        );

        let outcomes = if self.max_concurrency <= 1 {
            self.run_sequential(&suite, executor.as_ref()).await
        } else {
            self.run_parallel(&suite, executor).await
        };

        let total_cost = aggregate_costs(&outcomes);
        let total_latency = aggregate_latencies(&outcomes);
        let mut result = EvalResult::new(&suite.name, outcomes, total_cost, total_latency);
        result.metadata.extend(self.metadata.clone());

        tracing::info!(
            suite = %result.suite_name,
            passed = result.passed_count(),
            total = result.total_count(),
            pass_rate = result.pass_rate(),
            mean_score = result.mean_score(),
            "Evaluation finished"
        );

        if let Some(dir) = &self.output_dir {
            if let Err(e) = save_result(&result, dir).await {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to save evaluation result");
            }
        }

        Ok(result)
    }

    async fn run_sequential(
        &self,
        suite: &EvalSuite,
        executor: &dyn PipelineExecutor,
    ) -> Vec<ScenarioOutcome> {
        let total = suite.len();
        let mut outcomes = Vec::with_capacity(total);

        for scenario in &suite.scenarios {
            let cancel = self.cancellation.child_token();
            let outcome = self.harness.run_isolated(executor, scenario, &cancel).await;
            outcomes.push(outcome);
            self.emit_progress(outcomes.len(), total, &outcomes[outcomes.len() - 1]);
        }

        outcomes
    }

    async fn run_parallel(
        &self,
        suite: &EvalSuite,
        executor: Arc<dyn PipelineExecutor>,
    ) -> Vec<ScenarioOutcome> {
        let total = suite.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for (index, scenario) in suite.scenarios.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let harness = Arc::clone(&self.harness);
            let executor = Arc::clone(&executor);
            let cancel = self.cancellation.child_token();

            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        harness
                            .run_isolated(executor.as_ref(), &scenario, &cancel)
                            .await
                    }
                    Err(_) => ScenarioOutcome::errored(&scenario.name, "Scenario pool closed", 0.0),
                };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<ScenarioOutcome>> = vec![None; total];
        let mut finished = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    finished += 1;
                    self.emit_progress(finished, total, &outcome);
                    slots[index] = Some(outcome);
                }
                Err(e) => {
                    tracing::warn!(suite = %suite.name, error = %e, "Scenario task failed to join");
                }
            }
        }

        slots
            .into_iter()
            .zip(&suite.scenarios)
            .map(|(slot, scenario)| {
                slot.unwrap_or_else(|| {
                    ScenarioOutcome::errored(&scenario.name, "Scenario task aborted", 0.0)
                })
            })
            .collect()
    }

    fn emit_progress(&self, current: usize, total: usize, outcome: &ScenarioOutcome) {
        if let Some(callback) = &self.progress_callback {
            callback(EvalProgress {
                current,
                total,
                scenario: outcome.scenario_name.clone(),
                status: outcome.status,
                message: format!(
                    "{} {} ({})",
                    outcome.scenario_name,
                    if outcome.passed { "passed" } else { "failed" },
                    outcome.grade
                ),
            });
        }
    }
}

impl Default for EvalRunner {
    fn default() -> Self {
        Self::new(default_metrics(), Scorer::default())
    }
}

/// Save an evaluation result as `eval_result_<timestamp>_<run id>.json`
/// under `dir`
pub async fn save_result(result: &EvalResult, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let timestamp = result.run_at.format("%Y%m%d_%H%M%S");
    let output_path = dir.join(format!(
        "eval_result_{}_{}.json",
        timestamp,
        result.run_id.simple()
    ));

    let json = serde_json::to_string_pretty(result)?;
    tokio::fs::write(&output_path, json).await?;

    tracing::info!("Saved evaluation result to {:?}", output_path);
    Ok(output_path)
}
