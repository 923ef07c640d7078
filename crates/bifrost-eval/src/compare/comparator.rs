//! Multi-configuration comparison
//!
//! Runs the same suite against several named executors with identical
//! metrics and grading, then ranks them by mean score.

use std::sync::Arc;

use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::BifrostResult;
use crate::model::{EvalResult, GradeLevel};
use crate::runner::{EvalConfig, EvalRunner, PipelineExecutor};
use crate::suite::EvalSuite;

/// Metadata key naming the configuration a result was produced under
pub const CONFIGURATION_KEY: &str = "configuration";

/// Snapshot of one configuration's headline numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub mean_score: f64,
    pub pass_rate: f64,
    pub total_cost_usd: f64,
    pub total_latency_ms: f64,
    pub grade: GradeLevel,
}

impl ConfigSummary {
    fn of(result: &EvalResult) -> Self {
        Self {
            mean_score: result.mean_score(),
            pass_rate: result.pass_rate(),
            total_cost_usd: result.total_cost.total_usd,
            total_latency_ms: result.total_latency.total_ms,
            grade: result.grade(),
        }
    }
}

/// Outcome of comparing several configurations over one suite.
///
/// `results` and `summary` are keyed by configuration name, in the order
/// configurations were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub suite_name: String,
    pub results: IndexMap<String, EvalResult>,
    /// Highest mean score; empty when nothing was compared
    pub winner: String,
    pub summary: IndexMap<String, ConfigSummary>,
}

impl ComparisonResult {
    /// Build from per-configuration results, ranking them.
    ///
    /// A repeated name replaces the earlier entry in place. Ties on mean
    /// score go to the configuration seen first.
    pub fn from_results(
        suite_name: impl Into<String>,
        results: impl IntoIterator<Item = (String, EvalResult)>,
    ) -> Self {
        let mut entries: IndexMap<String, EvalResult> = IndexMap::new();
        for (name, result) in results {
            entries.insert(name, result);
        }

        let mut winner: Option<(&str, f64)> = None;
        for (name, result) in &entries {
            let score = result.mean_score();
            if winner.is_none_or(|(_, best)| score > best) {
                winner = Some((name.as_str(), score));
            }
        }
        let winner = winner.map(|(name, _)| name.to_string()).unwrap_or_default();

        let summary = entries
            .iter()
            .map(|(name, result)| (name.clone(), ConfigSummary::of(result)))
            .collect();

        Self {
            suite_name: suite_name.into(),
            results: entries,
            winner,
            summary,
        }
    }

    /// Configuration names in order
    pub fn names(&self) -> Vec<&str> {
        self.results.keys().map(String::as_str).collect()
    }

    pub fn result(&self, name: &str) -> Option<&EvalResult> {
        self.results.get(name)
    }

    pub fn summary_for(&self, name: &str) -> Option<&ConfigSummary> {
        self.summary.get(name)
    }

    pub fn winner_result(&self) -> Option<&EvalResult> {
        self.result(&self.winner)
    }
}

/// Runs one suite against several named executors
#[derive(Clone)]
pub struct ComparisonRunner {
    runner: EvalRunner,
    parallel: bool,
}

impl ComparisonRunner {
    /// Compare using the given runner's metrics, scorer and concurrency
    pub fn new(runner: EvalRunner) -> Self {
        Self {
            runner,
            parallel: false,
        }
    }

    pub fn from_config(config: &EvalConfig) -> BifrostResult<Self> {
        Ok(Self::new(EvalRunner::from_config(config)?)
            .with_parallel(config.parallel_configurations))
    }

    /// Run configurations concurrently instead of one after another
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the suite once per configuration and pick a winner
    pub async fn compare(
        &self,
        suite: &EvalSuite,
        configurations: Vec<(String, Arc<dyn PipelineExecutor>)>,
    ) -> BifrostResult<ComparisonResult> {
        suite.validate()?;
        tracing::info!(
            suite = %suite.name,
            configurations = configurations.len(),
            parallel = self.parallel,
            "Starting comparison"
        );

        let mut results = Vec::with_capacity(configurations.len());
        if self.parallel {
            let runs = configurations.into_iter().map(|(name, executor)| {
                let runner = self.runner_for(&name);
                async move {
                    let result = runner.run(suite, executor).await;
                    (name, result)
                }
            });
            for (name, result) in join_all(runs).await {
                results.push((name, result?));
            }
        } else {
            for (name, executor) in configurations {
                tracing::debug!(configuration = %name, "Running configuration");
                let result = self.runner_for(&name).run(suite, executor).await?;
                results.push((name, result));
            }
        }

        let comparison = ComparisonResult::from_results(&suite.name, results);
        tracing::info!(
            suite = %comparison.suite_name,
            winner = %comparison.winner,
            "Comparison finished"
        );
        Ok(comparison)
    }

    fn runner_for(&self, configuration: &str) -> EvalRunner {
        self.runner
            .clone()
            .with_metadata(CONFIGURATION_KEY, configuration)
    }
}
