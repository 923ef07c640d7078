//! Evaluation configuration
//!
//! Configuration options for running evaluations. Values come from a JSON
//! or YAML file, then `BIFROST_EVAL_*` environment variables, then whatever
//! the caller sets through the builder methods.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{BifrostError, BifrostResult};
use crate::metrics::{
    ACCURACY, AccuracyMetric, COST_EFFICIENCY, CostEfficiencyMetric, DEFAULT_COST_BUDGET_USD,
    DEFAULT_LATENCY_TARGET_MS, LATENCY, LatencyMetric, Metric, TOOL_CORRECTNESS,
    ToolCorrectnessMetric,
};
use crate::model::GradeThresholds;
use crate::scoring::{DEFAULT_MIN_PASS_SCORE, Scorer, ThresholdGrader, WeightedGrader};
use crate::suite::DEFAULT_TIMEOUT_MS;

/// Prefix of environment variables read by [`EvalConfig::apply_env_overrides`]
pub const ENV_PREFIX: &str = "BIFROST_EVAL_";

/// Configuration for evaluation runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Scenarios run at once; 1 or less runs sequentially
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Timeout for scenarios loaded without one, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: f64,

    /// Which metrics run and how
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Grading policy
    #[serde(default)]
    pub grading: GradingConfig,

    /// Tags to filter by (empty = all)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Output directory for results
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Whether to write each result to `output_dir`
    #[serde(default)]
    pub save_results: bool,

    /// Run comparison configurations concurrently
    #[serde(default)]
    pub parallel_configurations: bool,
}

fn default_max_concurrency() -> usize {
    1
}

fn default_timeout_ms() -> f64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            default_timeout_ms: default_timeout_ms(),
            metrics: MetricsConfig::default(),
            grading: GradingConfig::default(),
            tags: Vec::new(),
            output_dir: None,
            save_results: false,
            parallel_configurations: false,
        }
    }
}

/// Metric selection and parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enabled metric names, in scoring order
    #[serde(default = "default_enabled_metrics")]
    pub enabled: Vec<String>,

    /// Per-metric weight (missing = 1.0)
    #[serde(default)]
    pub weights: HashMap<String, f64>,

    #[serde(default = "default_latency_target_ms")]
    pub latency_target_ms: f64,

    #[serde(default = "default_cost_budget_usd")]
    pub cost_budget_usd: f64,

    /// Score tool call order by longest common subsequence
    #[serde(default)]
    pub strict_order: bool,
}

fn default_enabled_metrics() -> Vec<String> {
    [ACCURACY, TOOL_CORRECTNESS, LATENCY, COST_EFFICIENCY]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_latency_target_ms() -> f64 {
    DEFAULT_LATENCY_TARGET_MS
}

fn default_cost_budget_usd() -> f64 {
    DEFAULT_COST_BUDGET_USD
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_metrics(),
            weights: HashMap::new(),
            latency_target_ms: default_latency_target_ms(),
            cost_budget_usd: default_cost_budget_usd(),
            strict_order: false,
        }
    }
}

impl MetricsConfig {
    fn weight(&self, name: &str) -> f64 {
        self.weights.get(name).copied().unwrap_or(1.0)
    }
}

/// Grading policy selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum GradingConfig {
    /// Cut points applied to the weighted score
    Threshold {
        #[serde(default)]
        thresholds: GradeThresholds,
    },
    /// Per-dimension minimums, then fixed cut points
    Weighted {
        #[serde(default)]
        required_scores: HashMap<String, f64>,
        #[serde(default = "default_min_pass_score")]
        min_pass_score: f64,
    },
}

fn default_min_pass_score() -> f64 {
    DEFAULT_MIN_PASS_SCORE
}

impl Default for GradingConfig {
    fn default() -> Self {
        GradingConfig::Threshold {
            thresholds: GradeThresholds::default(),
        }
    }
}

impl EvalConfig {
    /// Load a config file (JSON, or YAML for `.yaml`/`.yml`) and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: EvalConfig = if path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml")
        {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {:?}", path))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {:?}", path))?
        };

        config.validate()?;
        Ok(config)
    }

    /// File (or defaults) plus environment overrides, validated
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BIFROST_EVAL_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) -> BifrostResult<()> {
        self.apply_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `BIFROST_EVAL_*` overrides from an arbitrary lookup
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> BifrostResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(value) = var("MAX_CONCURRENCY") {
            self.max_concurrency = value.trim().parse().map_err(|_| {
                BifrostError::config(format!("Invalid {}MAX_CONCURRENCY value", ENV_PREFIX))
            })?;
        }

        if let Some(value) = var("DEFAULT_TIMEOUT_MS") {
            self.default_timeout_ms = value.trim().parse().map_err(|_| {
                BifrostError::config(format!("Invalid {}DEFAULT_TIMEOUT_MS value", ENV_PREFIX))
            })?;
        }

        if let Some(dir) = var("OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(dir));
        }

        if let Some(value) = var("SAVE_RESULTS") {
            self.save_results = parse_bool(&value).ok_or_else(|| {
                BifrostError::config(format!("Invalid {}SAVE_RESULTS value", ENV_PREFIX))
            })?;
        }

        if let Some(value) = var("PARALLEL_CONFIGURATIONS") {
            self.parallel_configurations = parse_bool(&value).ok_or_else(|| {
                BifrostError::config(format!(
                    "Invalid {}PARALLEL_CONFIGURATIONS value",
                    ENV_PREFIX
                ))
            })?;
        }

        Ok(())
    }

    /// Set max concurrency
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the timeout for scenarios that do not declare one
    pub fn with_default_timeout_ms(mut self, timeout_ms: f64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Set tags to filter by
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set output directory and enable saving
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self.save_results = true;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_grading(mut self, grading: GradingConfig) -> Self {
        self.grading = grading;
        self
    }

    pub fn with_parallel_configurations(mut self, parallel: bool) -> Self {
        self.parallel_configurations = parallel;
        self
    }

    /// Reject values the runner cannot work with
    pub fn validate(&self) -> BifrostResult<()> {
        if !(self.default_timeout_ms.is_finite() && self.default_timeout_ms > 0.0) {
            return Err(BifrostError::config("default_timeout_ms must be positive"));
        }
        self.build_metrics()?;
        self.build_scorer()?;
        Ok(())
    }

    /// Instantiate the enabled metrics in configuration order
    pub fn build_metrics(&self) -> BifrostResult<Vec<Arc<dyn Metric>>> {
        let cfg = &self.metrics;
        cfg.enabled
            .iter()
            .map(|name| -> BifrostResult<Arc<dyn Metric>> {
                let weight = cfg.weight(name);
                Ok(match name.as_str() {
                    ACCURACY => Arc::new(AccuracyMetric::new().with_weight(weight)?),
                    TOOL_CORRECTNESS => Arc::new(
                        ToolCorrectnessMetric::new()
                            .with_strict_order(cfg.strict_order)
                            .with_weight(weight)?,
                    ),
                    LATENCY => {
                        Arc::new(LatencyMetric::try_new(cfg.latency_target_ms)?.with_weight(weight)?)
                    }
                    COST_EFFICIENCY => Arc::new(
                        CostEfficiencyMetric::try_new(cfg.cost_budget_usd)?.with_weight(weight)?,
                    ),
                    other => {
                        return Err(BifrostError::config(format!("Unknown metric '{}'", other)));
                    }
                })
            })
            .collect()
    }

    /// Instantiate the configured grading policy
    pub fn build_scorer(&self) -> BifrostResult<Scorer> {
        Ok(match &self.grading {
            GradingConfig::Threshold { thresholds } => {
                Scorer::new(Arc::new(ThresholdGrader::new(*thresholds)?))
            }
            GradingConfig::Weighted {
                required_scores,
                min_pass_score,
            } => Scorer::new(Arc::new(
                WeightedGrader::new()
                    .with_required_scores(required_scores.clone())
                    .with_min_pass_score(*min_pass_score)?,
            )),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
