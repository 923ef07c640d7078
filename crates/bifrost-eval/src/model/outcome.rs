//! Scored scenario outcomes and suite-level results

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{
    CostBreakdown, EvalScore, ExecutionTrace, GradeLevel, GradeThresholds, LatencyBreakdown,
    ToolCallRecord,
};

/// Lifecycle of a single scenario execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Completed,
    TimedOut,
    Errored,
}

impl ScenarioStatus {
    /// Whether the scenario has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScenarioStatus::Completed | ScenarioStatus::TimedOut | ScenarioStatus::Errored
        )
    }
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScenarioStatus::Pending => "pending",
            ScenarioStatus::Running => "running",
            ScenarioStatus::Completed => "completed",
            ScenarioStatus::TimedOut => "timed_out",
            ScenarioStatus::Errored => "errored",
        };
        write!(f, "{}", s)
    }
}

/// The scored result of running one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario_name: String,
    /// Finalized by the grader; provisional until then
    pub passed: bool,
    /// Scores in metric configuration order
    #[serde(default)]
    pub scores: Vec<EvalScore>,
    #[serde(default)]
    pub actual_output: Value,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default)]
    pub cost: CostBreakdown,
    #[serde(default)]
    pub latency: LatencyBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default = "default_grade")]
    pub grade: GradeLevel,
    #[serde(default = "default_status")]
    pub status: ScenarioStatus,
}

fn default_grade() -> GradeLevel {
    GradeLevel::Fail
}

fn default_status() -> ScenarioStatus {
    ScenarioStatus::Completed
}

impl ScenarioOutcome {
    /// Adopt a completed trace. `passed` mirrors the trace's success flag
    /// until the grader overwrites it.
    pub fn from_trace(scenario_name: impl Into<String>, trace: ExecutionTrace) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            passed: trace.success,
            scores: Vec::new(),
            actual_output: trace.output,
            tool_calls: trace.tool_calls,
            cost: trace.cost,
            latency: trace.latency,
            error: trace.error,
            grade: GradeLevel::Fail,
            status: ScenarioStatus::Completed,
        }
    }

    /// Outcome for an execution that exceeded its time limit
    pub fn timed_out(scenario_name: impl Into<String>, elapsed_ms: f64, limit_ms: f64) -> Self {
        Self::failed(
            scenario_name,
            format!("Timeout after {:.0}ms (limit {}ms)", elapsed_ms, limit_ms),
            elapsed_ms,
            ScenarioStatus::TimedOut,
        )
    }

    /// Outcome for an execution that failed; the message is kept verbatim
    pub fn errored(scenario_name: impl Into<String>, message: impl Into<String>, elapsed_ms: f64) -> Self {
        Self::failed(scenario_name, message, elapsed_ms, ScenarioStatus::Errored)
    }

    fn failed(
        scenario_name: impl Into<String>,
        message: impl Into<String>,
        elapsed_ms: f64,
        status: ScenarioStatus,
    ) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            passed: false,
            scores: Vec::new(),
            actual_output: Value::Null,
            tool_calls: Vec::new(),
            cost: CostBreakdown::default(),
            latency: LatencyBreakdown::with_total(elapsed_ms),
            error: Some(message.into()),
            grade: GradeLevel::Fail,
            status,
        }
    }

    /// Σ(value·weight)/Σ(weight); 0.0 with no scores or zero total weight
    pub fn weighted_score(&self) -> f64 {
        let total_weight: f64 = self.scores.iter().map(|s| s.weight()).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = self.scores.iter().map(|s| s.value() * s.weight()).sum();
        weighted / total_weight
    }

    /// Tool names in call order
    pub fn tool_call_names(&self) -> Vec<&str> {
        self.tool_calls.iter().map(|c| c.tool_name.as_str()).collect()
    }

    /// Last score recorded under `name`
    pub fn score(&self, name: &str) -> Option<&EvalScore> {
        self.scores.iter().rev().find(|s| s.name() == name)
    }
}

/// Aggregate of one suite run against one executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub run_id: Uuid,
    pub suite_name: String,
    /// Outcomes in scenario declaration order
    pub outcomes: Vec<ScenarioOutcome>,
    pub total_cost: CostBreakdown,
    pub total_latency: LatencyBreakdown,
    pub run_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl EvalResult {
    /// Create a result stamped with a fresh run id and the current time
    pub fn new(
        suite_name: impl Into<String>,
        outcomes: Vec<ScenarioOutcome>,
        total_cost: CostBreakdown,
        total_latency: LatencyBreakdown,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            suite_name: suite_name.into(),
            outcomes,
            total_cost,
            total_latency,
            run_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn total_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    /// Fraction of outcomes that passed (0.0 when empty)
    pub fn pass_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.passed_count() as f64 / self.total_count() as f64
    }

    /// Mean weighted score over outcomes (0.0 when empty)
    pub fn mean_score(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.outcomes.iter().map(|o| o.weighted_score()).sum();
        sum / self.outcomes.len() as f64
    }

    /// Grade of the mean score under the default cut points
    pub fn grade(&self) -> GradeLevel {
        GradeThresholds::default().grade(self.mean_score())
    }

    /// Last outcome recorded for `scenario_name`
    pub fn outcome(&self, scenario_name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes
            .iter()
            .rev()
            .find(|o| o.scenario_name == scenario_name)
    }
}
