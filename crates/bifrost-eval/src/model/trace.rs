//! Execution traces and their cost/latency breakdowns

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_true() -> bool {
    true
}

/// One tool or agent invocation inside a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool or agent name
    pub tool_name: String,
    /// Arguments passed to the call
    #[serde(default)]
    pub arguments: HashMap<String, Value>,
    /// Value returned by the call
    #[serde(default)]
    pub result: Value,
    /// Whether the call succeeded
    #[serde(default = "default_true")]
    pub success: bool,
    /// Error message if the call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Call duration in milliseconds
    #[serde(default)]
    pub duration_ms: f64,
    /// Tokens consumed by the call
    #[serde(default)]
    pub token_count: u64,
    /// Cost of the call in USD
    #[serde(default)]
    pub cost_usd: f64,
}

impl ToolCallRecord {
    /// Create a successful call record
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
            result: Value::Null,
            success: true,
            error: None,
            duration_ms: 0.0,
            token_count: 0,
            cost_usd: 0.0,
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_result(mut self, result: impl Into<Value>) -> Self {
        self.result = result.into();
        self
    }

    /// Mark the call as failed
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_tokens(mut self, token_count: u64) -> Self {
        self.token_count = token_count;
        self
    }

    pub fn with_cost(mut self, cost_usd: f64) -> Self {
        self.cost_usd = cost_usd;
        self
    }
}

/// Additive cost aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostBreakdown {
    /// Total cost in USD
    pub total_usd: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    /// Cost per agent, summed on merge
    pub per_agent: HashMap<String, f64>,
    /// Cost per tool, summed on merge
    pub per_tool: HashMap<String, f64>,
}

impl CostBreakdown {
    /// Breakdown with only a total
    pub fn with_total(total_usd: f64) -> Self {
        Self {
            total_usd,
            ..Default::default()
        }
    }

    /// Total number of tokens
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Add another breakdown into this one field by field
    pub fn merge(&mut self, other: &CostBreakdown) {
        self.total_usd += other.total_usd;
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.input_cost_usd += other.input_cost_usd;
        self.output_cost_usd += other.output_cost_usd;
        merge_sums(&mut self.per_agent, &other.per_agent);
        merge_sums(&mut self.per_tool, &other.per_tool);
    }

    /// Format total cost for display
    pub fn format_cost(&self) -> String {
        if self.total_usd < 0.01 {
            format!("${:.4}", self.total_usd)
        } else {
            format!("${:.2}", self.total_usd)
        }
    }
}

/// Additive latency aggregate.
///
/// `p50_ms`/`p95_ms`/`p99_ms` are only meaningful on a suite-level
/// aggregate; a single trace leaves them at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyBreakdown {
    /// Total latency in milliseconds
    pub total_ms: f64,
    pub per_agent: HashMap<String, f64>,
    pub per_tool: HashMap<String, f64>,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl LatencyBreakdown {
    /// Breakdown with only a total
    pub fn with_total(total_ms: f64) -> Self {
        Self {
            total_ms,
            ..Default::default()
        }
    }

    /// Add another breakdown's totals and per-name maps; percentiles are untouched
    pub fn merge(&mut self, other: &LatencyBreakdown) {
        self.total_ms += other.total_ms;
        merge_sums(&mut self.per_agent, &other.per_agent);
        merge_sums(&mut self.per_tool, &other.per_tool);
    }
}

fn merge_sums(into: &mut HashMap<String, f64>, from: &HashMap<String, f64>) {
    for (key, value) in from {
        *into.entry(key.clone()).or_insert(0.0) += value;
    }
}

/// Raw record of one execution, as produced by an executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    /// Final output
    #[serde(default)]
    pub output: Value,
    /// Tool calls in invocation order
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default)]
    pub cost: CostBreakdown,
    #[serde(default)]
    pub latency: LatencyBreakdown,
    /// Error reported by the pipeline itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default = "default_true")]
    pub success: bool,
}

impl Default for ExecutionTrace {
    fn default() -> Self {
        Self {
            output: Value::Null,
            tool_calls: Vec::new(),
            cost: CostBreakdown::default(),
            latency: LatencyBreakdown::default(),
            error: None,
            success: true,
        }
    }
}

impl ExecutionTrace {
    /// Successful trace with the given output
    pub fn new(output: impl Into<Value>) -> Self {
        Self {
            output: output.into(),
            ..Default::default()
        }
    }

    /// Append a tool call
    pub fn with_tool_call(mut self, call: ToolCallRecord) -> Self {
        self.tool_calls.push(call);
        self
    }

    /// Append successful calls to the named tools
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_calls
            .extend(tools.into_iter().map(ToolCallRecord::new));
        self
    }

    pub fn with_cost(mut self, cost: CostBreakdown) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_latency(mut self, latency: LatencyBreakdown) -> Self {
        self.latency = latency;
        self
    }

    /// Mark the trace as failed
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}
