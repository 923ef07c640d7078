//! Scenario and suite definitions
//!
//! A suite is an ordered, named list of scenarios. Both are plain values:
//! once built or deserialized they are only read.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BifrostError, BifrostResult};

/// Default per-scenario timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: f64 = 30_000.0;

fn default_timeout_ms() -> f64 {
    DEFAULT_TIMEOUT_MS
}

/// A single evaluation scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display key; lookups by name are last-write-wins
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Input payload handed to the executor
    #[serde(default, alias = "input")]
    pub input_data: HashMap<String, Value>,

    /// Expected output, compared by the accuracy metric
    #[serde(default)]
    pub expected_output: Option<Value>,

    /// Expected tool/agent names in call order (empty means no expectation)
    #[serde(default)]
    pub expected_tool_calls: Vec<String>,

    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,

    /// Timeout in milliseconds, fractions allowed
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: f64,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Scenario {
    /// Create a new scenario with default timeout and no expectations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_data: HashMap::new(),
            expected_output: None,
            expected_tool_calls: Vec::new(),
            tags: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            metadata: HashMap::new(),
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an input field
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input_data.insert(key.into(), value.into());
        self
    }

    /// Set the expected output
    pub fn with_expected_output(mut self, expected: impl Into<Value>) -> Self {
        self.expected_output = Some(expected.into());
        self
    }

    /// Set the expected tool call sequence
    pub fn with_expected_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_tool_calls = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Add a tag (duplicates are ignored)
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Set timeout in milliseconds
    pub fn with_timeout_ms(mut self, timeout_ms: f64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Timeout as a duration; zero when the timeout is not a positive number
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_ms / 1000.0).unwrap_or_default()
    }

    /// Whether the scenario carries any of the given tags
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }

    /// Check structural validity
    pub fn validate(&self) -> BifrostResult<()> {
        if self.name.trim().is_empty() {
            return Err(BifrostError::invalid_scenario(
                &self.name,
                "name must not be empty",
            ));
        }
        if !(self.timeout_ms.is_finite() && self.timeout_ms > 0.0) {
            return Err(BifrostError::invalid_scenario(
                &self.name,
                "timeout_ms must be positive",
            ));
        }
        Ok(())
    }
}

/// An ordered collection of scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSuite {
    /// Suite name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Scenarios in declaration order
    #[serde(default)]
    pub scenarios: Vec<Scenario>,

    /// Suite-level tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl EvalSuite {
    /// Create an empty suite
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scenarios: Vec::new(),
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a scenario
    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Append several scenarios
    pub fn with_scenarios(mut self, scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        self.scenarios.extend(scenarios);
        self
    }

    /// Add a suite tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Number of scenarios
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the suite has no scenarios
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Look up a scenario by name; the last declaration wins
    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().rev().find(|s| s.name == name)
    }

    /// Keep only scenarios that share at least one tag with `tags`.
    /// An empty filter keeps every scenario.
    pub fn filter_by_tags(&self, tags: &[String]) -> EvalSuite {
        if tags.is_empty() {
            return self.clone();
        }
        EvalSuite {
            scenarios: self
                .scenarios
                .iter()
                .filter(|s| s.has_any_tag(tags))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Check the suite and every scenario in it
    pub fn validate(&self) -> BifrostResult<()> {
        if self.name.trim().is_empty() {
            return Err(BifrostError::invalid_suite(
                &self.name,
                "name must not be empty",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for scenario in &self.scenarios {
            scenario.validate()?;
            if !seen.insert(scenario.name.as_str()) {
                tracing::warn!(
                    suite = %self.name,
                    scenario = %scenario.name,
                    "Duplicate scenario name; lookups will resolve to the last declaration"
                );
            }
        }

        Ok(())
    }
}
