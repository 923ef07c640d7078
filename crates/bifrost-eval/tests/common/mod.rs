//! Shared helpers for bifrost-eval integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bifrost_eval::{
    CostBreakdown, EvalSuite, ExecutionTrace, LatencyBreakdown, PipelineExecutor, Scenario,
};
use parking_lot::Mutex;
use serde_json::Value;

/// What the scripted executor does for one scenario
#[derive(Debug, Clone)]
pub enum Behavior {
    Respond { trace: ExecutionTrace, delay: Duration },
    Fail(String),
    Panic(String),
}

/// Executor whose answer per scenario is configured up front.
///
/// Scenarios without a script echo their expected output and expected tool
/// calls after the default delay.
pub struct ScriptedExecutor {
    behaviors: HashMap<String, Behavior>,
    default_delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            default_delay: Duration::from_millis(10),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn respond(self, scenario: &str, trace: ExecutionTrace) -> Self {
        let delay = self.default_delay;
        self.respond_after(scenario, delay, trace)
    }

    pub fn respond_after(mut self, scenario: &str, delay: Duration, trace: ExecutionTrace) -> Self {
        self.behaviors
            .insert(scenario.to_string(), Behavior::Respond { trace, delay });
        self
    }

    pub fn fail(mut self, scenario: &str, message: &str) -> Self {
        self.behaviors
            .insert(scenario.to_string(), Behavior::Fail(message.to_string()));
        self
    }

    pub fn panic_on(mut self, scenario: &str) -> Self {
        self.behaviors.insert(
            scenario.to_string(),
            Behavior::Panic(format!("executor exploded on {}", scenario)),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Scenario names in the order execution started
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    fn echo(scenario: &Scenario) -> ExecutionTrace {
        ExecutionTrace::new(scenario.expected_output.clone().unwrap_or(Value::Null))
            .with_tools(scenario.expected_tool_calls.iter().cloned())
            .with_latency(LatencyBreakdown::with_total(100.0))
            .with_cost(CostBreakdown::with_total(0.01))
    }
}

impl Default for ScriptedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PipelineExecutor for ScriptedExecutor {
    async fn execute(&self, scenario: &Scenario) -> Result<ExecutionTrace> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(scenario.name.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        match self.behaviors.get(&scenario.name) {
            Some(Behavior::Respond { trace, delay }) => {
                tokio::time::sleep(*delay).await;
                Ok(trace.clone())
            }
            Some(Behavior::Fail(message)) => Err(anyhow!("{}", message)),
            Some(Behavior::Panic(message)) => panic!("{}", message),
            None => {
                tokio::time::sleep(self.default_delay).await;
                Ok(Self::echo(scenario))
            }
        }
    }
}

/// A suite of `count` scenarios named `s0..`, each expecting its own index
pub fn numbered_suite(count: usize) -> EvalSuite {
    EvalSuite::new("numbered").with_scenarios(
        (0..count).map(|i| Scenario::new(format!("s{}", i)).with_expected_output(i as u64)),
    )
}
