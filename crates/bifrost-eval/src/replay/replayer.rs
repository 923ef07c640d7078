//! Trace replayer
//!
//! An executor that answers scenarios from a recorded [`TraceLibrary`].

use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::TraceLibrary;
use crate::model::ExecutionTrace;
use crate::runner::PipelineExecutor;
use crate::suite::Scenario;

/// Replays recorded traces by scenario name
#[derive(Debug, Clone)]
pub struct TraceReplayer {
    library: TraceLibrary,
    delay: Option<Duration>,
}

impl TraceReplayer {
    pub fn new(library: TraceLibrary) -> Self {
        Self {
            library,
            delay: None,
        }
    }

    /// Load a trace file and replay it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(TraceLibrary::load(path)?))
    }

    /// Wait this long before answering each scenario
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn library(&self) -> &TraceLibrary {
        &self.library
    }
}

#[async_trait]
impl PipelineExecutor for TraceReplayer {
    async fn execute(&self, scenario: &Scenario) -> Result<ExecutionTrace> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.library
            .get(&scenario.name)
            .cloned()
            .ok_or_else(|| anyhow!("no recorded trace for scenario '{}'", scenario.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn replayer() -> TraceReplayer {
        TraceReplayer::new(TraceLibrary::new().with_trace("known", ExecutionTrace::new(json!(42))))
    }

    #[tokio::test]
    async fn test_replays_known_scenario() {
        let trace = replayer().execute(&Scenario::new("known")).await.unwrap();
        assert_eq!(trace.output, json!(42));
    }

    #[tokio::test]
    async fn test_unknown_scenario_fails() {
        let err = replayer().execute(&Scenario::new("other")).await.unwrap_err();
        assert_eq!(err.to_string(), "no recorded trace for scenario 'other'");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_applied() {
        let replayer = replayer().with_delay(Duration::from_millis(250));
        let started = tokio::time::Instant::now();
        replayer.execute(&Scenario::new("known")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
