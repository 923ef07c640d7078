//! Trace recorder
//!
//! Wraps a live executor and records every successful trace so the run can
//! be replayed later without the pipeline.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::TraceLibrary;
use crate::model::ExecutionTrace;
use crate::runner::PipelineExecutor;
use crate::suite::Scenario;

/// Executor wrapper that records traces into a shared library
pub struct TraceRecorder<E> {
    inner: E,
    library: Arc<Mutex<TraceLibrary>>,
}

impl<E> TraceRecorder<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            library: Arc::new(Mutex::new(TraceLibrary {
                recorded_at: Some(Utc::now()),
                ..Default::default()
            })),
        }
    }

    /// Handle to the library being recorded into
    pub fn library(&self) -> Arc<Mutex<TraceLibrary>> {
        Arc::clone(&self.library)
    }

    /// Copy of everything recorded so far
    pub fn snapshot(&self) -> TraceLibrary {
        self.library.lock().clone()
    }

    /// Save everything recorded so far
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.snapshot().save(path)
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

#[async_trait]
impl<E> PipelineExecutor for TraceRecorder<E>
where
    E: PipelineExecutor,
{
    async fn execute(&self, scenario: &Scenario) -> Result<ExecutionTrace> {
        let trace = self.inner.execute(scenario).await?;
        self.library.lock().insert(&scenario.name, trace.clone());
        tracing::debug!(scenario = %scenario.name, "Recorded trace");
        Ok(trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::MockPipelineExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_successful_traces_only() {
        let mut inner = MockPipelineExecutor::new();
        inner.expect_execute().returning(|s| {
            if s.name == "fails" {
                Err(anyhow::anyhow!("boom"))
            } else {
                Ok(ExecutionTrace::new(json!(s.name.len())))
            }
        });

        let recorder = TraceRecorder::new(inner);
        recorder.execute(&Scenario::new("ok")).await.unwrap();
        assert!(recorder.execute(&Scenario::new("fails")).await.is_err());
        recorder.execute(&Scenario::new("longer")).await.unwrap();

        let library = recorder.snapshot();
        assert_eq!(library.len(), 2);
        assert_eq!(library.get("longer").unwrap().output, json!(6));
        assert!(library.get("fails").is_none());
        assert!(library.recorded_at.is_some());
    }

    #[tokio::test]
    async fn test_save_recording() {
        let mut inner = MockPipelineExecutor::new();
        inner
            .expect_execute()
            .returning(|_| Ok(ExecutionTrace::new("ok")));
        let recorder = TraceRecorder::new(inner);
        recorder.execute(&Scenario::new("a")).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recorded.json");
        recorder.save(&path).unwrap();
        assert_eq!(TraceLibrary::load(&path).unwrap(), recorder.snapshot());
    }
}
