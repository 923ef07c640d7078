//! The pipeline capability under evaluation
//!
//! Anything that can turn a [`Scenario`] into an [`ExecutionTrace`]
//! asynchronously can be evaluated. Executors are not assumed to be
//! idempotent or side-effect free.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::ExecutionTrace;
use crate::suite::Scenario;

/// Executes one scenario against the pipeline under test
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PipelineExecutor: Send + Sync {
    /// Run the scenario and return its trace, or fail
    async fn execute(&self, scenario: &Scenario) -> Result<ExecutionTrace>;
}

#[async_trait]
impl<T> PipelineExecutor for Arc<T>
where
    T: PipelineExecutor + ?Sized,
{
    async fn execute(&self, scenario: &Scenario) -> Result<ExecutionTrace> {
        (**self).execute(scenario).await
    }
}

/// Adapts an async closure into a [`PipelineExecutor`]
///
/// ```rust,ignore
/// let executor = FnExecutor::new(|scenario: Scenario| async move {
///     Ok(ExecutionTrace::new(scenario.name))
/// });
/// ```
pub struct FnExecutor<F> {
    func: F,
}

impl<F> FnExecutor<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> PipelineExecutor for FnExecutor<F>
where
    F: Fn(Scenario) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ExecutionTrace>> + Send + 'static,
{
    async fn execute(&self, scenario: &Scenario) -> Result<ExecutionTrace> {
        (self.func)(scenario.clone()).await
    }
}
