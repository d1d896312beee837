//! Workflow executor.

use std::sync::Arc;

use freesia_action::ActionInvoker;
use freesia_config::PipelineConfig;
use freesia_job::JobRunner;
use freesia_store::Store;
use freesia_workflow::InvocationRequest;
use tokio_util::sync::CancellationToken;

use crate::events::{ExecutionNotifier, NoopNotifier};
use crate::execution::WorkflowExecution;

/// Builds execution handles from a configured set of adapters.
///
/// The executor holds no per-execution state. [`execute`](Self::execute)
/// hands back an owned [`WorkflowExecution`], so any number of executions
/// can be dispatched from one executor and driven concurrently.
pub struct WorkflowExecutor<N: ExecutionNotifier = NoopNotifier> {
  config: PipelineConfig,
  job_runner: Arc<dyn JobRunner>,
  action_invoker: Arc<dyn ActionInvoker>,
  store: Arc<dyn Store>,
  notifier: N,
}

impl WorkflowExecutor<NoopNotifier> {
  /// Create an executor that discards execution events.
  pub fn new(
    config: PipelineConfig,
    job_runner: Arc<dyn JobRunner>,
    action_invoker: Arc<dyn ActionInvoker>,
    store: Arc<dyn Store>,
  ) -> Self {
    Self::with_notifier(config, job_runner, action_invoker, store, NoopNotifier)
  }
}

impl<N: ExecutionNotifier + Clone> WorkflowExecutor<N> {
  /// Create an executor that reports execution events to `notifier`.
  pub fn with_notifier(
    config: PipelineConfig,
    job_runner: Arc<dyn JobRunner>,
    action_invoker: Arc<dyn ActionInvoker>,
    store: Arc<dyn Store>,
    notifier: N,
  ) -> Self {
    Self {
      config,
      job_runner,
      action_invoker,
      store,
      notifier,
    }
  }

  /// Build the handle for an execution whose record already exists.
  ///
  /// The trigger boundary creates the record before dispatching, so by the
  /// time the handle is driven the store can accept status updates for it.
  /// Nothing runs until the handle's `wait` is polled.
  pub fn execute(
    &self,
    execution_id: impl Into<String>,
    request: InvocationRequest,
    cancel: CancellationToken,
  ) -> WorkflowExecution<N> {
    WorkflowExecution::new(
      self.config.clone(),
      Arc::clone(&self.job_runner),
      Arc::clone(&self.action_invoker),
      Arc::clone(&self.store),
      self.notifier.clone(),
      execution_id.into(),
      request,
      cancel,
    )
  }
}
