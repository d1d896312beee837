//! Trigger receiver.

use std::sync::Arc;

use freesia_executor::{ExecutionNotifier, NoopNotifier, WorkflowExecutor};
use freesia_store::{ExecutionRecord, Store};
use freesia_workflow::InvocationRequest;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

use crate::error::TriggerError;
use crate::types::{TriggerResponse, TriggerStatus};

/// Accepts trigger payloads and dispatches workflow executions.
///
/// [`trigger`](Self::trigger) validates the payload, creates the execution
/// record, and spawns the execution before acknowledging; the caller never
/// waits on the workflow. Triggering is not idempotent: every accepted call
/// creates a fresh execution with its own id, byte-identical payloads
/// included.
pub struct TriggerReceiver<N: ExecutionNotifier = NoopNotifier> {
  executor: Arc<WorkflowExecutor<N>>,
  store: Arc<dyn Store>,
  tracker: TaskTracker,
  cancel: CancellationToken,
}

impl<N: ExecutionNotifier + Clone> TriggerReceiver<N> {
  pub fn new(executor: Arc<WorkflowExecutor<N>>, store: Arc<dyn Store>) -> Self {
    Self {
      executor,
      store,
      tracker: TaskTracker::new(),
      cancel: CancellationToken::new(),
    }
  }

  /// Validate a payload and dispatch an execution for it.
  ///
  /// Returns once the record exists and the execution is spawned. A
  /// rejected payload creates nothing. The spawned execution writes its own
  /// terminal record; only a store failure is left to report here, and it
  /// is logged rather than returned because the caller is long gone.
  pub async fn trigger(&self, payload: &Value) -> Result<TriggerResponse, TriggerError> {
    let request = InvocationRequest::from_payload(payload)?;
    let execution_id = uuid::Uuid::new_v4().to_string();

    let record = ExecutionRecord::new(execution_id.clone(), request);
    self
      .store
      .create_execution(&record)
      .await
      .map_err(|e| TriggerError::Store { source: e })?;

    let execution = self
      .executor
      .execute(execution_id.clone(), request, self.cancel.child_token());

    info!(execution_id = %execution_id, n = request.n, "execution_accepted");

    self.tracker.spawn(async move {
      if let Err(e) = execution.wait().await {
        error!(error = %e, "execution_store_failed");
      }
    });

    Ok(TriggerResponse {
      execution_id,
      status: TriggerStatus::Accepted,
    })
  }

  /// Wait for every dispatched execution to reach its terminal record.
  pub async fn wait_idle(&self) {
    self.tracker.close();
    self.tracker.wait().await;
  }

  /// Cancel outstanding executions and wait for them to settle.
  ///
  /// Cancelled executions end `Failed`; records already terminal are left
  /// untouched.
  pub async fn shutdown(&self) {
    info!("trigger_shutdown");
    self.cancel.cancel();
    self.tracker.close();
    self.tracker.wait().await;
  }
}
