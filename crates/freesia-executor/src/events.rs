//! Execution event notifications.
//!
//! The executor reports progress through an [`ExecutionNotifier`]. The
//! default [`NoopNotifier`] discards everything; [`ChannelNotifier`] fans
//! events out over an unbounded channel for callers that want to observe a
//! run (the CLI, tests, or an embedding service).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Events emitted while an execution is driven through its steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
  /// The execution left `Start` and began running.
  ExecutionStarted { execution_id: String, n: i64 },
  /// The background job was accepted by the job system.
  JobSubmitted { execution_id: String, run_id: String },
  /// The background job reached a successful terminal status.
  JobCompleted {
    execution_id: String,
    run_id: String,
    output: Value,
  },
  /// Cancellation was issued for an outstanding run.
  JobCancellationIssued { execution_id: String, run_id: String },
  /// The branch condition was evaluated.
  ConditionEvaluated { execution_id: String, invoke: bool },
  /// The downstream action returned its narrowed payload.
  ActionInvoked { execution_id: String, result: Value },
  /// The skip branch was taken and no action was invoked.
  ActionSkipped { execution_id: String },
  /// The execution reached `Succeeded` with a final result.
  ExecutionSucceeded { execution_id: String, result: Value },
  /// The execution reached `Failed`.
  ExecutionFailed { execution_id: String, error: String },
  /// The execution deadline elapsed and the record was marked `TimedOut`.
  ExecutionTimedOut { execution_id: String },
}

/// Trait for receiving execution events.
pub trait ExecutionNotifier: Send + Sync + 'static {
  fn notify(&self, event: ExecutionEvent);
}

/// A notifier that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {
    // Intentionally empty
  }
}

/// A notifier that forwards events over an unbounded channel.
///
/// NOTE: the channel is unbounded so `notify` never blocks the execution.
/// A receiver that stops draining trades memory for that guarantee.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  /// Create a notifier and the receiver that drains it.
  pub fn new() -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self { sender }, receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
