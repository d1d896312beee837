use serde::{Deserialize, Serialize};

/// Status of a workflow execution.
///
/// Statuses advance monotonically: `Started → JobRunning → Deciding →
/// Invoking|Skipping → Succeeded`, with `Failed` and `TimedOut` reachable
/// from any non-terminal status. A terminal status never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Started,
  JobRunning,
  Deciding,
  Invoking,
  Skipping,
  Succeeded,
  Failed,
  TimedOut,
}

impl ExecutionStatus {
  /// Whether no further transition can occur from this status.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
  }
}
