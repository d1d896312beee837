use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::JobError;
use crate::types::{JobRequest, JobRun, JobRunHandle};

/// Adapter to a batch job system.
///
/// Implementations must be safe for concurrent use by many simultaneous
/// executions; calls share no mutable state beyond the implementation's own
/// synchronization.
#[async_trait]
pub trait JobRunner: Send + Sync {
  /// Submit a job run.
  ///
  /// Submission failures (unknown job, rejected request) are distinct from
  /// run failures, which `await_completion` reports on the run itself.
  async fn submit(&self, request: JobRequest) -> Result<JobRunHandle, JobError>;

  /// Block until the run reaches a terminal status or the deadline elapses.
  ///
  /// Run-to-completion: the wait is event-driven inside the implementation,
  /// never a caller-side polling loop. A returned run is terminal, either
  /// `Succeeded` with its output or `Failed` with an error message. The
  /// deadline elapsing is [`JobError::DeadlineElapsed`].
  async fn await_completion(
    &self,
    handle: &JobRunHandle,
    deadline: Instant,
  ) -> Result<JobRun, JobError>;

  /// Request cancellation of an in-flight run.
  ///
  /// Best-effort: the run may still reach a terminal status on its own, and
  /// cancelling an already-finished run is not an error.
  async fn cancel(&self, handle: &JobRunHandle) -> Result<(), JobError>;
}
