use thiserror::Error;

/// Error type for job runner operations.
#[derive(Debug, Error)]
pub enum JobError {
  /// The job system rejected the submission; no run was created.
  #[error("job submission failed: {message}")]
  Submission { message: String },

  /// The handle does not refer to a known run.
  #[error("job run '{run_id}' not found")]
  RunNotFound { run_id: String },

  /// The deadline elapsed before the run reached a terminal status.
  #[error("deadline elapsed while waiting for job run '{run_id}'")]
  DeadlineElapsed { run_id: String },

  /// The runner broke its own reporting contract.
  #[error("job runner internal error: {message}")]
  Internal { message: String },
}
