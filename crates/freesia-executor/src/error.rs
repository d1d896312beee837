use thiserror::Error;

/// Error type for driving a workflow execution.
///
/// Every variant except `Store` is folded into the terminal execution
/// record: `DeadlineElapsed` becomes a `TimedOut` record and the rest become
/// `Failed` records carrying the rendered message. `Store` means the record
/// itself could not be read or written, so it surfaces to the caller of
/// `wait` instead.
#[derive(Debug, Error)]
pub enum ExecutorError {
  /// The job system rejected the submission.
  #[error(transparent)]
  JobSubmission { source: freesia_job::JobError },

  /// The job was submitted and its run ended in failure.
  #[error("job run failed: {message}")]
  JobExecution { message: String },

  /// The execution deadline elapsed before a terminal outcome.
  #[error("execution deadline elapsed")]
  DeadlineElapsed,

  /// The branch condition could not be evaluated from the job output.
  #[error("condition evaluation failed: {source}")]
  ConditionEvaluation {
    #[source]
    source: freesia_workflow::ConditionError,
  },

  /// The downstream action returned an error or a malformed response.
  #[error(transparent)]
  ActionInvocation { source: freesia_action::ActionError },

  /// The execution was cancelled before reaching a terminal step.
  #[error("execution cancelled")]
  Cancelled,

  /// An event was applied in a step that does not accept it.
  #[error("invalid state transition: {source}")]
  Transition {
    #[source]
    source: freesia_workflow::TransitionError,
  },

  /// A storage operation failed.
  #[error("store operation failed: {source}")]
  Store {
    #[source]
    source: freesia_store::Error,
  },
}
