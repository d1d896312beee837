use thiserror::Error;

/// Errors produced while validating a trigger payload.
///
/// Validation failures are reported to the trigger caller synchronously; no
/// execution is created for a rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("request body must be a JSON object")]
  NotAnObject,

  #[error("missing required field 'n'")]
  MissingN,

  #[error("'n' must be an integer")]
  NonIntegerN,

  #[error("'n' must not be negative")]
  NegativeN,
}

/// A step event applied to a step that cannot accept it.
///
/// Transition errors indicate a driver bug, not a pipeline failure: a
/// correctly sequenced driver only ever feeds each step the events from its
/// row of the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event '{event}' is not valid in step '{step}'")]
pub struct TransitionError {
  /// Name of the step the event was applied to.
  pub step: &'static str,

  /// Name of the rejected event.
  pub event: &'static str,
}

/// Errors from evaluating the branch condition against job output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
  #[error("malformed job output: {0}")]
  MalformedOutput(String),

  #[error("job echoed n={echoed} but the execution input was n={expected}")]
  EchoMismatch { expected: i64, echoed: i64 },
}
