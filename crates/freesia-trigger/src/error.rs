use thiserror::Error;

/// Error type for the trigger boundary.
#[derive(Debug, Error)]
pub enum TriggerError {
  /// The payload failed validation. No execution was created and nothing
  /// was dispatched.
  #[error(transparent)]
  InvalidInput(#[from] freesia_workflow::ValidationError),

  /// The execution record could not be created.
  #[error("store operation failed: {source}")]
  Store {
    #[source]
    source: freesia_store::Error,
  },
}
