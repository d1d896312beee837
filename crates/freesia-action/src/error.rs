use thiserror::Error;

/// Error type for action invocation.
#[derive(Debug, Error)]
pub enum ActionError {
  /// The configured endpoint could not be parsed.
  #[error("invalid action endpoint '{endpoint}': {message}")]
  InvalidEndpoint { endpoint: String, message: String },

  /// The invocation failed: transport error or non-success status.
  #[error("action invocation failed: {message}")]
  Invocation { message: String },

  /// The action responded, but not with the expected shape.
  #[error("malformed action response: {message}")]
  MalformedResponse { message: String },
}
