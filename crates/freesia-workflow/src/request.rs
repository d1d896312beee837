use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Immutable input to a workflow execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationRequest {
  /// The numeric parameter forwarded to the batch job.
  pub n: i64,
}

impl InvocationRequest {
  /// Validate an untrusted trigger payload.
  ///
  /// Accepts a JSON object with an integer field `n`. Floats, strings,
  /// booleans, numbers outside the i64 range, and negative values are all
  /// rejected; unknown fields are ignored.
  pub fn from_payload(payload: &Value) -> Result<Self, ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;
    let n = object.get("n").ok_or(ValidationError::MissingN)?;
    let n = n.as_i64().ok_or(ValidationError::NonIntegerN)?;

    if n < 0 {
      return Err(ValidationError::NegativeN);
    }

    Ok(Self { n })
  }
}
