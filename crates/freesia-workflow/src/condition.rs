//! Branch condition for the pipeline.

use serde_json::Value;

use crate::error::ConditionError;

/// Optional boolean field in job output that forces the branch decision.
pub const OVERRIDE_FIELD: &str = "invoke";

/// Decide whether the action branch runs.
///
/// Pure: no I/O, no retries, deterministic for a given input. A boolean
/// [`OVERRIDE_FIELD`] in the job output forces the decision. Otherwise the
/// job must echo the integer `n` it was given, and the branch is taken when
/// that echo is even. An echo that disagrees with the execution input means
/// the job ran against a different parameter, which is reported as an error
/// rather than silently resolved in either direction.
pub fn should_invoke(n: i64, job_output: &Value) -> Result<bool, ConditionError> {
  let output = job_output.as_object().ok_or_else(|| {
    ConditionError::MalformedOutput("job output is not a JSON object".to_string())
  })?;

  if let Some(flag) = output.get(OVERRIDE_FIELD) {
    return flag.as_bool().ok_or_else(|| {
      ConditionError::MalformedOutput(format!("'{}' field is not a boolean", OVERRIDE_FIELD))
    });
  }

  let echoed = output
    .get("n")
    .ok_or_else(|| {
      ConditionError::MalformedOutput(format!(
        "job output carries neither '{}' nor an echoed 'n'",
        OVERRIDE_FIELD
      ))
    })?
    .as_i64()
    .ok_or_else(|| ConditionError::MalformedOutput("echoed 'n' is not an integer".to_string()))?;

  if echoed != n {
    return Err(ConditionError::EchoMismatch {
      expected: n,
      echoed,
    });
  }

  Ok(echoed % 2 == 0)
}
