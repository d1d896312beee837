use async_trait::async_trait;
use serde_json::Value;

use crate::error::ActionError;

/// Adapter to the downstream action.
///
/// Implementations must be safe for concurrent use by many simultaneous
/// executions. No retry policy: a failed invocation is reported as-is.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
  /// Invoke the action with a JSON payload.
  ///
  /// Returns the action's effective output: the nested `payload` field of
  /// its response, already narrowed by the implementation.
  async fn invoke(&self, payload: Value) -> Result<Value, ActionError>;
}

/// Narrow an action response to its nested `payload` field.
///
/// Every invoker applies this before returning. A response that is not an
/// object, or has no `payload` field, is malformed.
pub fn narrow_response(response: Value) -> Result<Value, ActionError> {
  match response {
    Value::Object(mut object) => {
      object
        .remove("payload")
        .ok_or_else(|| ActionError::MalformedResponse {
          message: "response has no 'payload' field".to_string(),
        })
    }
    other => Err(ActionError::MalformedResponse {
      message: format!("response is not a JSON object: {}", other),
    }),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn narrows_to_the_payload_field() {
    let result = narrow_response(json!({ "payload": "hi", "status": 200 })).expect("narrows");
    assert_eq!(result, json!("hi"));
  }

  #[test]
  fn payload_can_be_any_json() {
    let result =
      narrow_response(json!({ "payload": { "message": "hi", "count": 2 } })).expect("narrows");
    assert_eq!(result, json!({ "message": "hi", "count": 2 }));
  }

  #[test]
  fn missing_payload_field_is_malformed() {
    let result = narrow_response(json!({ "message": "hi" }));
    assert!(matches!(result, Err(ActionError::MalformedResponse { .. })));
  }

  #[test]
  fn non_object_response_is_malformed() {
    let result = narrow_response(json!("hi"));
    assert!(matches!(result, Err(ActionError::MalformedResponse { .. })));
  }
}
