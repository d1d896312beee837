use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ActionError;
use crate::invoker::{ActionInvoker, narrow_response};

/// The in-process demo action.
///
/// Responds the way the reference downstream function does: a response
/// object whose `payload` field is a greeting, regardless of input.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingAction;

#[async_trait]
impl ActionInvoker for GreetingAction {
  async fn invoke(&self, _payload: Value) -> Result<Value, ActionError> {
    info!("greeting_action_invoked");
    narrow_response(json!({ "payload": "hi" }))
  }
}
