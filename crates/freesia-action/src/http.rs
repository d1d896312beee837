//! HTTP action invoker.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ActionError;
use crate::invoker::{ActionInvoker, narrow_response};

/// Invokes the action over HTTP.
///
/// The payload is POSTed as JSON to the configured endpoint. The response
/// body must be a JSON object carrying the nested `payload` field; non-2xx
/// statuses and non-JSON bodies are invocation errors.
pub struct HttpActionInvoker {
  client: reqwest::Client,
  endpoint: Url,
}

impl HttpActionInvoker {
  pub fn new(endpoint: &str) -> Result<Self, ActionError> {
    let endpoint = Url::parse(endpoint).map_err(|e| ActionError::InvalidEndpoint {
      endpoint: endpoint.to_string(),
      message: e.to_string(),
    })?;

    Ok(Self {
      client: reqwest::Client::new(),
      endpoint,
    })
  }
}

#[async_trait]
impl ActionInvoker for HttpActionInvoker {
  async fn invoke(&self, payload: Value) -> Result<Value, ActionError> {
    debug!(endpoint = %self.endpoint, "action_invocation_started");

    let response = self
      .client
      .post(self.endpoint.clone())
      .json(&payload)
      .send()
      .await
      .map_err(|e| ActionError::Invocation {
        message: e.to_string(),
      })?;

    let status = response.status();
    if !status.is_success() {
      return Err(ActionError::Invocation {
        message: format!("action responded with status {}", status),
      });
    }

    let body: Value = response
      .json()
      .await
      .map_err(|e| ActionError::MalformedResponse {
        message: format!("response body is not JSON: {}", e),
      })?;

    narrow_response(body)
  }
}
