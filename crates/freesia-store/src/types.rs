use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use freesia_workflow::{ExecutionStatus, InvocationRequest};

/// A workflow execution as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
  pub execution_id: String,
  pub input: InvocationRequest,
  pub status: ExecutionStatus,
  pub started_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
  pub result: Option<serde_json::Value>,
  pub error: Option<String>,
}

impl ExecutionRecord {
  /// A fresh record in the `Started` status.
  pub fn new(execution_id: impl Into<String>, input: InvocationRequest) -> Self {
    Self {
      execution_id: execution_id.into(),
      input,
      status: ExecutionStatus::Started,
      started_at: Utc::now(),
      completed_at: None,
      result: None,
      error: None,
    }
  }
}
