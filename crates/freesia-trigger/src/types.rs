use serde::{Deserialize, Serialize};

/// Status reported in a trigger acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStatus {
  Accepted,
}

/// Synchronous acknowledgement returned to the trigger caller.
///
/// Says nothing about the outcome: the execution runs in the background
/// after this response is produced, and callers observe its progress
/// through the execution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
  pub execution_id: String,
  pub status: TriggerStatus,
}
