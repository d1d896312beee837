use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A job submission request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
  /// Name of the job to run.
  pub name: String,

  /// Optional version pin.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,

  /// Job arguments. The pipeline always includes the key `n`.
  pub arguments: Map<String, Value>,
}

/// Opaque reference to a submitted run.
///
/// Handles are owned by the execution that submitted the run and are never
/// shared across executions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRunHandle {
  pub run_id: String,
}

/// Lifecycle status of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
  Queued,
  Running,
  Succeeded,
  Failed,
}

impl JobStatus {
  /// Whether the run has finished, successfully or not.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Succeeded | Self::Failed)
  }
}

/// A job run record as reported by the job system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
  pub run_id: String,
  pub status: JobStatus,
  pub output: Option<Value>,
  pub error: Option<String>,
}
