use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_TIMEOUT_MS: u64 = 10 * 60 * 1000;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Overall per-execution deadline in milliseconds.
  pub timeout_ms: u64,

  /// The batch job every execution submits.
  pub job: JobConfig,

  /// The downstream action the invoke branch calls.
  pub action: ActionConfig,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      timeout_ms: DEFAULT_TIMEOUT_MS,
      job: JobConfig::default(),
      action: ActionConfig::default(),
    }
  }
}

impl PipelineConfig {
  /// The per-execution deadline as a [`Duration`].
  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

/// Configuration of the batch job submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
  /// Job name as registered with the job system.
  pub name: String,

  /// Optional version pin for the job.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,

  /// Arguments merged into every submission alongside the input parameter.
  #[serde(skip_serializing_if = "Map::is_empty")]
  pub default_arguments: Map<String, Value>,
}

impl Default for JobConfig {
  fn default() -> Self {
    Self {
      name: "echo".to_string(),
      version: None,
      default_arguments: Map::new(),
    }
  }
}

/// Configuration of the downstream action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
  /// HTTP endpoint action payloads are POSTed to. When unset, the
  /// in-process demo action is used instead.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub endpoint: Option<String>,
}
