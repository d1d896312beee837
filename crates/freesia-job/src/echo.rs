use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::local::Job;

/// The demo batch job: echoes the numeric argument it was submitted with.
///
/// The run's output carries the same `n` the submission carried, which the
/// branch condition then reads back. A submission without a usable integer
/// `n` argument is a run failure, not a crash.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoJob;

#[async_trait]
impl Job for EchoJob {
  async fn run(&self, arguments: &Map<String, Value>) -> Result<Value, String> {
    let n = arguments
      .get("n")
      .and_then(Value::as_i64)
      .ok_or_else(|| "missing integer argument 'n'".to_string())?;

    info!(n, "echo_job_ran");
    Ok(json!({ "n": n }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn echoes_its_argument() {
    let mut arguments = Map::new();
    arguments.insert("n".to_string(), json!(4));

    let output = EchoJob.run(&arguments).await.expect("runs");
    assert_eq!(output, json!({ "n": 4 }));
  }

  #[tokio::test]
  async fn missing_argument_is_a_run_failure() {
    let arguments = Map::new();

    let error = EchoJob.run(&arguments).await.expect_err("fails");
    assert!(error.contains("'n'"));
  }

  #[tokio::test]
  async fn non_integer_argument_is_a_run_failure() {
    let mut arguments = Map::new();
    arguments.insert("n".to_string(), json!("four"));

    let result = EchoJob.run(&arguments).await;
    assert!(result.is_err());
  }
}
