//! In-process job system.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::JobError;
use crate::runner::JobRunner;
use crate::types::{JobRequest, JobRun, JobRunHandle, JobStatus};

/// A job implementation the local runner can execute.
///
/// Stands in for the work an external batch system would do. Failures are
/// reported as opaque messages, the way an external system reports them.
#[async_trait]
pub trait Job: Send + Sync {
  /// Run the job with the submitted arguments.
  async fn run(&self, arguments: &Map<String, Value>) -> Result<Value, String>;
}

struct RunEntry {
  watch: watch::Receiver<JobRun>,
  cancel: CancellationToken,
}

/// An in-process job system.
///
/// Each submission spawns a worker task that drives the run through
/// `Queued → Running → Succeeded|Failed` and publishes every transition on
/// the run's watch channel, so completion waits are event-driven.
/// Cancellation races the worker against a per-run token; a cancelled run
/// ends `Failed` with a cancellation message. Run entries are retained for
/// the runner's lifetime so handles stay resolvable.
pub struct LocalJobRunner {
  jobs: HashMap<String, Arc<dyn Job>>,
  runs: Arc<RwLock<HashMap<String, RunEntry>>>,
}

impl LocalJobRunner {
  pub fn new() -> Self {
    Self {
      jobs: HashMap::new(),
      runs: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  /// Register a job implementation under a name.
  pub fn register(mut self, name: impl Into<String>, job: Arc<dyn Job>) -> Self {
    self.jobs.insert(name.into(), job);
    self
  }

  /// Snapshot of a run's current record.
  pub fn run_status(&self, handle: &JobRunHandle) -> Result<JobRun, JobError> {
    let runs = self.runs.read().unwrap();
    let entry = runs.get(&handle.run_id).ok_or_else(|| JobError::RunNotFound {
      run_id: handle.run_id.clone(),
    })?;
    Ok(entry.watch.borrow().clone())
  }
}

impl Default for LocalJobRunner {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl JobRunner for LocalJobRunner {
  async fn submit(&self, request: JobRequest) -> Result<JobRunHandle, JobError> {
    let job = self
      .jobs
      .get(&request.name)
      .cloned()
      .ok_or_else(|| JobError::Submission {
        message: format!("unknown job '{}'", request.name),
      })?;

    let run_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = watch::channel(JobRun {
      run_id: run_id.clone(),
      status: JobStatus::Queued,
      output: None,
      error: None,
    });
    let cancel = CancellationToken::new();

    {
      let mut runs = self.runs.write().unwrap();
      runs.insert(
        run_id.clone(),
        RunEntry {
          watch: rx,
          cancel: cancel.clone(),
        },
      );
    }

    info!(run_id = %run_id, job = %request.name, "job_run_submitted");

    let worker_run_id = run_id.clone();
    tokio::spawn(async move {
      tx.send_modify(|run| run.status = JobStatus::Running);

      let outcome = tokio::select! {
        outcome = job.run(&request.arguments) => outcome,
        _ = cancel.cancelled() => {
          warn!(run_id = %worker_run_id, "job_run_cancelled");
          tx.send_modify(|run| {
            run.status = JobStatus::Failed;
            run.error = Some("job run cancelled".to_string());
          });
          return;
        }
      };

      match outcome {
        Ok(output) => {
          info!(run_id = %worker_run_id, "job_run_succeeded");
          tx.send_modify(|run| {
            run.status = JobStatus::Succeeded;
            run.output = Some(output);
          });
        }
        Err(message) => {
          warn!(run_id = %worker_run_id, error = %message, "job_run_failed");
          tx.send_modify(|run| {
            run.status = JobStatus::Failed;
            run.error = Some(message);
          });
        }
      }
    });

    Ok(JobRunHandle { run_id })
  }

  async fn await_completion(
    &self,
    handle: &JobRunHandle,
    deadline: Instant,
  ) -> Result<JobRun, JobError> {
    let mut rx = {
      let runs = self.runs.read().unwrap();
      let entry = runs.get(&handle.run_id).ok_or_else(|| JobError::RunNotFound {
        run_id: handle.run_id.clone(),
      })?;
      entry.watch.clone()
    };

    let wait = rx.wait_for(|run| run.status.is_terminal());
    match tokio::time::timeout_at(deadline, wait).await {
      Ok(Ok(terminal)) => Ok(terminal.clone()),
      Ok(Err(_)) => Err(JobError::Internal {
        message: format!(
          "worker for job run '{}' exited without reporting a result",
          handle.run_id
        ),
      }),
      Err(_) => Err(JobError::DeadlineElapsed {
        run_id: handle.run_id.clone(),
      }),
    }
  }

  async fn cancel(&self, handle: &JobRunHandle) -> Result<(), JobError> {
    let cancel = {
      let runs = self.runs.read().unwrap();
      let entry = runs.get(&handle.run_id).ok_or_else(|| JobError::RunNotFound {
        run_id: handle.run_id.clone(),
      })?;
      entry.cancel.clone()
    };

    info!(run_id = %handle.run_id, "job_cancellation_requested");
    cancel.cancel();
    Ok(())
  }
}
