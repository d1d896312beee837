//! A dispatched workflow execution.

use std::sync::Arc;

use chrono::Utc;
use freesia_action::ActionInvoker;
use freesia_config::PipelineConfig;
use freesia_job::{JobError, JobRequest, JobRunHandle, JobRunner, JobStatus};
use freesia_store::{ExecutionRecord, Store};
use freesia_workflow::{
  ExecutionStatus, InvocationRequest, Step, StepEvent, advance, should_invoke,
};
use serde_json::{Value, json};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::ExecutorError;
use crate::events::{ExecutionEvent, ExecutionNotifier};

/// An owned handle to a single dispatched execution.
///
/// The handle carries everything the run needs, so it can be awaited in
/// place or spawned onto the runtime and driven in the background. Dropping
/// the handle without calling [`wait`](WorkflowExecution::wait) abandons the
/// execution: nothing runs until `wait` is polled.
pub struct WorkflowExecution<N> {
  config: PipelineConfig,
  job_runner: Arc<dyn JobRunner>,
  action_invoker: Arc<dyn ActionInvoker>,
  store: Arc<dyn Store>,
  notifier: N,
  execution_id: String,
  request: InvocationRequest,
  cancel: CancellationToken,
}

impl<N: ExecutionNotifier> WorkflowExecution<N> {
  #[allow(clippy::too_many_arguments)]
  pub(crate) fn new(
    config: PipelineConfig,
    job_runner: Arc<dyn JobRunner>,
    action_invoker: Arc<dyn ActionInvoker>,
    store: Arc<dyn Store>,
    notifier: N,
    execution_id: String,
    request: InvocationRequest,
    cancel: CancellationToken,
  ) -> Self {
    Self {
      config,
      job_runner,
      action_invoker,
      store,
      notifier,
      execution_id,
      request,
      cancel,
    }
  }

  /// The id of the execution this handle drives.
  pub fn execution_id(&self) -> &str {
    &self.execution_id
  }

  /// Drive the execution until its record is terminal.
  ///
  /// Workflow outcomes are not errors here: a failed or timed-out run
  /// completes its record and returns it as `Ok`. The only `Err` this
  /// method produces is [`ExecutorError::Store`], when the record itself
  /// cannot be read or written.
  #[instrument(
    name = "workflow_execution",
    skip(self),
    fields(execution_id = %self.execution_id, n = self.request.n)
  )]
  pub async fn wait(self) -> Result<ExecutionRecord, ExecutorError> {
    info!("workflow_started");
    self.notifier.notify(ExecutionEvent::ExecutionStarted {
      execution_id: self.execution_id.clone(),
      n: self.request.n,
    });

    let deadline = Instant::now() + self.config.timeout();
    let outcome = match self.drive(deadline).await {
      Err(ExecutorError::Store { source }) => {
        error!(error = %source, "workflow_store_failed");
        return Err(ExecutorError::Store { source });
      }
      outcome => outcome,
    };

    let completed_at = Utc::now();
    let (status, result, error) = match outcome {
      Ok(result) => {
        info!("workflow_completed");
        self.notifier.notify(ExecutionEvent::ExecutionSucceeded {
          execution_id: self.execution_id.clone(),
          result: result.clone(),
        });
        (ExecutionStatus::Succeeded, Some(result), None)
      }
      Err(ExecutorError::DeadlineElapsed) => {
        warn!("workflow_timed_out");
        self.notifier.notify(ExecutionEvent::ExecutionTimedOut {
          execution_id: self.execution_id.clone(),
        });
        let message = ExecutorError::DeadlineElapsed.to_string();
        (ExecutionStatus::TimedOut, None, Some(message))
      }
      Err(e) => {
        let message = e.to_string();
        error!(error = %message, "workflow_failed");
        self.notifier.notify(ExecutionEvent::ExecutionFailed {
          execution_id: self.execution_id.clone(),
          error: message.clone(),
        });
        (ExecutionStatus::Failed, None, Some(message))
      }
    };

    self
      .store
      .complete_execution(&self.execution_id, status, result, error, completed_at)
      .await
      .map_err(|e| ExecutorError::Store { source: e })?;

    self
      .store
      .get_execution(&self.execution_id)
      .await
      .map_err(|e| ExecutorError::Store { source: e })
  }

  /// Run the step machine until `Done` or the first error.
  ///
  /// Every transition goes through [`advance`]; this loop only performs the
  /// side effects each step calls for and records status changes as they
  /// happen. Terminal statuses are written by `wait`, not here.
  async fn drive(&self, deadline: Instant) -> Result<Value, ExecutorError> {
    let mut step = Step::Start { n: self.request.n };
    let mut status = ExecutionStatus::Started;

    loop {
      if self.cancel.is_cancelled() {
        warn!("workflow_cancelled");
        return Err(ExecutorError::Cancelled);
      }

      let event = match &step {
        Step::Start { .. } => StepEvent::Started,

        Step::SubmitJob { n } => {
          let handle = self.submit_job(*n).await?;
          StepEvent::JobSubmitted {
            run_id: handle.run_id,
          }
        }

        Step::AwaitJob { run_id, .. } => {
          let output = self.await_job(run_id, deadline).await?;
          StepEvent::JobSucceeded { output }
        }

        Step::Decide { n, output } => {
          let invoke = should_invoke(*n, output)
            .map_err(|e| ExecutorError::ConditionEvaluation { source: e })?;
          info!(invoke, "condition_evaluated");
          self.notifier.notify(ExecutionEvent::ConditionEvaluated {
            execution_id: self.execution_id.clone(),
            invoke,
          });
          StepEvent::ConditionEvaluated { invoke }
        }

        Step::Invoke { context } => {
          let payload = self.invoke_action(context.clone(), deadline).await?;
          StepEvent::ActionReturned { payload }
        }

        Step::Skip { .. } => {
          info!("action_skipped");
          self.notifier.notify(ExecutionEvent::ActionSkipped {
            execution_id: self.execution_id.clone(),
          });
          StepEvent::PassedThrough
        }

        Step::Done { result } => return Ok(result.clone()),
      };

      step = advance(step, event).map_err(|e| ExecutorError::Transition { source: e })?;

      let next_status = step.status();
      if next_status != status && !next_status.is_terminal() {
        self
          .store
          .update_execution_status(&self.execution_id, next_status)
          .await
          .map_err(|e| ExecutorError::Store { source: e })?;
        status = next_status;
      }
    }
  }

  async fn submit_job(&self, n: i64) -> Result<JobRunHandle, ExecutorError> {
    let mut arguments = self.config.job.default_arguments.clone();
    arguments.insert("n".to_string(), json!(n));

    let request = JobRequest {
      name: self.config.job.name.clone(),
      version: self.config.job.version.clone(),
      arguments,
    };

    let handle = self
      .job_runner
      .submit(request)
      .await
      .map_err(|e| ExecutorError::JobSubmission { source: e })?;

    info!(run_id = %handle.run_id, job = %self.config.job.name, "job_submitted");
    self.notifier.notify(ExecutionEvent::JobSubmitted {
      execution_id: self.execution_id.clone(),
      run_id: handle.run_id.clone(),
    });

    Ok(handle)
  }

  async fn await_job(&self, run_id: &str, deadline: Instant) -> Result<Value, ExecutorError> {
    let handle = JobRunHandle {
      run_id: run_id.to_string(),
    };

    let waited = tokio::select! {
      waited = self.job_runner.await_completion(&handle, deadline) => waited,
      _ = self.cancel.cancelled() => {
        warn!(run_id = %handle.run_id, "workflow_cancelled");
        self.issue_cancellation(&handle);
        return Err(ExecutorError::Cancelled);
      }
    };

    let run = match waited {
      Ok(run) => run,
      Err(JobError::DeadlineElapsed { .. }) => {
        self.issue_cancellation(&handle);
        return Err(ExecutorError::DeadlineElapsed);
      }
      Err(e) => {
        return Err(ExecutorError::JobExecution {
          message: e.to_string(),
        });
      }
    };

    if run.status != JobStatus::Succeeded {
      let message = run
        .error
        .unwrap_or_else(|| format!("job run '{}' ended without an error message", run.run_id));
      return Err(ExecutorError::JobExecution { message });
    }

    let output = run.output.unwrap_or(Value::Null);
    info!(run_id = %run.run_id, "job_completed");
    self.notifier.notify(ExecutionEvent::JobCompleted {
      execution_id: self.execution_id.clone(),
      run_id: run.run_id,
      output: output.clone(),
    });

    Ok(output)
  }

  async fn invoke_action(&self, context: Value, deadline: Instant) -> Result<Value, ExecutorError> {
    let invocation = tokio::time::timeout_at(deadline, self.action_invoker.invoke(context));

    let invoked = tokio::select! {
      invoked = invocation => invoked,
      _ = self.cancel.cancelled() => {
        warn!("workflow_cancelled");
        return Err(ExecutorError::Cancelled);
      }
    };

    let payload = match invoked {
      Ok(Ok(payload)) => payload,
      Ok(Err(e)) => return Err(ExecutorError::ActionInvocation { source: e }),
      Err(_) => return Err(ExecutorError::DeadlineElapsed),
    };

    info!("action_invoked");
    self.notifier.notify(ExecutionEvent::ActionInvoked {
      execution_id: self.execution_id.clone(),
      result: payload.clone(),
    });

    Ok(payload)
  }

  /// Issue best-effort cancellation for an outstanding run.
  ///
  /// The request is spawned and never awaited: the execution's terminal
  /// status must not wait on the job system. The run may still finish
  /// out-of-band; whatever it produces is discarded because the record is
  /// terminal before any result could be reported.
  fn issue_cancellation(&self, handle: &JobRunHandle) {
    warn!(run_id = %handle.run_id, "job_cancellation_issued");
    self.notifier.notify(ExecutionEvent::JobCancellationIssued {
      execution_id: self.execution_id.clone(),
      run_id: handle.run_id.clone(),
    });

    let runner = Arc::clone(&self.job_runner);
    let handle = handle.clone();
    let execution_id = self.execution_id.clone();
    tokio::spawn(async move {
      if let Err(e) = runner.cancel(&handle).await {
        warn!(
          execution_id = %execution_id,
          run_id = %handle.run_id,
          error = %e,
          "job_cancellation_failed"
        );
      }
    });
  }
}
