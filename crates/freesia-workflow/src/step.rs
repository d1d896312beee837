//! The pipeline state machine.

use serde_json::{Value, json};

use crate::error::TransitionError;
use crate::status::ExecutionStatus;

/// A step of the orchestration state machine.
///
/// Each variant carries the data the remaining steps need, so an execution's
/// position is fully described by the step value itself. Drivers perform the
/// effect a step calls for, then apply the observed [`StepEvent`] with
/// [`advance`] to reach the next step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
  /// Execution accepted; nothing has run yet.
  Start { n: i64 },

  /// Submit the batch job with the input parameter.
  SubmitJob { n: i64 },

  /// Wait for the submitted run to reach a terminal status.
  AwaitJob { n: i64, run_id: String },

  /// Evaluate the branch condition against the job output.
  Decide { n: i64, output: Value },

  /// Condition held: invoke the downstream action with the context.
  Invoke { context: Value },

  /// Condition did not hold: pass the context through unchanged.
  Skip { context: Value },

  /// Terminal success carrying the final result.
  Done { result: Value },
}

/// An observation a driver feeds back into the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
  /// Execution bookkeeping is done; begin the pipeline.
  Started,

  /// The job system accepted the submission.
  JobSubmitted { run_id: String },

  /// The job run finished successfully with its output.
  JobSucceeded { output: Value },

  /// The condition evaluated without error.
  ConditionEvaluated { invoke: bool },

  /// The action returned its narrowed payload.
  ActionReturned { payload: Value },

  /// The skip branch completed (no side effect).
  PassedThrough,
}

impl Step {
  /// Step name, used in logs and transition errors.
  pub fn name(&self) -> &'static str {
    match self {
      Step::Start { .. } => "start",
      Step::SubmitJob { .. } => "submit_job",
      Step::AwaitJob { .. } => "await_job",
      Step::Decide { .. } => "decide",
      Step::Invoke { .. } => "invoke",
      Step::Skip { .. } => "skip",
      Step::Done { .. } => "done",
    }
  }

  /// The execution status an execution sitting in this step reports.
  pub fn status(&self) -> ExecutionStatus {
    match self {
      Step::Start { .. } | Step::SubmitJob { .. } => ExecutionStatus::Started,
      Step::AwaitJob { .. } => ExecutionStatus::JobRunning,
      Step::Decide { .. } => ExecutionStatus::Deciding,
      Step::Invoke { .. } => ExecutionStatus::Invoking,
      Step::Skip { .. } => ExecutionStatus::Skipping,
      Step::Done { .. } => ExecutionStatus::Succeeded,
    }
  }
}

impl StepEvent {
  /// Event name, used in logs and transition errors.
  pub fn name(&self) -> &'static str {
    match self {
      StepEvent::Started => "started",
      StepEvent::JobSubmitted { .. } => "job_submitted",
      StepEvent::JobSucceeded { .. } => "job_succeeded",
      StepEvent::ConditionEvaluated { .. } => "condition_evaluated",
      StepEvent::ActionReturned { .. } => "action_returned",
      StepEvent::PassedThrough => "passed_through",
    }
  }
}

/// Apply an event to a step, producing the next step.
///
/// This is the entire transition table of the pipeline:
///
/// ```text
/// Start → SubmitJob → AwaitJob → Decide → Invoke → Done
///                                       ↘  Skip  ↗
/// ```
///
/// Failures and timeouts are not events. A driver that observes one stops
/// advancing and records the terminal status itself; `advance` only
/// sequences the forward path. Applying an event outside the table is a
/// [`TransitionError`].
///
/// The `Decide` transition builds the execution context
/// `{"n": ..., "job": ...}` handed to whichever branch runs; the skip branch
/// passes that context through as the final result.
pub fn advance(step: Step, event: StepEvent) -> Result<Step, TransitionError> {
  match (step, event) {
    (Step::Start { n }, StepEvent::Started) => Ok(Step::SubmitJob { n }),

    (Step::SubmitJob { n }, StepEvent::JobSubmitted { run_id }) => {
      Ok(Step::AwaitJob { n, run_id })
    }

    (Step::AwaitJob { n, .. }, StepEvent::JobSucceeded { output }) => {
      Ok(Step::Decide { n, output })
    }

    (Step::Decide { n, output }, StepEvent::ConditionEvaluated { invoke }) => {
      let context = json!({ "n": n, "job": output });
      if invoke {
        Ok(Step::Invoke { context })
      } else {
        Ok(Step::Skip { context })
      }
    }

    (Step::Invoke { .. }, StepEvent::ActionReturned { payload }) => {
      Ok(Step::Done { result: payload })
    }

    (Step::Skip { context }, StepEvent::PassedThrough) => Ok(Step::Done { result: context }),

    (step, event) => Err(TransitionError {
      step: step.name(),
      event: event.name(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn walks_the_invoke_path() {
    let step = Step::Start { n: 4 };

    let step = advance(step, StepEvent::Started).expect("start");
    assert_eq!(step, Step::SubmitJob { n: 4 });

    let step = advance(
      step,
      StepEvent::JobSubmitted {
        run_id: "run-1".to_string(),
      },
    )
    .expect("submit");
    assert_eq!(
      step,
      Step::AwaitJob {
        n: 4,
        run_id: "run-1".to_string(),
      }
    );

    let step = advance(
      step,
      StepEvent::JobSucceeded {
        output: json!({ "n": 4 }),
      },
    )
    .expect("await");
    assert_eq!(
      step,
      Step::Decide {
        n: 4,
        output: json!({ "n": 4 }),
      }
    );

    let step = advance(step, StepEvent::ConditionEvaluated { invoke: true }).expect("decide");
    assert_eq!(
      step,
      Step::Invoke {
        context: json!({ "n": 4, "job": { "n": 4 } }),
      }
    );

    let step = advance(
      step,
      StepEvent::ActionReturned {
        payload: json!("hi"),
      },
    )
    .expect("invoke");
    assert_eq!(step, Step::Done { result: json!("hi") });
  }

  #[test]
  fn walks_the_skip_path() {
    let step = Step::Decide {
      n: 5,
      output: json!({ "n": 5 }),
    };

    let step = advance(step, StepEvent::ConditionEvaluated { invoke: false }).expect("decide");
    let expected_context = json!({ "n": 5, "job": { "n": 5 } });
    assert_eq!(
      step,
      Step::Skip {
        context: expected_context.clone(),
      }
    );

    // Pass-through: the final result is the unmodified context.
    let step = advance(step, StepEvent::PassedThrough).expect("skip");
    assert_eq!(
      step,
      Step::Done {
        result: expected_context,
      }
    );
  }

  #[test]
  fn rejects_events_outside_the_table() {
    let result = advance(
      Step::Start { n: 1 },
      StepEvent::JobSucceeded { output: json!({}) },
    );
    let err = result.expect_err("start does not accept job_succeeded");
    assert_eq!(err.step, "start");
    assert_eq!(err.event, "job_succeeded");

    let result = advance(Step::SubmitJob { n: 1 }, StepEvent::Started);
    assert!(result.is_err());

    let result = advance(
      Step::Skip {
        context: json!({}),
      },
      StepEvent::ActionReturned { payload: json!({}) },
    );
    assert!(result.is_err());
  }

  #[test]
  fn done_is_terminal() {
    let done = Step::Done { result: json!("x") };

    let result = advance(done.clone(), StepEvent::Started);
    assert!(result.is_err());

    let result = advance(done, StepEvent::PassedThrough);
    assert!(result.is_err());
  }

  #[test]
  fn steps_report_their_status() {
    assert_eq!(Step::Start { n: 0 }.status(), ExecutionStatus::Started);
    assert_eq!(Step::SubmitJob { n: 0 }.status(), ExecutionStatus::Started);
    assert_eq!(
      Step::AwaitJob {
        n: 0,
        run_id: "r".to_string(),
      }
      .status(),
      ExecutionStatus::JobRunning
    );
    assert_eq!(
      Step::Decide {
        n: 0,
        output: json!({}),
      }
      .status(),
      ExecutionStatus::Deciding
    );
    assert_eq!(
      Step::Invoke {
        context: json!({}),
      }
      .status(),
      ExecutionStatus::Invoking
    );
    assert_eq!(
      Step::Skip {
        context: json!({}),
      }
      .status(),
      ExecutionStatus::Skipping
    );
    assert_eq!(
      Step::Done { result: json!({}) }.status(),
      ExecutionStatus::Succeeded
    );
  }
}
