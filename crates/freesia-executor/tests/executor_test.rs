//! Integration tests for the workflow executor.
//!
//! Each test drives a full execution through real adapters: the in-process
//! job system, a counting action invoker, and the in-memory store. The
//! channel notifier captures the event trail so tests can assert which
//! steps actually ran.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use freesia_action::{ActionError, ActionInvoker, narrow_response};
use freesia_config::{JobConfig, PipelineConfig};
use freesia_executor::{ChannelNotifier, ExecutionEvent, ExecutorError, WorkflowExecutor};
use freesia_job::{EchoJob, Job, JobRunHandle, JobRunner, JobStatus, LocalJobRunner};
use freesia_store::{ExecutionRecord, MemoryStore, Store};
use freesia_workflow::{ExecutionStatus, InvocationRequest};
use serde_json::{Map, Value, json};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Job that never reaches a terminal status.
struct NeverJob;

#[async_trait]
impl Job for NeverJob {
  async fn run(&self, _arguments: &Map<String, Value>) -> Result<Value, String> {
    std::future::pending().await
  }
}

/// Job whose run always fails.
struct FailJob;

#[async_trait]
impl Job for FailJob {
  async fn run(&self, _arguments: &Map<String, Value>) -> Result<Value, String> {
    Err("boom".to_string())
  }
}

/// Job whose output carries the condition override field.
struct OverrideJob;

#[async_trait]
impl Job for OverrideJob {
  async fn run(&self, _arguments: &Map<String, Value>) -> Result<Value, String> {
    Ok(json!({ "invoke": true }))
  }
}

/// Job that echoes back a different number than it was given.
struct MismatchJob;

#[async_trait]
impl Job for MismatchJob {
  async fn run(&self, arguments: &Map<String, Value>) -> Result<Value, String> {
    let n = arguments.get("n").and_then(Value::as_i64).unwrap_or(0);
    Ok(json!({ "n": n + 1 }))
  }
}

/// Job whose output is not an object at all.
struct GarbledJob;

#[async_trait]
impl Job for GarbledJob {
  async fn run(&self, _arguments: &Map<String, Value>) -> Result<Value, String> {
    Ok(json!("done"))
  }
}

/// Action invoker that counts calls and returns a fixed greeting.
struct CountingAction {
  calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ActionInvoker for CountingAction {
  async fn invoke(&self, _payload: Value) -> Result<Value, ActionError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    narrow_response(json!({ "payload": "hi" }))
  }
}

/// Action invoker that always refuses.
struct FailingAction;

#[async_trait]
impl ActionInvoker for FailingAction {
  async fn invoke(&self, _payload: Value) -> Result<Value, ActionError> {
    Err(ActionError::Invocation {
      message: "downstream refused".to_string(),
    })
  }
}

/// Action invoker that takes longer than any execution deadline.
struct SlowAction;

#[async_trait]
impl ActionInvoker for SlowAction {
  async fn invoke(&self, _payload: Value) -> Result<Value, ActionError> {
    tokio::time::sleep(Duration::from_secs(3600)).await;
    narrow_response(json!({ "payload": "late" }))
  }
}

struct Harness {
  executor: WorkflowExecutor<ChannelNotifier>,
  runner: Arc<LocalJobRunner>,
  store: Arc<MemoryStore>,
  calls: Arc<AtomicUsize>,
  events: mpsc::UnboundedReceiver<ExecutionEvent>,
}

fn create_runner() -> Arc<LocalJobRunner> {
  Arc::new(
    LocalJobRunner::new()
      .register("echo", Arc::new(EchoJob))
      .register("never", Arc::new(NeverJob))
      .register("fail", Arc::new(FailJob))
      .register("override", Arc::new(OverrideJob))
      .register("mismatch", Arc::new(MismatchJob))
      .register("garbled", Arc::new(GarbledJob)),
  )
}

fn create_harness(job_name: &str) -> Harness {
  let calls = Arc::new(AtomicUsize::new(0));
  let action = Arc::new(CountingAction {
    calls: Arc::clone(&calls),
  });
  create_harness_with_action(job_name, action, calls)
}

fn create_harness_with_action(
  job_name: &str,
  action: Arc<dyn ActionInvoker>,
  calls: Arc<AtomicUsize>,
) -> Harness {
  let config = PipelineConfig {
    job: JobConfig {
      name: job_name.to_string(),
      ..JobConfig::default()
    },
    ..PipelineConfig::default()
  };
  let runner = create_runner();
  let store = Arc::new(MemoryStore::new());
  let (notifier, events) = ChannelNotifier::new();

  let executor = WorkflowExecutor::with_notifier(
    config,
    Arc::clone(&runner) as Arc<dyn JobRunner>,
    action,
    Arc::clone(&store) as Arc<dyn Store>,
    notifier,
  );

  Harness {
    executor,
    runner,
    store,
    calls,
    events,
  }
}

/// Create the record, dispatch the execution, and drive it to its terminal
/// record.
async fn run_execution(
  harness: &Harness,
  execution_id: &str,
  n: i64,
  cancel: CancellationToken,
) -> ExecutionRecord {
  let request = InvocationRequest { n };
  let record = ExecutionRecord::new(execution_id, request);
  harness
    .store
    .create_execution(&record)
    .await
    .expect("create execution record");

  harness
    .executor
    .execute(execution_id, request, cancel)
    .wait()
    .await
    .expect("drive execution")
}

fn drain_events(harness: &mut Harness) -> Vec<ExecutionEvent> {
  let mut events = Vec::new();
  while let Ok(event) = harness.events.try_recv() {
    events.push(event);
  }
  events
}

fn event_names(events: &[ExecutionEvent]) -> Vec<&'static str> {
  events
    .iter()
    .map(|event| match event {
      ExecutionEvent::ExecutionStarted { .. } => "execution_started",
      ExecutionEvent::JobSubmitted { .. } => "job_submitted",
      ExecutionEvent::JobCompleted { .. } => "job_completed",
      ExecutionEvent::JobCancellationIssued { .. } => "job_cancellation_issued",
      ExecutionEvent::ConditionEvaluated { .. } => "condition_evaluated",
      ExecutionEvent::ActionInvoked { .. } => "action_invoked",
      ExecutionEvent::ActionSkipped { .. } => "action_skipped",
      ExecutionEvent::ExecutionSucceeded { .. } => "execution_succeeded",
      ExecutionEvent::ExecutionFailed { .. } => "execution_failed",
      ExecutionEvent::ExecutionTimedOut { .. } => "execution_timed_out",
    })
    .collect()
}

#[tokio::test]
async fn even_input_invokes_the_action() {
  let mut harness = create_harness("echo");

  let record = run_execution(&harness, "exec-even", 4, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::Succeeded);
  assert_eq!(record.result, Some(json!("hi")));
  assert!(record.error.is_none());
  assert!(record.completed_at.is_some());
  assert_eq!(harness.calls.load(Ordering::SeqCst), 1);

  let events = drain_events(&mut harness);
  assert_eq!(
    event_names(&events),
    vec![
      "execution_started",
      "job_submitted",
      "job_completed",
      "condition_evaluated",
      "action_invoked",
      "execution_succeeded",
    ]
  );
}

#[tokio::test]
async fn odd_input_passes_the_context_through() {
  let mut harness = create_harness("echo");

  let record = run_execution(&harness, "exec-odd", 5, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::Succeeded);
  assert_eq!(record.result, Some(json!({ "n": 5, "job": { "n": 5 } })));
  assert_eq!(harness.calls.load(Ordering::SeqCst), 0);

  let events = drain_events(&mut harness);
  assert!(
    events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::ActionSkipped { .. }))
  );
  assert!(
    !events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::ActionInvoked { .. }))
  );
}

#[tokio::test]
async fn unknown_job_fails_the_execution_immediately() {
  let mut harness = create_harness("not-registered");

  let record = run_execution(&harness, "exec-reject", 4, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::Failed);
  assert!(record.result.is_none());
  assert!(record.completed_at.is_some());

  let error = record.error.expect("record should carry the failure");
  assert!(
    error.contains("job submission failed"),
    "unexpected error: {error}"
  );
  assert!(error.contains("not-registered"), "unexpected error: {error}");

  // Submission never happened, so neither did anything downstream of it.
  assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
  let events = drain_events(&mut harness);
  assert!(
    !events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::JobSubmitted { .. }))
  );
  assert!(
    !events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::ConditionEvaluated { .. }))
  );
}

#[tokio::test]
async fn failed_job_run_fails_the_execution() {
  let mut harness = create_harness("fail");

  let record = run_execution(&harness, "exec-fail", 4, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::Failed);
  let error = record.error.expect("record should carry the failure");
  assert!(error.contains("job run failed"), "unexpected error: {error}");
  assert!(error.contains("boom"), "unexpected error: {error}");

  assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
  let events = drain_events(&mut harness);
  assert!(
    !events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::ConditionEvaluated { .. }))
  );
}

#[tokio::test(start_paused = true)]
async fn timed_out_execution_cancels_the_outstanding_run() {
  let mut harness = create_harness("never");

  let record = run_execution(&harness, "exec-stuck", 4, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::TimedOut);
  assert_eq!(record.error.as_deref(), Some("execution deadline elapsed"));
  assert!(record.result.is_none());
  assert_eq!(harness.calls.load(Ordering::SeqCst), 0);

  let events = drain_events(&mut harness);
  assert!(
    events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::JobCancellationIssued { .. }))
  );
  assert!(
    events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::ExecutionTimedOut { .. }))
  );

  // The record went terminal without waiting on the job system, but the
  // cancellation does reach the run.
  let run_id = events
    .iter()
    .find_map(|event| match event {
      ExecutionEvent::JobSubmitted { run_id, .. } => Some(run_id.clone()),
      _ => None,
    })
    .expect("run should have been submitted");
  let handle = JobRunHandle { run_id };
  let run = harness
    .runner
    .await_completion(&handle, Instant::now() + Duration::from_secs(5))
    .await
    .expect("cancelled run should reach a terminal status");
  assert_eq!(run.status, JobStatus::Failed);
  assert_eq!(run.error.as_deref(), Some("job run cancelled"));
}

#[tokio::test]
async fn malformed_job_output_is_a_condition_failure() {
  let mut harness = create_harness("garbled");

  let record = run_execution(&harness, "exec-garbled", 4, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::Failed);
  let error = record.error.expect("record should carry the failure");
  assert!(
    error.contains("condition evaluation failed"),
    "unexpected error: {error}"
  );
  assert_eq!(harness.calls.load(Ordering::SeqCst), 0);

  let events = drain_events(&mut harness);
  assert!(
    !events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::ConditionEvaluated { .. }))
  );
}

#[tokio::test]
async fn mismatched_echo_is_a_condition_failure() {
  let harness = create_harness("mismatch");

  let record = run_execution(&harness, "exec-mismatch", 4, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::Failed);
  let error = record.error.expect("record should carry the failure");
  assert!(error.contains("echoed"), "unexpected error: {error}");
  assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn job_output_can_force_the_invoke_branch() {
  let harness = create_harness("override");

  // 5 is odd, so parity alone would skip; the job output overrides it.
  let record = run_execution(&harness, "exec-override", 5, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::Succeeded);
  assert_eq!(record.result, Some(json!("hi")));
  assert_eq!(harness.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn action_failure_fails_the_execution() {
  let calls = Arc::new(AtomicUsize::new(0));
  let mut harness = create_harness_with_action("echo", Arc::new(FailingAction), calls);

  let record = run_execution(&harness, "exec-refused", 4, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::Failed);
  assert!(record.result.is_none());
  let error = record.error.expect("record should carry the failure");
  assert!(
    error.contains("action invocation failed"),
    "unexpected error: {error}"
  );
  assert!(
    error.contains("downstream refused"),
    "unexpected error: {error}"
  );

  let events = drain_events(&mut harness);
  assert!(
    !events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::ActionInvoked { .. }))
  );
}

#[tokio::test(start_paused = true)]
async fn slow_action_hits_the_execution_deadline() {
  let calls = Arc::new(AtomicUsize::new(0));
  let mut harness = create_harness_with_action("echo", Arc::new(SlowAction), calls);

  let record = run_execution(&harness, "exec-slow", 4, CancellationToken::new()).await;

  assert_eq!(record.status, ExecutionStatus::TimedOut);
  assert_eq!(record.error.as_deref(), Some("execution deadline elapsed"));

  // The job already finished; there was no outstanding run to cancel.
  let events = drain_events(&mut harness);
  assert!(
    events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::JobCompleted { .. }))
  );
  assert!(
    !events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::JobCancellationIssued { .. }))
  );
}

#[tokio::test]
async fn pre_cancelled_execution_never_submits() {
  let mut harness = create_harness("echo");
  let cancel = CancellationToken::new();
  cancel.cancel();

  let record = run_execution(&harness, "exec-cancelled", 4, cancel).await;

  assert_eq!(record.status, ExecutionStatus::Failed);
  assert_eq!(record.error.as_deref(), Some("execution cancelled"));
  assert_eq!(harness.calls.load(Ordering::SeqCst), 0);

  let events = drain_events(&mut harness);
  assert!(
    !events
      .iter()
      .any(|e| matches!(e, ExecutionEvent::JobSubmitted { .. }))
  );
}

#[tokio::test]
async fn missing_record_surfaces_a_store_error() {
  let harness = create_harness("echo");

  let outcome = harness
    .executor
    .execute("exec-ghost", InvocationRequest { n: 4 }, CancellationToken::new())
    .wait()
    .await;

  assert!(matches!(outcome, Err(ExecutorError::Store { .. })));
}

#[tokio::test]
async fn concurrent_executions_are_isolated() {
  let harness = create_harness("echo");

  for (execution_id, n) in [("exec-a", 4), ("exec-b", 5)] {
    let record = ExecutionRecord::new(execution_id, InvocationRequest { n });
    harness
      .store
      .create_execution(&record)
      .await
      .expect("create execution record");
  }

  let even = harness
    .executor
    .execute("exec-a", InvocationRequest { n: 4 }, CancellationToken::new());
  let odd = harness
    .executor
    .execute("exec-b", InvocationRequest { n: 5 }, CancellationToken::new());

  let (even, odd) = tokio::join!(tokio::spawn(even.wait()), tokio::spawn(odd.wait()));
  let even = even.expect("join even execution").expect("drive even execution");
  let odd = odd.expect("join odd execution").expect("drive odd execution");

  assert_eq!(even.status, ExecutionStatus::Succeeded);
  assert_eq!(even.result, Some(json!("hi")));
  assert_eq!(odd.status, ExecutionStatus::Succeeded);
  assert_eq!(odd.result, Some(json!({ "n": 5, "job": { "n": 5 } })));

  let records = harness.store.list_executions().await.expect("list executions");
  assert_eq!(records.len(), 2);
}
