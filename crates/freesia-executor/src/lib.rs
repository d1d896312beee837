//! Freesia Executor
//!
//! Drives an execution through the pipeline's step machine: submit the
//! background job, await its terminal status under the execution deadline,
//! evaluate the branch condition, then either invoke the downstream action
//! or pass the context through unchanged. Every run ends in a terminal
//! record (`Succeeded`, `Failed`, or `TimedOut`) written to the store.
//!
//! The executor talks to the outside world only through the `JobRunner`,
//! `ActionInvoker`, and `Store` traits, so adapters can be swapped without
//! touching the drive loop.

mod error;
mod events;
mod execution;
mod executor;

pub use error::ExecutorError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use execution::WorkflowExecution;
pub use executor::WorkflowExecutor;
