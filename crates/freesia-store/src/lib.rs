//! Freesia Store
//!
//! This crate provides the storage trait and implementations for workflow
//! execution records. Records are an append-only audit history: an execution
//! is created once by the trigger boundary, mutated only by the executor that
//! drives it, and never deleted. Once a record reaches a terminal status the
//! store refuses further mutation.
//!
//! The [`Store`] trait defines operations for:
//! - Creating execution records
//! - Advancing a record's status while the execution runs
//! - Writing the terminal status, result, and error exactly once
//! - Querying execution history

mod memory;
mod types;

pub use memory::MemoryStore;
pub use types::ExecutionRecord;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use freesia_workflow::ExecutionStatus;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// A record with this execution id already exists.
  #[error("execution '{0}' already exists")]
  AlreadyExists(String),

  /// The record is in a terminal status and cannot be mutated.
  #[error("execution '{execution_id}' is terminal ({status:?}) and cannot be mutated")]
  TerminalExecution {
    execution_id: String,
    status: ExecutionStatus,
  },
}

/// Storage trait for workflow execution records.
#[async_trait]
pub trait Store: Send + Sync {
  /// Create a new execution record.
  async fn create_execution(&self, record: &ExecutionRecord) -> Result<(), Error>;

  /// Get an execution record by id.
  async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, Error>;

  /// Advance the status of a running execution.
  ///
  /// Only for non-terminal statuses; terminal statuses are written with
  /// [`Store::complete_execution`].
  async fn update_execution_status(
    &self,
    execution_id: &str,
    status: ExecutionStatus,
  ) -> Result<(), Error>;

  /// Write the terminal status, final result, and error of an execution.
  async fn complete_execution(
    &self,
    execution_id: &str,
    status: ExecutionStatus,
    result: Option<serde_json::Value>,
    error: Option<String>,
    completed_at: DateTime<Utc>,
  ) -> Result<(), Error>;

  /// List all execution records, oldest first.
  async fn list_executions(&self) -> Result<Vec<ExecutionRecord>, Error>;
}
