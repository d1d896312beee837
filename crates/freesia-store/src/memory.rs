//! In-memory execution store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use freesia_workflow::ExecutionStatus;

use crate::types::ExecutionRecord;
use crate::{Error, Store};

/// Stores execution records in process memory.
///
/// Cloning is cheap; clones share the same underlying map. Records live for
/// the lifetime of the store.
#[derive(Clone, Default)]
pub struct MemoryStore {
  records: Arc<RwLock<HashMap<String, ExecutionRecord>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self {
      records: Arc::new(RwLock::new(HashMap::new())),
    }
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn create_execution(&self, record: &ExecutionRecord) -> Result<(), Error> {
    let mut records = self.records.write().unwrap();

    if records.contains_key(&record.execution_id) {
      return Err(Error::AlreadyExists(record.execution_id.clone()));
    }

    records.insert(record.execution_id.clone(), record.clone());
    Ok(())
  }

  async fn get_execution(&self, execution_id: &str) -> Result<ExecutionRecord, Error> {
    let records = self.records.read().unwrap();
    records
      .get(execution_id)
      .cloned()
      .ok_or_else(|| Error::NotFound(execution_id.to_string()))
  }

  async fn update_execution_status(
    &self,
    execution_id: &str,
    status: ExecutionStatus,
  ) -> Result<(), Error> {
    let mut records = self.records.write().unwrap();
    let record = records
      .get_mut(execution_id)
      .ok_or_else(|| Error::NotFound(execution_id.to_string()))?;

    if record.status.is_terminal() {
      return Err(Error::TerminalExecution {
        execution_id: execution_id.to_string(),
        status: record.status,
      });
    }

    record.status = status;
    Ok(())
  }

  async fn complete_execution(
    &self,
    execution_id: &str,
    status: ExecutionStatus,
    result: Option<serde_json::Value>,
    error: Option<String>,
    completed_at: DateTime<Utc>,
  ) -> Result<(), Error> {
    let mut records = self.records.write().unwrap();
    let record = records
      .get_mut(execution_id)
      .ok_or_else(|| Error::NotFound(execution_id.to_string()))?;

    if record.status.is_terminal() {
      return Err(Error::TerminalExecution {
        execution_id: execution_id.to_string(),
        status: record.status,
      });
    }

    record.status = status;
    record.result = result;
    record.error = error;
    record.completed_at = Some(completed_at);
    Ok(())
  }

  async fn list_executions(&self) -> Result<Vec<ExecutionRecord>, Error> {
    let records = self.records.read().unwrap();
    let mut executions: Vec<_> = records.values().cloned().collect();
    executions.sort_by(|a, b| a.started_at.cmp(&b.started_at));
    Ok(executions)
  }
}
