//! Persistence seam for task records.
//!
//! The relational engine is an external collaborator; the core only
//! needs atomic single-row writes keyed by task id. `InMemoryTaskStore`
//! backs tests and local runs.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use super::record::{TaskRecord, TaskSummary};

/// Errors raised by a task store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {task_id} already exists")]
    DuplicateTask { task_id: Uuid },

    #[error("task {task_id} not found")]
    NotFound { task_id: Uuid },

    #[error("task store backend error: {reason}")]
    Backend { reason: String },
}

impl StoreError {
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable storage for task records. Each record is owned by exactly one
/// in-flight event, so implementations only need per-row atomicity.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create the record; fails with `DuplicateTask` when the id exists.
    async fn insert(&self, record: &TaskRecord) -> StoreResult<()>;

    /// Overwrite an existing record; fails with `NotFound` otherwise.
    async fn update(&self, record: &TaskRecord) -> StoreResult<()>;

    /// Fetch one record by task id.
    async fn get(&self, task_id: Uuid) -> StoreResult<Option<TaskRecord>>;

    /// Summaries of all records, newest `created_at` first.
    async fn list(&self) -> StoreResult<Vec<TaskSummary>>;
}

/// Map-backed store for tests and offline runs.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<HashMap<Uuid, TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, record: &TaskRecord) -> StoreResult<()> {
        let mut records = self.records.write();
        if records.contains_key(&record.task_id) {
            return Err(StoreError::DuplicateTask {
                task_id: record.task_id,
            });
        }
        records.insert(record.task_id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &TaskRecord) -> StoreResult<()> {
        let mut records = self.records.write();
        if !records.contains_key(&record.task_id) {
            return Err(StoreError::NotFound {
                task_id: record.task_id,
            });
        }
        records.insert(record.task_id, record.clone());
        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> StoreResult<Option<TaskRecord>> {
        Ok(self.records.read().get(&task_id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<TaskSummary>> {
        let mut summaries: Vec<_> = self
            .records
            .read()
            .values()
            .map(TaskRecord::summary)
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}
