//! # Task Lifecycle Tracker
//!
//! Wraps one event's dispatch with status bookkeeping. The tracker owns
//! the event's task record for the duration of processing; every status
//! transition is persisted before control moves on, so an external
//! status query never observes a torn write.
//!
//! Failure policy: the initial insert is the only failure that
//! propagates (there is no record to report against). Once the record
//! exists, dispatch failures are absorbed into its terminal status: a
//! missing route becomes `Unprocessable`, anything else becomes `Error`
//! with the exception detail captured. Re-submitting an existing task id
//! is rejected by the store's insert.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::record::TaskRecord;
use super::states::TaskStatus;
use super::store::{StoreResult, TaskStore};
use crate::error::RelayError;
use crate::routing::Router;

pub struct TaskTracker {
    store: Arc<dyn TaskStore>,
}

impl TaskTracker {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Process one inbound payload end to end, returning its task id.
    #[instrument(skip_all)]
    pub async fn track(&self, payload: &Value, router: &Router) -> StoreResult<Uuid> {
        let task_id = Uuid::new_v4();
        let mut record = TaskRecord::new(task_id, payload);
        self.store.insert(&record).await?;

        record.set_status(TaskStatus::Processing);
        self.store.update(&record).await?;

        match router.dispatch(payload).await {
            Ok(()) => record.set_status(TaskStatus::Complete),
            Err(RelayError::Routing(_)) => {
                warn!(%task_id, "no route matched");
                record.set_status(TaskStatus::Unprocessable);
            }
            Err(error) => {
                warn!(%task_id, error = %error, "handler failed");
                record.record_failure(&error);
            }
        }
        self.store.update(&record).await?;

        info!(%task_id, status = %record.task_status, "event processing finished");
        Ok(task_id)
    }
}
