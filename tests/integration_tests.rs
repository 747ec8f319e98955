//! End-to-end tests: payload in, task record out, with the full
//! decode/route/transfer pipeline running on local runners.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

use relay_core::events::{DEFAULT_EVENT_TYPE, DEFAULT_SOURCE};
use relay_core::handlers::PassthroughTransform;
use relay_core::lifecycle::{InMemoryTaskStore, StoreResult, TaskRecord, TaskSummary};
use relay_core::routing::DataFieldEquals;
use relay_core::transfer::{LocalDownloaderRunner, LocalUploaderRunner};
use relay_core::{
    RecordDecoder, Router, TaskStatus, TaskStore, TaskTracker, TransferEventHandler,
};

/// Store wrapper that records every persisted status, in write order.
struct RecordingStore {
    inner: InMemoryTaskStore,
    history: Mutex<Vec<TaskStatus>>,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryTaskStore::new(),
            history: Mutex::new(Vec::new()),
        }
    }

    fn history(&self) -> Vec<TaskStatus> {
        self.history.lock().clone()
    }
}

#[async_trait]
impl TaskStore for RecordingStore {
    async fn insert(&self, record: &TaskRecord) -> StoreResult<()> {
        self.history.lock().push(record.task_status);
        self.inner.insert(record).await
    }

    async fn update(&self, record: &TaskRecord) -> StoreResult<()> {
        self.history.lock().push(record.task_status);
        self.inner.update(record).await
    }

    async fn get(&self, task_id: Uuid) -> StoreResult<Option<TaskRecord>> {
        self.inner.get(task_id).await
    }

    async fn list(&self) -> StoreResult<Vec<TaskSummary>> {
        self.inner.list().await
    }
}

fn ingest_payload() -> Value {
    json!({
        "eventType": DEFAULT_EVENT_TYPE,
        "eventTypeVersion": "1.0",
        "source": DEFAULT_SOURCE,
        "eventID": "evt-0001",
        "data": [
            {"destinationTable": "Files", "_id": 1, "name": "filename.ext", "subdir": "filepath"},
            {"destinationTable": "Transactions._id", "value": 1},
            {"destinationTable": "Transactions.instrument", "value": 54},
            {"destinationTable": "TransactionKeyValue", "key": "k", "value": "v"},
        ],
    })
}

fn transfer_router(source_dir: &std::path::Path) -> Router {
    let handler = TransferEventHandler::new(
        RecordDecoder::default(),
        Arc::new(LocalDownloaderRunner::new(source_dir)),
        Arc::new(LocalUploaderRunner),
        Arc::new(PassthroughTransform),
    );
    let mut router = Router::new();
    router.add_route(
        DataFieldEquals::new("destinationTable", "Files"),
        Arc::new(handler),
    );
    router
}

#[tokio::test]
async fn processed_event_walks_accepted_processing_complete() {
    let source = tempfile::tempdir().unwrap();
    fs::create_dir_all(source.path().join("filepath")).unwrap();
    fs::write(source.path().join("filepath/filename.ext"), b"Hello, world!").unwrap();

    let store = Arc::new(RecordingStore::new());
    let router = transfer_router(source.path());
    let tracker = TaskTracker::new(store.clone());

    let task_id = tracker.track(&ingest_payload(), &router).await.unwrap();

    assert_eq!(
        store.history(),
        vec![
            TaskStatus::Accepted,
            TaskStatus::Processing,
            TaskStatus::Complete,
        ]
    );

    let record = store.get(task_id).await.unwrap().unwrap();
    assert_eq!(record.status_line(), "200 OK");
    assert_eq!(record.event_id.as_deref(), Some("evt-0001"));
    assert!(record.exception_type.is_none());
    assert!(record.exception_traceback.is_empty());
}

#[tokio::test]
async fn unrouted_event_walks_accepted_processing_unprocessable() {
    let store = Arc::new(RecordingStore::new());
    let router = Router::new();
    let tracker = TaskTracker::new(store.clone());

    let task_id = tracker.track(&ingest_payload(), &router).await.unwrap();

    assert_eq!(
        store.history(),
        vec![
            TaskStatus::Accepted,
            TaskStatus::Processing,
            TaskStatus::Unprocessable,
        ]
    );

    let record = store.get(task_id).await.unwrap().unwrap();
    assert_eq!(record.status_line(), "422 Unprocessable Entity");
}

#[tokio::test]
async fn failing_transfer_walks_to_internal_error() {
    // The named file does not exist under the source tree, so the
    // passthrough transform fails when reading its input.
    let source = tempfile::tempdir().unwrap();

    let store = Arc::new(RecordingStore::new());
    let router = transfer_router(source.path());
    let tracker = TaskTracker::new(store.clone());

    let task_id = tracker.track(&ingest_payload(), &router).await.unwrap();

    assert_eq!(
        store.history(),
        vec![
            TaskStatus::Accepted,
            TaskStatus::Processing,
            TaskStatus::Error,
        ]
    );

    let record = store.get(task_id).await.unwrap().unwrap();
    assert_eq!(record.status_line(), "500 Internal Server Error");
    assert!(record.exception_type.is_some());
    assert!(!record.exception_traceback.is_empty());
}

#[tokio::test]
async fn listing_returns_newest_first() {
    let store = Arc::new(RecordingStore::new());
    let router = Router::new();
    let tracker = TaskTracker::new(store.clone());

    let first = tracker.track(&ingest_payload(), &router).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = tracker.track(&ingest_payload(), &router).await.unwrap();

    let summaries = store.list().await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].task_id, second);
    assert_eq!(summaries[1].task_id, first);
}
