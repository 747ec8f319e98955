//! Persisted per-event task record and its listing summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::states::TaskStatus;
use crate::error::RelayError;

/// The audit row tracking one event's processing lifecycle.
///
/// Created once per dispatched event and mutated in place through the
/// status transitions; `deleted_at` exists for external administration
/// and is never set here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: Uuid,

    pub event_type: Option<String>,
    pub event_type_version: Option<String>,
    pub cloud_events_version: Option<String>,
    pub source: Option<String>,
    pub event_id: Option<String>,
    pub event_time: Option<String>,
    pub schema_url: Option<String>,
    pub content_type: Option<String>,

    /// Raw envelope JSON, as received.
    pub event_data: String,
    /// Raw `data` rows JSON, as received.
    pub data: String,

    pub task_status: TaskStatus,

    pub exception_type: Option<String>,
    pub exception_value: Option<String>,
    pub exception_traceback: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Capture a new record from the raw payload, in `Accepted` status.
    pub fn new(task_id: Uuid, payload: &Value) -> Self {
        let header = |name: &str| {
            payload
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let now = Utc::now();
        Self {
            task_id,
            event_type: header("eventType"),
            event_type_version: header("eventTypeVersion"),
            cloud_events_version: header("cloudEventsVersion"),
            source: header("source"),
            event_id: header("eventID"),
            event_time: header("eventTime"),
            schema_url: header("schemaURL"),
            content_type: header("contentType"),
            event_data: payload.to_string(),
            data: payload
                .get("data")
                .cloned()
                .unwrap_or(Value::Null)
                .to_string(),
            task_status: TaskStatus::Accepted,
            exception_type: None,
            exception_value: None,
            exception_traceback: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Move to a new status, bumping `updated_at`.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.task_status = status;
        self.updated_at = Utc::now();
    }

    /// Capture a handler failure: type label, display string, and the
    /// formatted cause chain, then move to `Error`.
    pub fn record_failure(&mut self, error: &RelayError) {
        self.exception_type = Some(error.kind().to_string());
        self.exception_value = Some(error.to_string());
        self.exception_traceback = format_error_chain(error);
        self.set_status(TaskStatus::Error);
    }

    /// HTTP-flavored status line for external status queries.
    pub fn status_line(&self) -> &'static str {
        self.task_status.status_line()
    }

    /// Listing projection of this record.
    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            task_id: self.task_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

/// The fields exposed by the task listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Walk the error's source chain into one readable block.
fn format_error_chain(error: &dyn std::error::Error) -> String {
    let mut formatted = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        formatted.push_str("\ncaused by: ");
        formatted.push_str(&cause.to_string());
        source = cause.source();
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn captures_headers_and_raw_payload() {
        let payload = json!({
            "eventType": "org.pacifica.metadata.ingest",
            "eventTypeVersion": "1.0",
            "cloudEventsVersion": "0.1",
            "source": "/pacifica/metadata/ingest",
            "eventID": "evt-1",
            "eventTime": "2019-01-01T00:00:00Z",
            "schemaURL": "https://example.test/schema",
            "contentType": "application/json",
            "data": [{"destinationTable": "Files"}],
        });

        let record = TaskRecord::new(Uuid::new_v4(), &payload);
        assert_eq!(record.event_type.as_deref(), Some("org.pacifica.metadata.ingest"));
        assert_eq!(record.event_id.as_deref(), Some("evt-1"));
        assert_eq!(record.content_type.as_deref(), Some("application/json"));
        assert_eq!(record.task_status, TaskStatus::Accepted);
        assert!(record.event_data.contains("destinationTable"));
        assert_eq!(record.data, r#"[{"destinationTable":"Files"}]"#);
        assert!(record.deleted_at.is_none());
    }

    #[test]
    fn missing_headers_stay_unset() {
        let record = TaskRecord::new(Uuid::new_v4(), &json!({"data": []}));
        assert!(record.event_type.is_none());
        assert!(record.source.is_none());
        assert_eq!(record.data, "[]");
    }

    #[test]
    fn record_failure_captures_the_exception_triple() {
        let mut record = TaskRecord::new(Uuid::new_v4(), &json!({}));
        let error = RelayError::configuration("boom");
        record.record_failure(&error);

        assert_eq!(record.task_status, TaskStatus::Error);
        assert_eq!(record.exception_type.as_deref(), Some("ConfigurationError"));
        assert_eq!(
            record.exception_value.as_deref(),
            Some("configuration error: boom")
        );
        assert!(record.exception_traceback.contains("boom"));
    }

    #[test]
    fn error_chain_formatting_includes_causes() {
        use crate::transfer::TransferError;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = RelayError::Transfer(TransferError::Io(io));
        let chain = format_error_chain(&error);
        assert!(chain.contains("no such file"));
    }
}
