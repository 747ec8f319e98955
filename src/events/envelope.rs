use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{EventError, EventResult};

/// CloudEvents-shaped wrapper around a batch of metadata row changes.
///
/// Field names on the wire follow the CloudEvents v0.1 casing
/// (`eventType`, `eventID`, `schemaURL`, ...). Every header field is
/// optional; `data` defaults to an empty row set. An envelope is read-only
/// once constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "eventType", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    #[serde(
        rename = "eventTypeVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub event_type_version: Option<String>,

    #[serde(
        rename = "cloudEventsVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cloud_events_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    #[serde(rename = "eventTime", default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,

    #[serde(rename = "schemaURL", default, skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,

    #[serde(
        rename = "contentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,

    /// Row-maps, each discriminated by a `destinationTable` field.
    #[serde(default)]
    pub data: Vec<Value>,
}

impl Envelope {
    /// Parse an envelope out of a raw JSON payload. Unknown fields are
    /// ignored; a payload that is not an object fails.
    pub fn from_value(payload: &Value) -> EventResult<Self> {
        serde_json::from_value(payload.clone()).map_err(|e| EventError::MalformedEnvelope {
            reason: e.to_string(),
        })
    }

    /// Row-maps whose `destinationTable` discriminator equals `table`,
    /// in envelope order.
    pub fn rows_for_table<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.data.iter().filter(move |row| {
            row.get("destinationTable").and_then(Value::as_str) == Some(table)
        })
    }
}
