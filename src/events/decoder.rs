//! # Record Decoder
//!
//! Pure extraction of typed records from a validated envelope.
//!
//! The decoder checks the envelope's `eventType` first and its `source`
//! second, before any row scanning; either mismatch aborts decoding with an
//! error carrying the offending envelope. Expected values are injected at
//! construction rather than read from globals so multiple vocabularies can
//! coexist in one process.

use serde_json::Value;

use super::envelope::Envelope;
use super::errors::{EventError, EventResult};
use super::records::{File, Transaction, TransactionKeyValue, TRANSACTION_FIELDS};

/// Event type emitted by the metadata store for ingest notifications.
pub const DEFAULT_EVENT_TYPE: &str = "org.pacifica.metadata.ingest";

/// Source URI the metadata store stamps on ingest notifications.
pub const DEFAULT_SOURCE: &str = "/pacifica/metadata/ingest";

/// Decodes typed records out of envelopes for one event vocabulary.
#[derive(Debug, Clone)]
pub struct RecordDecoder {
    event_type: String,
    source: String,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_TYPE, DEFAULT_SOURCE)
    }
}

impl RecordDecoder {
    pub fn new(event_type: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source: source.into(),
        }
    }

    /// Expected `eventType` value.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Expected `source` value.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// All `Files` rows, one record each, in envelope order.
    pub fn files(&self, envelope: &Envelope) -> EventResult<Vec<File>> {
        self.validate(envelope)?;
        envelope
            .rows_for_table("Files")
            .map(|row| decode_row(row, "Files"))
            .collect()
    }

    /// All `TransactionKeyValue` rows, one record each, in envelope order.
    pub fn key_values(&self, envelope: &Envelope) -> EventResult<Vec<TransactionKeyValue>> {
        self.validate(envelope)?;
        envelope
            .rows_for_table("TransactionKeyValue")
            .map(|row| decode_row(row, "TransactionKeyValue"))
            .collect()
    }

    /// The single transaction described by `Transactions.<field>` rows.
    ///
    /// A second row for any field is a fatal duplicate-attribute error;
    /// fields with no row stay unset. Rows without a `value` member are
    /// skipped, matching the original path-query projection.
    pub fn transaction(&self, envelope: &Envelope) -> EventResult<Transaction> {
        self.validate(envelope)?;
        let mut transaction = Transaction::default();
        for field in TRANSACTION_FIELDS {
            let table = format!("Transactions.{field}");
            for row in envelope.rows_for_table(&table) {
                let Some(value) = row.get("value") else {
                    continue;
                };
                if transaction.field(field).is_some() {
                    return Err(EventError::duplicate_attribute(field));
                }
                transaction.set_field(field, value.clone());
            }
        }
        Ok(transaction)
    }

    /// Envelope preconditions: event type first, then source.
    fn validate(&self, envelope: &Envelope) -> EventResult<()> {
        if envelope.event_type.as_deref() != Some(self.event_type.as_str()) {
            return Err(EventError::invalid_event_type(&self.event_type, envelope));
        }
        if envelope.source.as_deref() != Some(self.source.as_str()) {
            return Err(EventError::invalid_source(&self.source, envelope));
        }
        Ok(())
    }
}

fn decode_row<T: serde::de::DeserializeOwned>(row: &Value, table: &str) -> EventResult<T> {
    serde_json::from_value(row.clone()).map_err(|e| EventError::MalformedEnvelope {
        reason: format!("{table} row: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(data: Value) -> Envelope {
        Envelope::from_value(&json!({
            "eventType": DEFAULT_EVENT_TYPE,
            "source": DEFAULT_SOURCE,
            "data": data,
        }))
        .unwrap()
    }

    #[test]
    fn wrong_event_type_fails_before_source() {
        let bad = Envelope::from_value(&json!({
            "eventType": "org.example.other",
            "source": "/also/wrong",
            "data": [],
        }))
        .unwrap();

        let decoder = RecordDecoder::default();
        for result in [
            decoder.files(&bad).map(|_| ()),
            decoder.transaction(&bad).map(|_| ()),
            decoder.key_values(&bad).map(|_| ()),
        ] {
            assert!(matches!(
                result.unwrap_err(),
                EventError::InvalidEventType { .. }
            ));
        }
    }

    #[test]
    fn wrong_source_fails_after_type_matches() {
        let bad = Envelope::from_value(&json!({
            "eventType": DEFAULT_EVENT_TYPE,
            "source": "/wrong/source",
            "data": [],
        }))
        .unwrap();

        let error = RecordDecoder::default().files(&bad).unwrap_err();
        assert!(matches!(error, EventError::InvalidSource { .. }));
    }

    #[test]
    fn decodes_files_in_envelope_order() {
        let envelope = envelope(json!([
            {"destinationTable": "Files", "_id": 1, "name": "a.txt"},
            {"destinationTable": "Transactions._id", "value": 7},
            {"destinationTable": "Files", "_id": 2, "name": "b.txt", "subdir": "sub"},
        ]));

        let files = RecordDecoder::default().files(&envelope).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, Some(1));
        assert_eq!(files[1].path().unwrap().to_str(), Some("sub/b.txt"));
    }

    #[test]
    fn duplicate_transaction_field_is_fatal() {
        let envelope = envelope(json!([
            {"destinationTable": "Transactions.proposal", "value": "1234a"},
            {"destinationTable": "Transactions.proposal", "value": "1234b"},
        ]));

        let error = RecordDecoder::default().transaction(&envelope).unwrap_err();
        match error {
            EventError::DuplicateAttribute { field } => assert_eq!(field, "proposal"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn transaction_rows_without_value_are_skipped() {
        let envelope = envelope(json!([
            {"destinationTable": "Transactions.proposal"},
            {"destinationTable": "Transactions.proposal", "value": "1234a"},
        ]));

        let transaction = RecordDecoder::default().transaction(&envelope).unwrap();
        assert_eq!(transaction.proposal, Some(json!("1234a")));
    }

    #[test]
    fn empty_envelope_decodes_to_unset_transaction() {
        let transaction = RecordDecoder::default()
            .transaction(&envelope(json!([])))
            .unwrap();
        assert_eq!(transaction, Transaction::default());
    }

    #[test]
    fn decodes_all_record_kinds_together() {
        let envelope = envelope(json!([
            {"destinationTable": "Files", "_id": 1, "name": "filename.ext", "subdir": "filepath"},
            {"destinationTable": "Transactions._id", "value": 1},
            {"destinationTable": "TransactionKeyValue", "key": "k", "value": "v"},
        ]));

        let decoder = RecordDecoder::default();
        let files = decoder.files(&envelope).unwrap();
        let transaction = decoder.transaction(&envelope).unwrap();
        let key_values = decoder.key_values(&envelope).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0].path().unwrap().to_str(),
            Some("filepath/filename.ext")
        );
        assert_eq!(transaction.id, Some(json!(1)));
        assert_eq!(key_values.len(), 1);
        assert_eq!(key_values[0].key.as_deref(), Some("k"));
        assert_eq!(key_values[0].value, Some(json!("v")));
    }
}
