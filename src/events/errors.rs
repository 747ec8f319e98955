//! Structured errors for envelope validation and record extraction.

use thiserror::Error;

use super::envelope::Envelope;

/// Errors raised while validating an envelope or extracting records from it.
///
/// The envelope-level variants carry the offending envelope so callers can
/// log or persist it for diagnosis.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("field 'eventType' is invalid (expected: '{expected}')")]
    InvalidEventType {
        expected: String,
        envelope: Box<Envelope>,
    },

    #[error("field 'source' is invalid (expected: '{expected}')")]
    InvalidSource {
        expected: String,
        envelope: Box<Envelope>,
    },

    #[error("field 'Transactions.{field}' is already defined")]
    DuplicateAttribute { field: String },

    #[error("field '{field}' is not set")]
    MissingField { field: &'static str },

    #[error("malformed event envelope: {reason}")]
    MalformedEnvelope { reason: String },
}

impl EventError {
    pub fn invalid_event_type(expected: impl Into<String>, envelope: &Envelope) -> Self {
        Self::InvalidEventType {
            expected: expected.into(),
            envelope: Box::new(envelope.clone()),
        }
    }

    pub fn invalid_source(expected: impl Into<String>, envelope: &Envelope) -> Self {
        Self::InvalidSource {
            expected: expected.into(),
            envelope: Box::new(envelope.clone()),
        }
    }

    pub fn duplicate_attribute(field: impl Into<String>) -> Self {
        Self::DuplicateAttribute {
            field: field.into(),
        }
    }
}

pub type EventResult<T> = std::result::Result<T, EventError>;
