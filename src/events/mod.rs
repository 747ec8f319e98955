// Event ingestion module
//
// Turns a loosely-typed CloudEvents-shaped payload into typed domain
// records with strict envelope and extraction invariants.

pub mod decoder;
pub mod envelope;
pub mod errors;
pub mod records;

pub use decoder::{RecordDecoder, DEFAULT_EVENT_TYPE, DEFAULT_SOURCE};
pub use envelope::Envelope;
pub use errors::{EventError, EventResult};
pub use records::{File, Transaction, TransactionKeyValue};
