//! Structured errors for the download/upload runners.

use thiserror::Error;

use crate::events::EventError;

/// Errors raised while moving files to or from the remote repository.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("cart setup failed: {reason}")]
    CartSetup { reason: String },

    #[error("cart {cart_id} failed on the remote: {reason}")]
    CartFailed { cart_id: String, reason: String },

    #[error("bulk fetch for cart {cart_id} failed: {reason}")]
    BulkFetch { cart_id: String, reason: String },

    #[error("upload submission failed: {reason}")]
    UploadSubmit { reason: String },

    #[error("status query for job {job_id} failed: {reason}")]
    StatusQuery { job_id: i64, reason: String },

    #[error("field '{field}' is not defined in the upload status payload")]
    MissingStatusField { field: &'static str },

    #[error("field '{field}' in the upload status payload is not usable: {value}")]
    InvalidStatusField { field: &'static str, value: String },

    #[error("{operation} timed out after {attempts} attempts")]
    Timeout {
        operation: &'static str,
        attempts: u32,
    },

    #[error("bundle serialization failed: {reason}")]
    Serialization { reason: String },

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    pub fn cart_setup(reason: impl Into<String>) -> Self {
        Self::CartSetup {
            reason: reason.into(),
        }
    }

    pub fn cart_failed(cart_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CartFailed {
            cart_id: cart_id.into(),
            reason: reason.into(),
        }
    }

    pub fn bulk_fetch(cart_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BulkFetch {
            cart_id: cart_id.into(),
            reason: reason.into(),
        }
    }

    pub fn upload_submit(reason: impl Into<String>) -> Self {
        Self::UploadSubmit {
            reason: reason.into(),
        }
    }

    pub fn status_query(job_id: i64, reason: impl Into<String>) -> Self {
        Self::StatusQuery {
            job_id,
            reason: reason.into(),
        }
    }
}

pub type TransferResult<T> = std::result::Result<T, TransferError>;
