//! Crate-level error type aggregating the per-area error enums.
//!
//! Handlers and the router surface `RelayError` so the task tracker can
//! classify any failure into a terminal task status with a stable
//! `exception_type` label.

use thiserror::Error;

use crate::events::EventError;
use crate::lifecycle::StoreError;
use crate::routing::RoutingError;
use crate::transfer::TransferError;

/// Top-level error for event processing.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl RelayError {
    /// Stable label recorded as `exception_type` on a failed task record.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Event(_) => "EventError",
            Self::Routing(_) => "RoutingError",
            Self::Transfer(_) => "TransferError",
            Self::Store(_) => "StoreError",
            Self::Configuration { .. } => "ConfigurationError",
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for RelayError {
    fn from(error: std::io::Error) -> Self {
        Self::Transfer(TransferError::Io(error))
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
