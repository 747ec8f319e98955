use serde::{Deserialize, Serialize};
use std::fmt;

/// Task processing status.
///
/// The lifecycle is `Accepted -> Processing -> {Complete, Unprocessable,
/// Error}`; no transition skips `Processing` and terminal states are
/// never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Set when the task record is created, before routing is attempted.
    Accepted,
    /// Set immediately before the router is invoked.
    Processing,
    /// The matched handler returned normally.
    Complete,
    /// No registered route matched the payload.
    Unprocessable,
    /// The matched handler failed; the exception detail is captured on
    /// the task record.
    Error,
}

impl TaskStatus {
    /// Whether this status ends the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Unprocessable | Self::Error)
    }

    /// HTTP-flavored status line persisted for external status queries.
    pub fn status_line(&self) -> &'static str {
        match self {
            Self::Accepted => "202 Accepted",
            Self::Processing => "102 Processing",
            Self::Complete => "200 OK",
            Self::Unprocessable => "422 Unprocessable Entity",
            Self::Error => "500 Internal Server Error",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Accepted
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Processing => write!(f, "processing"),
            Self::Complete => write!(f, "complete"),
            Self::Unprocessable => write!(f, "unprocessable"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Self::Accepted),
            "processing" => Ok(Self::Processing),
            "complete" => Ok(Self::Complete),
            "unprocessable" => Ok(Self::Unprocessable),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}
