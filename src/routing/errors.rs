use serde_json::Value;
use thiserror::Error;

/// Errors raised during route matching.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No registered route's predicate accepted the payload. Carries the
    /// payload for diagnostics.
    #[error("route not found")]
    NoRouteMatched { payload: Value },
}

pub type RoutingResult<T> = std::result::Result<T, RoutingError>;
