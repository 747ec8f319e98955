//! # Router
//!
//! Ordered list of (predicate, handler) pairs with first-match dispatch.
//!
//! Routes are registered once at application initialization and are
//! immutable afterwards; registration order is the priority order. Exactly
//! one handler runs per dispatched payload, and handler errors propagate
//! unchanged; the task lifecycle tracker, not the router, absorbs them.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::errors::{RoutingError, RoutingResult};
use super::matcher::EventMatcher;
use crate::error::Result;
use crate::events::Envelope;
use crate::handlers::EventHandler;

/// One predicate/handler binding.
pub struct Route {
    matcher: Box<dyn EventMatcher>,
    handler: Arc<dyn EventHandler>,
}

impl Route {
    pub fn new(matcher: impl EventMatcher + 'static, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            matcher: Box::new(matcher),
            handler,
        }
    }

    /// Whether this route's predicate accepts the payload.
    pub fn matches(&self, payload: &Value) -> bool {
        self.matcher.matches(payload)
    }

    /// Parse the payload into an envelope and run the handler on it.
    pub async fn invoke(&self, payload: &Value) -> Result<()> {
        let envelope = Envelope::from_value(payload)?;
        self.handler.handle(&envelope).await
    }
}

/// First-match router over an ordered route list.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. No deduplication; order is significant.
    pub fn add_route(&mut self, matcher: impl EventMatcher + 'static, handler: Arc<dyn EventHandler>) {
        self.routes.push(Route::new(matcher, handler));
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes whose predicates accept the payload, lazily, in
    /// registration order.
    pub fn matches<'a, 'p>(
        &'a self,
        payload: &'p Value,
    ) -> impl Iterator<Item = &'a Route> + use<'a, 'p> {
        self.routes.iter().filter(move |route| route.matches(payload))
    }

    /// First matching route, or `NoRouteMatched`.
    pub fn first_match(&self, payload: &Value) -> RoutingResult<&Route> {
        self.matches(payload)
            .next()
            .ok_or_else(|| RoutingError::NoRouteMatched {
                payload: payload.clone(),
            })
    }

    /// Dispatch the payload to the first matching route's handler,
    /// propagating any handler error unchanged.
    pub async fn dispatch(&self, payload: &Value) -> Result<()> {
        let route = self.first_match(payload)?;
        debug!("dispatching payload to first matching route");
        route.invoke(payload).await
    }
}
