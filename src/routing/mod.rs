// Routing module
//
// Ordered first-match dispatch of event payloads to registered handlers.
// Predicate evaluation is delegated to an injected matcher so any
// tree-query engine can sit behind the `EventMatcher` trait.

pub mod errors;
pub mod matcher;
pub mod router;

pub use errors::{RoutingError, RoutingResult};
pub use matcher::{DataFieldEquals, EventMatcher};
pub use router::{Route, Router};
