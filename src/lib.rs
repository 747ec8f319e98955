#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Relay Core
//!
//! Core engine for ingesting metadata change-notification events,
//! routing them to handlers, and orchestrating remote file transfers.
//!
//! ## Overview
//!
//! An inbound CloudEvents-shaped payload describes inserted rows of a
//! metadata store. The task lifecycle tracker records the event, the
//! router matches it against registered predicates and runs exactly one
//! handler, and the principal handler downloads the named files, applies
//! a transform, and uploads the results with derived metadata. Every
//! event's outcome is captured on a persisted task record.
//!
//! ## Module Organization
//!
//! - [`events`] - Envelope parsing and typed record decoding
//! - [`routing`] - Ordered first-match routing to event handlers
//! - [`handlers`] - Handler capability, no-op and transfer variants
//! - [`transfer`] - Download/upload runners, local and remote
//! - [`lifecycle`] - Task records, status state machine, tracker
//! - [`config`] - Process configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate-level error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use relay_core::handlers::NoopEventHandler;
//! use relay_core::lifecycle::{InMemoryTaskStore, TaskTracker};
//! use relay_core::routing::{DataFieldEquals, Router};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut router = Router::new();
//! router.add_route(
//!     DataFieldEquals::new("destinationTable", "Files"),
//!     Arc::new(NoopEventHandler),
//! );
//!
//! let tracker = TaskTracker::new(Arc::new(InMemoryTaskStore::new()));
//! let payload = json!({
//!     "eventType": "org.pacifica.metadata.ingest",
//!     "source": "/pacifica/metadata/ingest",
//!     "data": [{"destinationTable": "Files", "name": "a.txt"}],
//! });
//!
//! let task_id = tracker.track(&payload, &router).await?;
//! let record = tracker.store().get(task_id).await?.unwrap();
//! assert_eq!(record.status_line(), "200 OK");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod lifecycle;
pub mod logging;
pub mod routing;
pub mod transfer;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use events::{Envelope, EventError, File, RecordDecoder, Transaction, TransactionKeyValue};
pub use handlers::{EventHandler, NoopEventHandler, TransferEventHandler};
pub use lifecycle::{InMemoryTaskStore, TaskRecord, TaskStatus, TaskStore, TaskTracker};
pub use routing::{DataFieldEquals, EventMatcher, Router, RoutingError};
pub use transfer::{
    Bundle, CartClient, DownloaderRunner, FileOpener, IngestClient, LocalDownloaderRunner,
    LocalUploaderRunner, PollPolicy, RemoteDownloaderRunner, RemoteUploaderRunner, TransferError,
    UploaderRunner,
};
