// Task lifecycle module
//
// Per-event task records, their status state machine, the persistence
// seam, and the tracker that wraps dispatch with status bookkeeping.

pub mod record;
pub mod states;
pub mod store;
pub mod tracker;

pub use record::{TaskRecord, TaskSummary};
pub use states::TaskStatus;
pub use store::{InMemoryTaskStore, StoreError, StoreResult, TaskStore};
pub use tracker::TaskTracker;
