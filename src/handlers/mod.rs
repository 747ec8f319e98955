// Event handler module
//
// The handler capability invoked by the router, with the no-op variant
// and the principal transfer handler.

pub mod transfer_handler;
pub mod transform;

use async_trait::async_trait;

use crate::error::Result;
use crate::events::Envelope;

pub use transfer_handler::TransferEventHandler;
pub use transform::{FileTransform, PassthroughTransform};

/// Processes one routed event. Implementations are shared across worker
/// invocations and must be stateless or internally synchronized.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, envelope: &Envelope) -> Result<()>;
}

/// Accepts every event and does nothing. Useful as a routing sink in
/// tests and for event types that only need acknowledgement.
#[derive(Debug, Clone, Default)]
pub struct NoopEventHandler;

#[async_trait]
impl EventHandler for NoopEventHandler {
    async fn handle(&self, _envelope: &Envelope) -> Result<()> {
        Ok(())
    }
}
