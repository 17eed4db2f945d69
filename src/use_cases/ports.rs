use async_trait::async_trait;

use crate::use_cases::types::{InboundEvent, OutboundIntent};

// Port for the bidirectional server channel consumed by the session task.
// The session owns the receiving side exclusively for its whole activation,
// so handler registration/unregistration cannot drift out of balance.
#[async_trait]
pub trait ServerChannel: Send {
    /// Best-effort send; no delivery acknowledgment is surfaced.
    async fn send(&mut self, intent: OutboundIntent);

    /// Next inbound event, or `None` once the server is no longer connected.
    async fn recv(&mut self) -> Option<InboundEvent>;

    /// Tear down the transport. Must be idempotent.
    async fn close(&mut self);
}
