use async_trait::async_trait;

use crate::core::errors::GatewayError;
use crate::core::messages::OutboundRequest;

/// The opaque front transport driven by the gateways.
///
/// Implementations own connection management entirely: after
/// `register_front` and `init`, the transport connects, heartbeats and
/// reconnects (to the registered address or an alternate) on its own. The
/// gateway learns about outcomes only through the event handler callbacks,
/// never by querying the transport.
#[async_trait]
pub trait FrontTransport: Send + Sync {
    /// Register a scheme-qualified front address for the transport to dial.
    async fn register_front(&self, address: &str);

    /// Start the transport. The eventual "connected" outcome is delivered
    /// asynchronously via `on_connected`.
    async fn init(&self) -> Result<(), GatewayError>;

    /// Transmit one request, returning the synchronous admission code:
    /// `0` accepted, `-1` network failure, `-2` unprocessed-request quota
    /// exceeded, `-3` per-second quota exceeded.
    ///
    /// A zero admission code says nothing about exchange acceptance, and an
    /// admitted request cannot be withdrawn; a later cancel only supersedes
    /// it.
    async fn send(&self, request: OutboundRequest) -> i32;
}
