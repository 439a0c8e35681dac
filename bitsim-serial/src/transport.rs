//! Outbound transport seam between the serial engine and the host channel.

use bitsim_protocol::SimMessage;

/// Sink for outbound host messages (coalesced serial text, CSV telemetry).
///
/// Posting is fire-and-forget: the engine does not await delivery and has no
/// retry policy. A transport that cannot deliver should log and drop.
pub trait Transport: Send + Sync {
    /// Hand one message to the host channel.
    fn post(&self, msg: SimMessage);
}
