//! Notification seam between the serial engine and the board's event bus.
//!
//! The engine never interprets how a notification is delivered — queued,
//! dispatched to callbacks, or dropped — it only raises a fixed
//! (source, event) pair and moves on.

/// Source identifier for the serial peripheral on the board event bus.
pub const ID_SERIAL: u16 = 12;

/// Event identifier raised when a registered delimiter is present in the
/// receive buffer.
pub const EVT_DELIM_MATCH: u16 = 1;

/// Sink for fire-and-forget notifications raised by the serial engine.
///
/// Implementations must not call back into the endpoint from `raise`; the
/// engine raises while it holds a borrow of its own state.
pub trait EventSink: Send + Sync {
    /// Post one notification. No acknowledgement, no blocking.
    fn raise(&self, source: u16, event: u16);
}
