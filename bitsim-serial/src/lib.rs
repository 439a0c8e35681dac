//! Serial endpoint engine for the bitsim device simulator.
//!
//! This crate provides the [`SerialEndpoint`] which models one half-duplex
//! serial line on a simulated board and provides:
//!
//! - Receive accumulation (host bytes → growing rx buffer)
//! - Delimiter registration with normalization and catch-up notification
//! - Draining (read-everything and read-up-to-delimiter)
//! - Transmit coalescing (line boundary or size threshold → one host message)
//! - Raw byte read stub (zero-filled, separate from the text path)
//!
//! The endpoint is synchronous and single-writer: every operation runs to
//! completion when invoked, and notification posting is fire-and-forget into
//! an injected [`EventSink`]. Hosts that need cross-thread access wrap the
//! owning board in a lock; the engine itself carries none.

pub mod config;
pub mod delimiter;
pub mod endpoint;
pub mod events;
pub mod transport;

// Re-export main types for convenience
pub use config::SerialConfig;
pub use delimiter::normalize_delimiter;
pub use endpoint::SerialEndpoint;
pub use events::{EVT_DELIM_MATCH, EventSink, ID_SERIAL};
pub use transport::Transport;
