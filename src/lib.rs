//! Board-session host for the bitsim device simulator serial core.
//!
//! This crate wires the serial endpoint engine to a concrete board session:
//!
//! - [`bus`] — board event bus (pending notification queue + handler registry)
//! - [`board`] — the board session owning the endpoint and the bus
//! - [`serial`] — the user-facing serial API surface
//! - [`host`] — stdio host loop (JSON lines in, JSON lines out)
//! - [`debug`] — stderr log bridge for the `log` facade

pub mod board;
pub mod bus;
pub mod debug;
pub mod host;
pub mod serial;

// Re-export main types for convenience
pub use board::Board;
pub use bus::EventBus;
pub use host::{StdoutTransport, run_host_loop};
