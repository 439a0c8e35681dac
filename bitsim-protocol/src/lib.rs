//! Wire protocol for communication between a bitsim board session and its host.
//!
//! The host and the simulator exchange tagged JSON messages, one object per
//! line. Inbound messages carry bytes typed into the host-side serial console;
//! outbound messages carry coalesced serial output or CSV telemetry produced
//! by the simulated program.
//!
//! # Module layout
//!
//! - [`message`] — tagged message types and CSV kinds
//! - [`error`] — typed decode/encode errors

pub mod error;
pub mod message;

pub use error::ProtocolError;
pub use message::{CsvKind, SerialMessage, SimMessage, decode_line, encode_line};
