//! Tagged message types exchanged with the host, and line framing helpers.
//!
//! Messages are serialized as one JSON object per line. The `type` field is
//! the discriminant so host-side code can dispatch without parsing the whole
//! payload shape first.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// A message exchanged between the host and a simulated board session.
///
/// Tagged with `type` on the wire. Only serial traffic is defined today; the
/// enum leaves room for other peripherals without changing the framing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SimMessage {
    /// Serial console traffic in either direction.
    Serial(SerialMessage),
}

/// Payload of a serial message.
///
/// Inbound (host → simulator): `data` holds the characters to deliver to the
/// board's receive buffer. Outbound (simulator → host): `data` holds a
/// coalesced chunk of program output, or a CSV payload when `csv_kind` is
/// set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialMessage {
    /// Text payload. Hosts may omit the field entirely; that decodes as empty.
    #[serde(default)]
    pub data: String,

    /// Owning session identifier, set on outbound messages so a host driving
    /// several boards can route the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Structural kind for CSV telemetry. Absent for plain serial text.
    #[serde(
        rename = "csvType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub csv_kind: Option<CsvKind>,

    /// True when the message originated inside the simulator.
    #[serde(default)]
    pub sim: bool,
}

impl SerialMessage {
    /// Build an outbound plain-text serial message.
    pub fn text(session: &str, data: String) -> Self {
        Self {
            data,
            id: Some(session.to_string()),
            csv_kind: None,
            sim: true,
        }
    }

    /// Build an outbound CSV telemetry message.
    pub fn csv(session: &str, data: String, kind: CsvKind) -> Self {
        Self {
            data,
            id: Some(session.to_string()),
            csv_kind: Some(kind),
            sim: true,
        }
    }
}

/// Structural kind of a CSV telemetry payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CsvKind {
    /// Column header row; replaces any previously sent headers.
    Headers,
    /// One data row.
    Row,
    /// Clear the host-side table.
    Clear,
}

/// Decode one protocol line into a message.
///
/// Leading and trailing whitespace is ignored. A blank line yields
/// [`ProtocolError::EmptyLine`] so streaming callers can skip it cheaply.
pub fn decode_line(line: &str) -> Result<SimMessage, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::EmptyLine);
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Encode a message as a single protocol line (no trailing newline).
pub fn encode_line(msg: &SimMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(msg)?)
}
