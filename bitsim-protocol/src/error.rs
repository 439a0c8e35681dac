//! Typed error variants for the bitsim wire protocol.
//!
//! Exposed so library consumers can match on specific failure modes instead
//! of opaque strings.

use thiserror::Error;

/// Errors that can occur when decoding or encoding host protocol lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line was not valid JSON, or did not match any known message shape.
    #[error("malformed protocol message: {0}")]
    Json(#[from] serde_json::Error),

    /// The line was empty or whitespace-only. Callers that stream lines from
    /// a reader typically skip these rather than treating them as failures.
    #[error("empty protocol line")]
    EmptyLine,
}
