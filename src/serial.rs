//! User-facing serial API surface.
//!
//! Thin wrappers over the board's serial endpoint, mirroring the operations
//! a user program has available: write (coalesced), write CSV, read all,
//! read up to a delimiter, subscribe to delimiter matches, raw read, and a
//! test/debug injection entry point.

use bitsim_protocol::CsvKind;
use bitsim_serial::{EVT_DELIM_MATCH, ID_SERIAL};

use crate::board::Board;

/// Write a string to the serial line. Output is coalesced into line-sized or
/// size-bounded chunks before it reaches the host.
pub fn write_string(board: &mut Board, s: &str) {
    board.serial_mut().write_serial(s);
}

/// Write CSV telemetry. Bypasses coalescing.
pub fn write_csv(board: &mut Board, s: &str, kind: CsvKind) {
    board.serial_mut().write_csv(s, kind);
}

/// Read and drain everything buffered on the serial line.
pub fn read_string(board: &mut Board) -> String {
    board.serial_mut().read_serial()
}

/// Read and drain up to the first occurrence of `delimiter`.
pub fn read_until(board: &mut Board, delimiter: &str) -> String {
    board.serial_mut().read_until(delimiter)
}

/// Register a delimiter and a handler to run when it is matched in received
/// data.
///
/// Registration performs the endpoint's catch-up check, so the handler runs
/// on the next [`Board::run_pending`] even when matching data arrived before
/// the subscription.
pub fn on_data_received(board: &mut Board, delimiters: &str, handler: impl FnMut() + Send + 'static) {
    board.serial_mut().register_delimiter(delimiters);
    board.bus().listen(ID_SERIAL, EVT_DELIM_MATCH, handler);
}

/// Raw byte read stub: a zero-filled buffer, non-positive lengths clamped to
/// the configured default.
pub fn read_buffer(board: &Board, length: i32) -> Vec<u8> {
    board.serial().read_buffer(length)
}

/// Inject text directly into the receive path, exactly as if it had arrived
/// in an inbound host message. Test/debug entry point.
pub fn inject(board: &mut Board, data: &str) {
    board.serial_mut().receive_data(data);
}
