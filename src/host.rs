//! Stdio host loop.
//!
//! Reads line-delimited JSON messages from stdin and dispatches them to the
//! board; outbound messages are written to stdout, one JSON object per line.
//! Diagnostics go to stderr only, since stdout carries the protocol.

use std::io::{BufRead, Write};

use bitsim_protocol::{ProtocolError, SimMessage, encode_line};
use bitsim_serial::Transport;

use crate::board::Board;

/// Transport that frames outbound messages onto stdout.
#[derive(Debug, Default)]
pub struct StdoutTransport;

impl StdoutTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for StdoutTransport {
    fn post(&self, msg: SimMessage) {
        let line = match encode_line(&msg) {
            Ok(line) => line,
            Err(e) => {
                log::error!("failed to encode outbound message: {e}");
                return;
            }
        };
        let mut stdout = std::io::stdout().lock();
        // Best-effort: a closed host pipe is logged, not propagated.
        if let Err(e) = writeln!(stdout, "{line}").and_then(|_| stdout.flush()) {
            log::error!("failed to write outbound message: {e}");
        }
    }
}

/// Run the host loop until stdin closes.
///
/// Each decoded message is dispatched to the board, then pending
/// notifications are drained so delimiter handlers observe the data that
/// triggered them. Blank lines are skipped; undecodable lines are logged and
/// skipped.
pub fn run_host_loop(board: &mut Board) {
    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("error reading stdin: {e}");
                break;
            }
        };

        let msg = match bitsim_protocol::decode_line(&line) {
            Ok(msg) => msg,
            Err(ProtocolError::EmptyLine) => continue,
            Err(e) => {
                log::warn!("skipping undecodable line: {e}");
                continue;
            }
        };

        board.handle_message(&msg);
        board.run_pending();
    }

    log::info!("stdin closed, host loop exiting");
}
