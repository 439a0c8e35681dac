use std::sync::Arc;

use anyhow::{Context, Result};
use bitsim::host::StdoutTransport;
use bitsim::{Board, host};
use bitsim_serial::SerialConfig;

/// Load the serial configuration from an optional TOML file path given as
/// the first CLI argument.
fn load_config() -> Result<SerialConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            toml::from_str(&raw).with_context(|| format!("parsing config file {path}"))
        }
        None => Ok(SerialConfig::default()),
    }
}

fn main() -> Result<()> {
    // Logging first; everything after this point reports through the facade.
    bitsim::debug::init_log_bridge();

    let config = load_config()?;
    let session = std::env::var("BITSIM_SESSION").unwrap_or_else(|_| "bitsim-0".to_string());
    log::info!("Starting bitsim serial host (session {session})");

    let mut board = Board::with_config(&session, config, Some(Arc::new(StdoutTransport::new())));

    host::run_host_loop(&mut board);
    Ok(())
}
