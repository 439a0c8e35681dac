//! The simulated board session.

use std::sync::Arc;

use bitsim_protocol::SimMessage;
use bitsim_serial::{EventSink, SerialConfig, SerialEndpoint, Transport};

use crate::bus::EventBus;

/// One simulated board session: the serial endpoint plus the event bus it
/// raises into.
///
/// The session handle is injected everywhere it is needed at construction
/// time; nothing reaches for a process-wide "current board" singleton.
pub struct Board {
    bus: Arc<EventBus>,
    serial: SerialEndpoint,
}

impl Board {
    /// Create a board session with default serial configuration.
    pub fn new(session_id: impl Into<String>, transport: Option<Arc<dyn Transport>>) -> Self {
        Self::with_config(session_id, SerialConfig::default(), transport)
    }

    /// Create a board session with explicit serial configuration.
    pub fn with_config(
        session_id: impl Into<String>,
        config: SerialConfig,
        transport: Option<Arc<dyn Transport>>,
    ) -> Self {
        let bus = Arc::new(EventBus::new());
        let events: Arc<dyn EventSink> = bus.clone();
        let serial = SerialEndpoint::with_config(session_id, config, transport, Some(events));
        Self { bus, serial }
    }

    /// The board event bus.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The serial endpoint.
    pub fn serial(&self) -> &SerialEndpoint {
        &self.serial
    }

    /// The serial endpoint, mutably.
    pub fn serial_mut(&mut self) -> &mut SerialEndpoint {
        &mut self.serial
    }

    /// Dispatch one inbound host message to the owning peripheral.
    pub fn handle_message(&mut self, msg: &SimMessage) {
        self.serial.handle_message(msg);
    }

    /// Drain pending notifications, running registered handlers. Returns the
    /// number of notifications dispatched.
    pub fn run_pending(&self) -> usize {
        self.bus.run_pending()
    }
}
