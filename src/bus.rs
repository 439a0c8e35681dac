//! Board event bus.
//!
//! Peripherals raise fixed (source, event) pairs into a pending queue;
//! user code registers handlers for pairs it cares about; the host loop
//! drains the queue between inbound messages. Raising never runs handlers
//! inline — the queue is the suspension point the synchronous core does not
//! have.

use std::collections::VecDeque;

use bitsim_serial::EventSink;
use parking_lot::Mutex;

type Handler = Box<dyn FnMut() + Send>;

struct Listener {
    source: u16,
    event: u16,
    /// Taken out of the slot while the handler runs, so the registry lock is
    /// never held across a handler call.
    handler: Option<Handler>,
}

/// Queue-and-dispatch event bus for one board session.
///
/// Interior-mutable so peripherals can raise through a shared handle while
/// the board owns everything else exclusively.
#[derive(Default)]
pub struct EventBus {
    pending: Mutex<VecDeque<(u16, u16)>>,
    listeners: Mutex<Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a (source, event) pair. Several handlers may
    /// listen on the same pair; each runs once per matching notification.
    ///
    /// Handlers may raise further notifications and may register new
    /// listeners; a listener added while a notification is being dispatched
    /// only runs for later notifications.
    pub fn listen(&self, source: u16, event: u16, handler: impl FnMut() + Send + 'static) {
        self.listeners.lock().push(Listener {
            source,
            event,
            handler: Some(Box::new(handler)),
        });
    }

    /// Number of queued notifications not yet dispatched.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Drain the pending queue in arrival order, running every matching
    /// handler for each notification. Returns the number of notifications
    /// dispatched.
    ///
    /// Notifications raised by a handler during the drain are queued and
    /// picked up by the same drain pass.
    pub fn run_pending(&self) -> usize {
        let mut dispatched = 0;
        loop {
            let next = self.pending.lock().pop_front();
            let Some((source, event)) = next else {
                break;
            };
            dispatched += 1;
            self.dispatch(source, event);
        }
        if dispatched > 0 {
            log::debug!("event bus: dispatched {dispatched} notification(s)");
        }
        dispatched
    }

    /// Run every listener matching one notification. The registry is
    /// append-only, so slot indices stay stable while the lock is released
    /// around each handler call.
    fn dispatch(&self, source: u16, event: u16) {
        // Listeners registered during this dispatch only see later
        // notifications.
        let end = self.listeners.lock().len();
        for idx in 0..end {
            let taken = {
                let mut listeners = self.listeners.lock();
                let listener = &mut listeners[idx];
                if listener.source == source && listener.event == event {
                    listener.handler.take()
                } else {
                    None
                }
            };
            if let Some(mut handler) = taken {
                handler();
                self.listeners.lock()[idx].handler = Some(handler);
            }
        }
    }
}

impl EventSink for EventBus {
    fn raise(&self, source: u16, event: u16) {
        log::trace!("event bus: queue ({source}, {event})");
        self.pending.lock().push_back((source, event));
    }
}
