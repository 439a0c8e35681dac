//! The serial endpoint: one half-duplex serial line on a simulated board.

use std::collections::HashSet;
use std::sync::Arc;

use bitsim_protocol::{CsvKind, SerialMessage, SimMessage};

use crate::config::SerialConfig;
use crate::delimiter::normalize_delimiter;
use crate::events::{EVT_DELIM_MATCH, EventSink, ID_SERIAL};
use crate::transport::Transport;

/// Stateful owner of the receive/transmit buffers and delimiter
/// registrations for one simulated serial channel.
///
/// Created once per board session and discarded with it. Collaborators are
/// injected at construction and not owned; when a handle is absent the
/// corresponding side effect is skipped silently rather than treated as an
/// error.
pub struct SerialEndpoint {
    /// Owning session identifier, stamped on outbound messages.
    session_id: String,
    config: SerialConfig,
    /// Received characters not yet drained by a consumer. Append-only until
    /// `read_serial`/`read_until` removes a prefix; order is preserved
    /// exactly.
    rx_buffer: String,
    /// Registered delimiters, normalized form only. Grow-only; duplicates
    /// collapse.
    delimiters: HashSet<String>,
    /// Written characters awaiting a coalesced flush to the transport.
    tx_buffer: String,
    transport: Option<Arc<dyn Transport>>,
    events: Option<Arc<dyn EventSink>>,
}

impl SerialEndpoint {
    /// Create an endpoint with default configuration.
    pub fn new(
        session_id: impl Into<String>,
        transport: Option<Arc<dyn Transport>>,
        events: Option<Arc<dyn EventSink>>,
    ) -> Self {
        Self::with_config(session_id, SerialConfig::default(), transport, events)
    }

    /// Create an endpoint with explicit configuration.
    pub fn with_config(
        session_id: impl Into<String>,
        config: SerialConfig,
        transport: Option<Arc<dyn Transport>>,
        events: Option<Arc<dyn EventSink>>,
    ) -> Self {
        let session_id = session_id.into();
        log::info!(
            "Creating serial endpoint for session {} (flush threshold {})",
            session_id,
            config.tx_flush_threshold
        );
        Self {
            session_id,
            config,
            rx_buffer: String::new(),
            delimiters: HashSet::new(),
            tx_buffer: String::new(),
            transport,
            events,
        }
    }

    /// Dispatch one inbound host message.
    ///
    /// Only serial messages are meaningful here; the payload text (empty if
    /// the host omitted it) is forwarded to [`receive_data`].
    ///
    /// [`receive_data`]: SerialEndpoint::receive_data
    pub fn handle_message(&mut self, msg: &SimMessage) {
        let SimMessage::Serial(serial) = msg;
        self.receive_data(&serial.data);
    }

    /// Append received characters and scan for registered delimiters.
    ///
    /// Empty input is a no-op. Otherwise `data` is appended verbatim —
    /// nothing is dropped or truncated, arbitrary text is accepted as-is.
    /// After the append, every registered delimiter is tested for substring
    /// containment against the entire buffer, and each contained delimiter
    /// posts one delimiter-match notification. The scan never stops at the
    /// first match, so several distinct delimiters can fire from one call.
    ///
    /// Containment, not edge-triggering: a delimiter already sitting
    /// unconsumed in the buffer fires again on every subsequent call, even
    /// when the appended data is unrelated. Consumers that want at most one
    /// notification per occurrence must drain past the delimiter with
    /// [`read_until`] before more data arrives.
    ///
    /// [`read_until`]: SerialEndpoint::read_until
    pub fn receive_data(&mut self, data: &str) {
        if data.is_empty() {
            return;
        }

        self.rx_buffer.push_str(data);
        log::trace!(
            "serial rx {}: +{} bytes, {} buffered",
            self.session_id,
            data.len(),
            self.rx_buffer.len()
        );

        // Scan order across distinct delimiters is unspecified, but the scan
        // always runs after the full append.
        for delim in &self.delimiters {
            if self.rx_buffer.contains(delim.as_str()) {
                Self::raise_delim_match(&self.events, &self.session_id);
            }
        }
    }

    /// Drain the entire receive buffer.
    ///
    /// Returns everything buffered (possibly empty) and resets the buffer.
    pub fn read_serial(&mut self) -> String {
        std::mem::take(&mut self.rx_buffer)
    }

    /// Drain up to the first occurrence of a delimiter.
    ///
    /// The delimiter is normalized first; an empty normalized form drains
    /// everything, exactly like [`read_serial`]. When the delimiter is found,
    /// the text before it is returned and the delimiter itself is consumed
    /// and discarded. When it is not found, the buffer is left untouched and
    /// the result is empty — there is no partial consumption.
    ///
    /// [`read_serial`]: SerialEndpoint::read_serial
    pub fn read_until(&mut self, delimiter: &str) -> String {
        let delim = normalize_delimiter(delimiter);
        if delim.is_empty() {
            return self.read_serial();
        }

        match self.rx_buffer.find(delim) {
            None => String::new(),
            Some(at) => {
                let rest = self.rx_buffer.split_off(at + delim.len());
                let mut head = std::mem::replace(&mut self.rx_buffer, rest);
                head.truncate(at);
                head
            }
        }
    }

    /// Register a delimiter to be watched for in received data.
    ///
    /// Empty input is a no-op. The delimiter is normalized and added to the
    /// set (re-registering is a storage no-op). Registration then performs a
    /// catch-up check: if the delimiter is already present in the buffered
    /// data, one notification is posted immediately, so a consumer that
    /// registers after matching data arrived still observes the event.
    pub fn register_delimiter(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }

        let delim = normalize_delimiter(raw);
        if self.delimiters.insert(delim.to_string()) {
            log::debug!(
                "serial {}: registered delimiter {:?}",
                self.session_id,
                delim
            );
        }

        if self.rx_buffer.contains(delim) {
            Self::raise_delim_match(&self.events, &self.session_id);
        }
    }

    /// Write program output, coalescing into line-sized or size-bounded
    /// chunks.
    ///
    /// The text accumulates until it contains a newline or grows past the
    /// configured threshold; either condition flushes the whole accumulation
    /// to the transport as one outbound message. This bounds message-post
    /// frequency while keeping line-oriented output prompt, and bounds memory
    /// for writers that never emit a newline.
    pub fn write_serial(&mut self, s: &str) {
        self.tx_buffer.push_str(s);
        if self.tx_buffer.contains('\n')
            || self.tx_buffer.chars().count() > self.config.tx_flush_threshold
        {
            self.flush_tx();
        }
    }

    /// Post CSV telemetry straight to the transport, bypassing coalescing.
    pub fn write_csv(&mut self, s: &str, kind: CsvKind) {
        if let Some(transport) = &self.transport {
            transport.post(SimMessage::Serial(SerialMessage::csv(
                &self.session_id,
                s.to_string(),
                kind,
            )));
        }
    }

    /// Raw byte read stub.
    ///
    /// Returns a zero-filled buffer of the requested length, with
    /// non-positive lengths clamped to the configured default. Kept separate
    /// from the text path: this never consumes from the receive buffer.
    pub fn read_buffer(&self, length: i32) -> Vec<u8> {
        let len = if length <= 0 {
            self.config.raw_read_len
        } else {
            length as usize
        };
        vec![0; len]
    }

    /// Received characters awaiting a drain. Diagnostic view; draining goes
    /// through [`read_serial`]/[`read_until`].
    ///
    /// [`read_serial`]: SerialEndpoint::read_serial
    /// [`read_until`]: SerialEndpoint::read_until
    pub fn pending_rx(&self) -> &str {
        &self.rx_buffer
    }

    /// Written characters awaiting a coalesced flush.
    pub fn pending_tx(&self) -> &str {
        &self.tx_buffer
    }

    /// Owning session identifier.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn flush_tx(&mut self) {
        // The accumulation resets even with no transport attached, so an
        // unwired endpoint cannot grow without bound.
        let payload = std::mem::take(&mut self.tx_buffer);
        log::trace!(
            "serial tx {}: flushing {} bytes",
            self.session_id,
            payload.len()
        );
        if let Some(transport) = &self.transport {
            transport.post(SimMessage::Serial(SerialMessage::text(
                &self.session_id,
                payload,
            )));
        }
    }

    // Free function over the injected handle so callers can raise while
    // iterating the delimiter set.
    fn raise_delim_match(events: &Option<Arc<dyn EventSink>>, session_id: &str) {
        if let Some(events) = events {
            log::trace!("serial {}: delimiter match", session_id);
            events.raise(ID_SERIAL, EVT_DELIM_MATCH);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts notifications raised by the endpoint.
    #[derive(Default)]
    struct CountingSink {
        raised: AtomicUsize,
    }

    impl EventSink for CountingSink {
        fn raise(&self, source: u16, event: u16) {
            assert_eq!((source, event), (ID_SERIAL, EVT_DELIM_MATCH));
            self.raised.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl CountingSink {
        fn count(&self) -> usize {
            self.raised.load(Ordering::SeqCst)
        }
    }

    /// Records messages posted to the transport.
    #[derive(Default)]
    struct RecordingTransport {
        posted: Mutex<Vec<SimMessage>>,
    }

    impl Transport for RecordingTransport {
        fn post(&self, msg: SimMessage) {
            self.posted.lock().unwrap().push(msg);
        }
    }

    impl RecordingTransport {
        fn drain(&self) -> Vec<SimMessage> {
            std::mem::take(&mut self.posted.lock().unwrap())
        }
    }

    fn endpoint_with_sink() -> (SerialEndpoint, Arc<CountingSink>) {
        let sink = Arc::new(CountingSink::default());
        let endpoint = SerialEndpoint::new("test", None, Some(sink.clone()));
        (endpoint, sink)
    }

    fn endpoint_with_transport() -> (SerialEndpoint, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let endpoint = SerialEndpoint::new("test", Some(transport.clone()), None);
        (endpoint, transport)
    }

    #[test]
    fn test_receive_empty_is_noop() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.register_delimiter("\\n");
        endpoint.receive_data("");
        assert_eq!(endpoint.pending_rx(), "");
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_receive_appends_in_order() {
        let (mut endpoint, _sink) = endpoint_with_sink();
        endpoint.receive_data("hello ");
        endpoint.receive_data("world");
        assert_eq!(endpoint.read_serial(), "hello world");
        assert_eq!(endpoint.read_serial(), "");
    }

    #[test]
    fn test_escape_spelled_delimiter_matches_real_newline() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.register_delimiter("\\n");
        endpoint.receive_data("hello\n");
        assert_eq!(sink.count(), 1);
        assert_eq!(endpoint.read_until("\n"), "hello");
        assert_eq!(endpoint.pending_rx(), "");
    }

    #[test]
    fn test_crlf_escape_form() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.register_delimiter("\\r\\n");
        endpoint.receive_data("AT+OK\r\n");
        assert_eq!(sink.count(), 1);
        assert_eq!(endpoint.read_until("\\r\\n"), "AT+OK");
    }

    #[test]
    fn test_read_until_no_match_leaves_buffer_untouched() {
        let (mut endpoint, _sink) = endpoint_with_sink();
        endpoint.receive_data("partial line");
        assert_eq!(endpoint.read_until("\n"), "");
        assert_eq!(endpoint.pending_rx(), "partial line");
    }

    #[test]
    fn test_read_until_consumes_delimiter_and_keeps_suffix() {
        let (mut endpoint, _sink) = endpoint_with_sink();
        endpoint.receive_data("first;second;third");
        assert_eq!(endpoint.read_until(";"), "first");
        assert_eq!(endpoint.pending_rx(), "second;third");
        assert_eq!(endpoint.read_until(";"), "second");
        assert_eq!(endpoint.pending_rx(), "third");
    }

    #[test]
    fn test_read_until_empty_delimiter_drains_everything() {
        let (mut endpoint, _sink) = endpoint_with_sink();
        endpoint.receive_data("abc");
        assert_eq!(endpoint.read_until(""), "abc");
        assert_eq!(endpoint.pending_rx(), "");
    }

    #[test]
    fn test_register_empty_is_noop() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.receive_data("data\n");
        endpoint.register_delimiter("");
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_catch_up_notification_on_late_registration() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.receive_data("already here\n");
        assert_eq!(sink.count(), 0);
        endpoint.register_delimiter("\\n");
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn test_reregistering_still_runs_catch_up() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.register_delimiter("\\n");
        endpoint.receive_data("line\n");
        assert_eq!(sink.count(), 1);
        // Storage no-op, but the catch-up check still fires.
        endpoint.register_delimiter("\\n");
        assert_eq!(sink.count(), 2);
    }

    #[test]
    fn test_undrained_delimiter_refires_on_every_receive() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.register_delimiter("\\n");
        endpoint.receive_data("line\n");
        assert_eq!(sink.count(), 1);

        // Containment, not edge-triggering: unrelated data re-fires while the
        // newline sits unconsumed.
        endpoint.receive_data("x");
        endpoint.receive_data("y");
        assert_eq!(sink.count(), 3);

        // Draining past the delimiter stops the re-fire.
        endpoint.read_until("\n");
        endpoint.receive_data("z");
        assert_eq!(sink.count(), 3);
    }

    #[test]
    fn test_multiple_delimiters_fire_independently() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.register_delimiter(";");
        endpoint.register_delimiter("\\n");
        endpoint.receive_data("a;b\n");
        assert_eq!(sink.count(), 2);
    }

    #[test]
    fn test_write_serial_coalesces_until_threshold() {
        let (mut endpoint, transport) = endpoint_with_transport();
        // 16 chars: at the threshold, not over it.
        for _ in 0..8 {
            endpoint.write_serial("ab");
        }
        assert!(transport.drain().is_empty());
        assert_eq!(endpoint.pending_tx().len(), 16);

        // 18 chars: over the threshold, flushes everything accumulated.
        endpoint.write_serial("ab");
        let posted = transport.drain();
        assert_eq!(posted.len(), 1);
        let SimMessage::Serial(serial) = &posted[0];
        assert_eq!(serial.data, "ab".repeat(9));
        assert_eq!(serial.id.as_deref(), Some("test"));
        assert!(serial.sim);
        assert_eq!(endpoint.pending_tx(), "");
    }

    #[test]
    fn test_write_serial_newline_flushes_immediately() {
        let (mut endpoint, transport) = endpoint_with_transport();
        endpoint.write_serial("hi\n");
        let posted = transport.drain();
        assert_eq!(posted.len(), 1);
        let SimMessage::Serial(serial) = &posted[0];
        assert_eq!(serial.data, "hi\n");
    }

    #[test]
    fn test_write_csv_bypasses_coalescing() {
        let (mut endpoint, transport) = endpoint_with_transport();
        endpoint.write_csv("a,b", CsvKind::Row);
        let posted = transport.drain();
        assert_eq!(posted.len(), 1);
        let SimMessage::Serial(serial) = &posted[0];
        assert_eq!(serial.data, "a,b");
        assert_eq!(serial.csv_kind, Some(CsvKind::Row));
        assert_eq!(endpoint.pending_tx(), "");
    }

    #[test]
    fn test_read_buffer_clamps_and_zero_fills() {
        let (endpoint, _sink) = endpoint_with_sink();
        assert_eq!(endpoint.read_buffer(0).len(), 64);
        assert_eq!(endpoint.read_buffer(-5).len(), 64);
        let buf = endpoint.read_buffer(10);
        assert_eq!(buf.len(), 10);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_buffer_does_not_touch_rx() {
        let (mut endpoint, _sink) = endpoint_with_sink();
        endpoint.receive_data("keep me");
        let _ = endpoint.read_buffer(4);
        assert_eq!(endpoint.pending_rx(), "keep me");
    }

    #[test]
    fn test_absent_collaborators_are_skipped_silently() {
        let mut endpoint = SerialEndpoint::new("bare", None, None);
        endpoint.register_delimiter("\\n");
        endpoint.receive_data("line\n");
        endpoint.write_serial("out\n");
        endpoint.write_csv("a,b", CsvKind::Row);
        // Flush semantics still hold without a transport.
        assert_eq!(endpoint.pending_tx(), "");
        assert_eq!(endpoint.read_until("\n"), "line");
    }

    #[test]
    fn test_handle_message_forwards_serial_payload() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.register_delimiter("\\n");
        let msg = bitsim_protocol::decode_line(r#"{"type":"serial","data":"ping\n"}"#).unwrap();
        endpoint.handle_message(&msg);
        assert_eq!(sink.count(), 1);
        assert_eq!(endpoint.pending_rx(), "ping\n");
    }

    #[test]
    fn test_handle_message_missing_data_is_noop() {
        let (mut endpoint, sink) = endpoint_with_sink();
        endpoint.register_delimiter("\\n");
        let msg = bitsim_protocol::decode_line(r#"{"type":"serial"}"#).unwrap();
        endpoint.handle_message(&msg);
        assert_eq!(endpoint.pending_rx(), "");
        assert_eq!(sink.count(), 0);
    }
}
