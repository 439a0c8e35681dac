//! Tunable knobs for the serial endpoint.

use serde::Deserialize;

/// Character count above which the transmit buffer is flushed even without a
/// newline.
pub const DEFAULT_TX_FLUSH_THRESHOLD: usize = 16;

/// Buffer length returned by the raw read stub when the caller passes a
/// non-positive length.
pub const DEFAULT_RAW_READ_LEN: usize = 64;

/// Serial endpoint configuration.
///
/// Every field has a default, so a host config file can set any subset:
///
/// ```toml
/// tx_flush_threshold = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    /// Flush the transmit buffer once it holds more than this many characters,
    /// even if no newline has been written.
    pub tx_flush_threshold: usize,

    /// Length of the zero-filled buffer returned by `read_buffer` when the
    /// requested length is non-positive.
    pub raw_read_len: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            tx_flush_threshold: DEFAULT_TX_FLUSH_THRESHOLD,
            raw_read_len: DEFAULT_RAW_READ_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_yields_defaults() {
        let config: SerialConfig = toml::from_str("").unwrap();
        assert_eq!(config, SerialConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config: SerialConfig = toml::from_str("tx_flush_threshold = 8").unwrap();
        assert_eq!(config.tx_flush_threshold, 8);
        assert_eq!(config.raw_read_len, DEFAULT_RAW_READ_LEN);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: Result<SerialConfig, _> = toml::from_str("baud_rate = 115200");
        assert!(result.is_err());
    }
}
