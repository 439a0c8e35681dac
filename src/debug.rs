//! Stderr log bridge.
//!
//! Routes the `log` facade to stderr with a timestamp, keeping stdout free
//! for the host protocol. Level comes from the `BITSIM_LOG` environment
//! variable (`error`, `warn`, `info`, `debug`, `trace`); unset or
//! unrecognized values default to `warn`.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{Level, LevelFilter, Metadata, Record};

struct StderrLogger {
    level: LevelFilter,
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:>12.3}] {} {}: {}",
            timestamp_secs(),
            tag,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

fn timestamp_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn level_from_env() -> LevelFilter {
    match std::env::var("BITSIM_LOG").as_deref() {
        Ok("error") => LevelFilter::Error,
        Ok("warn") => LevelFilter::Warn,
        Ok("info") => LevelFilter::Info,
        Ok("debug") => LevelFilter::Debug,
        Ok("trace") => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}

/// Install the stderr logger. Call once, before any logging. A second call
/// is a silent no-op (the facade rejects replacement loggers).
pub fn init_log_bridge() {
    let level = level_from_env();
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}
