//! Named logger
//!
//! Filters by level, formats once, and fans the record out to its sinks.
//! Sink failures are counted and reported on the diagnostic channel; a
//! logger call never panics and never returns an error to the call site.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use lumber_sinks::RecordSink;

use crate::format;
use crate::level::Level;

/// A named logger writing through one or more sinks
pub struct Logger {
    name: String,
    level: AtomicU8,
    sinks: Vec<Arc<dyn RecordSink>>,
    write_errors: AtomicU64,
}

impl Logger {
    /// Create a logger over the given sinks
    pub fn new(name: impl Into<String>, level: Level, sinks: Vec<Arc<dyn RecordSink>>) -> Self {
        Self {
            name: name.into(),
            level: AtomicU8::new(level as u8),
            sinks,
            write_errors: AtomicU64::new(0),
        }
    }

    /// The logger's registered name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current level threshold
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Change the level threshold
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether a record at `level` would be written
    pub fn should_log(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Write one record at `level`
    pub fn log(&self, level: Level, message: &str) {
        if !self.should_log(level) {
            return;
        }
        let record = format::format_record(&self.name, level, message);
        for sink in &self.sinks {
            if let Err(err) = sink.write(record.as_bytes()) {
                self.write_errors.fetch_add(1, Ordering::Relaxed);
                tracing::error!(logger = %self.name, error = %err, "sink write failed");
            }
        }
    }

    /// Write a Debug record
    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    /// Write an Info record
    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    /// Write a Warn record
    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    /// Write an Error record
    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    /// Write a Critical record
    pub fn critical(&self, message: &str) {
        self.log(Level::Critical, message);
    }

    /// Flush every sink
    pub fn flush(&self) {
        for sink in &self.sinks {
            if let Err(err) = sink.flush() {
                tracing::error!(logger = %self.name, error = %err, "sink flush failed");
            }
        }
    }

    /// Sinks this logger writes through
    pub fn sinks(&self) -> &[Arc<dyn RecordSink>] {
        &self.sinks
    }

    /// Sink writes that failed since construction
    pub fn write_error_count(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }
}
