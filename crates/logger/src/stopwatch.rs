//! Scoped elapsed-time reporting
//!
//! RAII timer: construction takes the start time, dropping it writes the
//! elapsed milliseconds through a logger at Critical, so the measurement
//! survives early returns and unwinding alike.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::logger::Logger;

/// Timer that reports on drop
///
/// ```no_run
/// # use std::sync::Arc;
/// # use lumber_logger::{Logger, Stopwatch};
/// # fn rebuild_index(logger: Arc<Logger>) {
/// let _watch = Stopwatch::with_label(logger, "index rebuild");
/// // ... work ...
/// // drop writes: "index rebuild elapsed:148ms"
/// # }
/// ```
pub struct Stopwatch {
    started: Instant,
    logger: Arc<Logger>,
    label: Option<String>,
}

impl Stopwatch {
    /// Start an unlabeled timer
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            started: Instant::now(),
            logger,
            label: None,
        }
    }

    /// Start a labeled timer
    pub fn with_label(logger: Arc<Logger>, label: impl Into<String>) -> Self {
        Self {
            started: Instant::now(),
            logger,
            label: Some(label.into()),
        }
    }

    /// Time elapsed since construction
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        let ms = self.started.elapsed().as_millis();
        let message = match self.label.take() {
            Some(label) => format!("{label} elapsed:{ms}ms"),
            None => format!("elapsed:{ms}ms"),
        };
        self.logger.critical(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use lumber_sinks::{RecordSink, Result};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CapturingSink {
        records: Mutex<Vec<String>>,
    }

    impl RecordSink for CapturingSink {
        fn write(&self, record: &[u8]) -> Result<()> {
            self.records
                .lock()
                .push(String::from_utf8_lossy(record).into_owned());
            Ok(())
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }
    }

    fn capturing_logger() -> (Arc<Logger>, Arc<CapturingSink>) {
        let sink = Arc::new(CapturingSink::default());
        let logger = Arc::new(Logger::new(
            "timing",
            Level::Info,
            vec![Arc::clone(&sink) as _],
        ));
        (logger, sink)
    }

    #[test]
    fn test_drop_reports_at_critical() {
        let (logger, sink) = capturing_logger();

        {
            let _watch = Stopwatch::with_label(Arc::clone(&logger), "index rebuild");
            std::thread::sleep(Duration::from_millis(5));
        }

        let records = sink.records.lock();
        assert_eq!(records.len(), 1);
        assert!(records[0].contains("[C]"));
        assert!(records[0].contains("index rebuild elapsed:"));
        assert!(records[0].trim_end().ends_with("ms"));
    }

    #[test]
    fn test_unlabeled_report() {
        let (logger, sink) = capturing_logger();

        drop(Stopwatch::new(Arc::clone(&logger)));

        let records = sink.records.lock();
        assert!(records[0].contains("] elapsed:"));
    }

    #[test]
    fn test_elapsed_grows() {
        let (logger, _sink) = capturing_logger();
        let watch = Stopwatch::new(logger);
        std::thread::sleep(Duration::from_millis(2));
        assert!(watch.elapsed() >= Duration::from_millis(2));
    }
}
