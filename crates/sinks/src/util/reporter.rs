//! Rate-limited reporting of retention failures
//!
//! Rotation and compression failures are recovered locally and surfaced
//! as warnings on a side channel. Under a failure storm (locked log
//! directory, full disk) one warning per interval is enough; the rest are
//! counted and reported with the next warning.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default minimum interval between emitted warnings
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Warning reporter that suppresses repeats within an interval
pub struct RateLimitedReporter {
    min_interval: Duration,
    last_report: Mutex<Option<Instant>>,
    suppressed: AtomicU64,
    total: AtomicU64,
}

impl RateLimitedReporter {
    /// Create a reporter with the given minimum interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_report: Mutex::new(None),
            suppressed: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Report a recovered failure
    ///
    /// Emits a `tracing` warning unless one was emitted within the
    /// interval; suppressed reports are counted. Returns whether the
    /// warning was emitted.
    pub fn warn(&self, what: &str, error: &dyn fmt::Display) -> bool {
        let total = self.total.fetch_add(1, Ordering::Relaxed) + 1;

        let emit = {
            let mut last = self.last_report.lock();
            let now = Instant::now();
            match *last {
                Some(at) if now.duration_since(at) < self.min_interval => false,
                _ => {
                    *last = Some(now);
                    true
                }
            }
        };

        if emit {
            let suppressed = self.suppressed.swap(0, Ordering::Relaxed);
            tracing::warn!(error = %error, suppressed, total, "{what}");
        } else {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
        }
        emit
    }

    /// Failures recorded since construction
    pub fn total_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Failures swallowed since the last emitted warning
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }
}

impl Default for RateLimitedReporter {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_INTERVAL)
    }
}
