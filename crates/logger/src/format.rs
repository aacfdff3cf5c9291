//! Record formatting
//!
//! One line per record:
//!
//! ```text
//! [2025-01-15 10:30:45.123] [net] [W] [3] connection reset, retrying
//! ```
//!
//! Timestamp, logger name, level tag, thread tag, message. Formatting
//! happens here, once, before fan-out; sinks append bytes and measure
//! length, they never reformat.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;

use crate::level::Level;

/// Render one record in the standard line format
pub fn format_record(name: &str, level: Level, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    format!(
        "[{timestamp}] [{name}] [{}] [{}] {message}\n",
        level.tag(),
        thread_tag()
    )
}

/// Small stable integer identifying the calling thread
///
/// Assigned on first use per thread; independent of OS thread ids, which
/// some platforms recycle.
pub fn thread_tag() -> u64 {
    static NEXT_TAG: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static TAG: u64 = NEXT_TAG.fetch_add(1, Ordering::Relaxed);
    }
    TAG.with(|tag| *tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_shape() {
        let record = format_record("net", Level::Warn, "connection reset");
        assert!(record.starts_with('['));
        assert!(record.contains("] [net] [W] ["));
        assert!(record.ends_with("connection reset\n"));
    }

    #[test]
    fn test_timestamp_has_millisecond_precision() {
        let record = format_record("app", Level::Info, "x");
        // [YYYY-MM-DD HH:MM:SS.mmm] - closing bracket at a fixed offset
        let close = record.find(']').unwrap();
        assert_eq!(close, 24);
        assert_eq!(&record[20..21], ".");
    }

    #[test]
    fn test_thread_tag_is_stable_within_a_thread() {
        assert_eq!(thread_tag(), thread_tag());
    }

    #[test]
    fn test_thread_tags_differ_across_threads() {
        let mine = thread_tag();
        let theirs = std::thread::spawn(thread_tag).join().unwrap();
        assert_ne!(mine, theirs);
    }
}
