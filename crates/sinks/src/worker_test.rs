//! Tests for the background worker

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use crate::common::{RecordSink, Result};
use crate::rotating::{NoopCompressor, RotatingFileSink, RotatingFileSinkMt, RotationPolicy};
use crate::worker::{AsyncSink, WorkerConfig};

/// Sink stub that can be slowed down to fill the queue
struct StubSink {
    writes: AtomicU64,
    flushes: AtomicU64,
    delay: Duration,
}

impl StubSink {
    fn new(delay: Duration) -> Self {
        Self {
            writes: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            delay,
        }
    }
}

impl RecordSink for StubSink {
    fn write(&self, _record: &[u8]) -> Result<()> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fn file_sink(base: &std::path::Path) -> Arc<RotatingFileSinkMt> {
    let policy = RotationPolicy::new(1024 * 1024, 2, 0).unwrap();
    Arc::new(RotatingFileSink::with_compressor(base, policy, Box::new(NoopCompressor)).unwrap())
}

#[test]
fn test_records_reach_the_file_through_the_worker() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("app.log");

    let worker = AsyncSink::spawn(file_sink(&base), WorkerConfig::default()).unwrap();
    for i in 0..20 {
        worker.write(format!("record {i:02}\n").as_bytes()).unwrap();
    }
    worker.shutdown();

    let content = std::fs::read_to_string(&base).unwrap();
    assert_eq!(content.lines().count(), 20);
    assert!(content.starts_with("record 00\n"));
    assert!(content.ends_with("record 19\n"));
}

#[test]
fn test_shutdown_drains_the_queue() {
    let stub = Arc::new(StubSink::new(Duration::ZERO));
    let worker = AsyncSink::spawn(
        Arc::clone(&stub) as Arc<dyn RecordSink>,
        WorkerConfig {
            queue_size: 256,
            flush_interval: Duration::from_secs(10),
        },
    )
    .unwrap();

    for _ in 0..100 {
        worker.write(b"queued").unwrap();
    }
    worker.shutdown();

    // every accepted record was written before the thread stopped
    assert_eq!(stub.writes.load(Ordering::Relaxed), 100);
    // final flush always runs
    assert!(stub.flushes.load(Ordering::Relaxed) >= 1);
}

#[test]
fn test_overload_drops_newest_and_never_blocks() {
    let stub = Arc::new(StubSink::new(Duration::from_millis(20)));
    let worker = AsyncSink::spawn(
        Arc::clone(&stub) as Arc<dyn RecordSink>,
        WorkerConfig {
            queue_size: 2,
            flush_interval: Duration::from_secs(10),
        },
    )
    .unwrap();

    // the slow sink keeps the tiny queue full almost immediately
    for _ in 0..50 {
        worker.write(b"burst").unwrap();
    }

    let snapshot = worker.metrics().snapshot();
    assert!(snapshot.records_dropped > 0, "overload must drop records");
    assert_eq!(snapshot.records_queued + snapshot.records_dropped, 50);

    worker.shutdown();
    // dropped records never reach the sink
    assert_eq!(
        stub.writes.load(Ordering::Relaxed),
        snapshot.records_queued
    );
}

#[test]
fn test_flush_request_reaches_the_sink() {
    let stub = Arc::new(StubSink::new(Duration::ZERO));
    let worker = AsyncSink::spawn(
        Arc::clone(&stub) as Arc<dyn RecordSink>,
        WorkerConfig {
            queue_size: 16,
            flush_interval: Duration::from_secs(10),
        },
    )
    .unwrap();

    worker.write(b"one").unwrap();
    worker.flush().unwrap();

    // flush is ordered behind the record in the same queue
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while stub.flushes.load(Ordering::Relaxed) == 0 {
        assert!(std::time::Instant::now() < deadline, "flush never arrived");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(stub.writes.load(Ordering::Relaxed), 1);

    worker.shutdown();
}

#[test]
fn test_periodic_flush_fires_after_writes() {
    let stub = Arc::new(StubSink::new(Duration::ZERO));
    let worker = AsyncSink::spawn(
        Arc::clone(&stub) as Arc<dyn RecordSink>,
        WorkerConfig {
            queue_size: 16,
            flush_interval: Duration::from_millis(10),
        },
    )
    .unwrap();

    worker.write(b"dirty").unwrap();

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while stub.flushes.load(Ordering::Relaxed) == 0 {
        assert!(
            std::time::Instant::now() < deadline,
            "periodic flush never fired"
        );
        std::thread::sleep(Duration::from_millis(5));
    }

    worker.shutdown();
}

#[test]
fn test_drop_joins_the_worker() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("app.log");

    {
        let worker = AsyncSink::spawn(file_sink(&base), WorkerConfig::default()).unwrap();
        worker.write(b"flushed on drop\n").unwrap();
    }

    assert_eq!(std::fs::read(&base).unwrap(), b"flushed on drop\n");
}
