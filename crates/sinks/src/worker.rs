//! Non-blocking handoff in front of a sink
//!
//! Producers enqueue records; a single consumer thread owns the inner
//! sink exclusively and is the only place file I/O happens. The handoff
//! is bounded and lossy under overload: a full queue drops the newest
//! record and bumps an observable counter instead of stalling the
//! producer. Shutdown drains everything already queued, final-flushes,
//! and joins the thread.
//!
//! ```text
//! [producer] --try_send--> [bounded queue] --> [worker thread] --> [sink]
//!                \ full: count drop, return
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};

use crate::common::{RecordSink, Result, SinkError};
use crate::util::RateLimitedReporter;

/// Default bound on queued records
pub const DEFAULT_QUEUE_SIZE: usize = 8192;

/// Default interval between periodic flushes
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for the background worker
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bound on queued records; the queue never blocks a producer
    pub queue_size: usize,

    /// How often the worker flushes when records have been written
    pub flush_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

/// Counters for the worker queue
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    /// Records accepted into the queue
    pub records_queued: AtomicU64,

    /// Records dropped because the queue was full
    pub records_dropped: AtomicU64,

    /// Records the worker wrote to the inner sink
    pub records_written: AtomicU64,

    /// Writes the inner sink rejected
    pub write_errors: AtomicU64,

    /// Flushes performed (periodic and requested)
    pub flushes: AtomicU64,
}

impl WorkerMetrics {
    /// Create a zeroed metrics instance
    pub const fn new() -> Self {
        Self {
            records_queued: AtomicU64::new(0),
            records_dropped: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        }
    }

    /// Get a point-in-time snapshot
    pub fn snapshot(&self) -> WorkerSnapshot {
        WorkerSnapshot {
            records_queued: self.records_queued.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of worker counters
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerSnapshot {
    pub records_queued: u64,
    pub records_dropped: u64,
    pub records_written: u64,
    pub write_errors: u64,
    pub flushes: u64,
}

enum Command {
    Record(Vec<u8>),
    Flush,
}

/// Sink wrapper that moves all I/O onto a background thread
///
/// Implements [`RecordSink`] itself, so it can stand wherever the inner
/// sink stood. `write` never blocks and never fails on overload - the
/// drop counter in [`WorkerMetrics`] is the overload signal.
pub struct AsyncSink {
    sender: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    metrics: Arc<WorkerMetrics>,
}

impl AsyncSink {
    /// Spawn a worker thread that takes exclusive ownership of `sink`
    pub fn spawn(sink: Arc<dyn RecordSink>, config: WorkerConfig) -> Result<Self> {
        let (sender, receiver) = bounded(config.queue_size.max(1));
        let metrics = Arc::new(WorkerMetrics::new());
        let worker_metrics = Arc::clone(&metrics);
        let flush_interval = config.flush_interval;

        let worker = std::thread::Builder::new()
            .name("lumber-sink-worker".into())
            .spawn(move || run_worker(receiver, sink, flush_interval, worker_metrics))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            metrics,
        })
    }

    /// Live counters
    pub fn metrics(&self) -> &WorkerMetrics {
        &self.metrics
    }

    /// Counters handle that stays valid after the worker is dropped
    pub fn metrics_handle(&self) -> Arc<WorkerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Wait for all queued records to be written and flushed
    ///
    /// Consumes the wrapper: drops the queue, lets the worker drain, and
    /// joins it. Dropping the wrapper does the same implicitly.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl RecordSink for AsyncSink {
    fn write(&self, record: &[u8]) -> Result<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(SinkError::WorkerStopped);
        };
        match sender.try_send(Command::Record(record.to_vec())) {
            Ok(()) => {
                self.metrics.records_queued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                // lossy by design: newest record dropped, producer not stalled
                self.metrics.records_dropped.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(SinkError::WorkerStopped),
        }
    }

    fn flush(&self) -> Result<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(SinkError::WorkerStopped);
        };
        sender
            .send(Command::Flush)
            .map_err(|_| SinkError::WorkerStopped)
    }
}

impl Drop for AsyncSink {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn run_worker(
    receiver: Receiver<Command>,
    sink: Arc<dyn RecordSink>,
    flush_interval: Duration,
    metrics: Arc<WorkerMetrics>,
) {
    let reporter = RateLimitedReporter::default();
    let mut dirty = false;

    loop {
        match receiver.recv_timeout(flush_interval) {
            Ok(Command::Record(record)) => match sink.write(&record) {
                Ok(()) => {
                    metrics.records_written.fetch_add(1, Ordering::Relaxed);
                    dirty = true;
                }
                Err(err) => {
                    metrics.write_errors.fetch_add(1, Ordering::Relaxed);
                    reporter.warn("sink write failed", &err);
                }
            },
            Ok(Command::Flush) => {
                flush_sink(&sink, &metrics, &reporter);
                dirty = false;
            }
            Err(RecvTimeoutError::Timeout) => {
                if dirty {
                    flush_sink(&sink, &metrics, &reporter);
                    dirty = false;
                }
            }
            // all senders gone and the queue fully drained
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    flush_sink(&sink, &metrics, &reporter);
    tracing::debug!("sink worker drained and stopped");
}

fn flush_sink(sink: &Arc<dyn RecordSink>, metrics: &WorkerMetrics, reporter: &RateLimitedReporter) {
    match sink.flush() {
        Ok(()) => {
            metrics.flushes.fetch_add(1, Ordering::Relaxed);
        }
        Err(err) => {
            reporter.warn("sink flush failed", &err);
        }
    }
}

#[cfg(test)]
#[path = "worker_test.rs"]
mod worker_test;
