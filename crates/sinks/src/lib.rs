//! Lumber - Sinks
//!
//! Size-rotating file sinks with staged compressed retention.
//!
//! The active file lives at its base path; once it crosses the size bound
//! the sink shifts a bounded chain of rotated files up by one index and
//! hands the just-rotated file to an independently bounded chain of
//! compressed archives. Retention bookkeeping can fail without taking the
//! write path down: a broken rename degrades to truncation, a broken
//! compression leaves the rotated file in place, and both are counted and
//! reported.
//!
//! ```text
//! [producer] -> write() -> [size check] -> rotate -> stage -> [append]
//!                               |            app.1.log  app.1.log.lz4
//!                             no-op
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lumber_sinks::{RotatingFileSinkMt, RotationPolicy};
//!
//! let policy = RotationPolicy::new(200 * 1024 * 1024, 3, 2)?;
//! let sink = RotatingFileSinkMt::create("logs/app.log", policy)?;
//! sink.write(b"[2025-01-15 10:30:45.123] [app] [I] [1] started\n")?;
//! sink.flush()?;
//! # Ok::<(), lumber_sinks::SinkError>(())
//! ```

/// Rotating file sink, naming policy, rotation and archive chains
pub mod rotating;

/// Background worker with a bounded, lossy handoff queue
pub mod worker;

/// Shared utilities (lock policy, rate-limited reporting)
pub mod util;

/// Common types shared by all sinks (interface, errors)
mod common;

pub use common::{RecordSink, Result, SinkError};
pub use rotating::{
    Compressor, Lz4Compressor, NoopCompressor, RotatingFileSink, RotatingFileSinkMt,
    RotatingFileSinkSt, RotatingSinkMetrics, RotatingSinkSnapshot, RotationPolicy,
    MAX_ROTATED_FILES_LIMIT,
};
pub use worker::{AsyncSink, WorkerConfig, WorkerMetrics, WorkerSnapshot};
