//! Size-triggered rotating file sink with staged compressed retention
//!
//! The active file lives at the base path. When a write would push it past
//! the size bound, the sink flushes, re-measures, shifts the rotated chain
//! up by one index, hands the just-rotated file to the archive chain, and
//! reopens a fresh active file - all before the triggering record is
//! appended. Rotated files and archives are bounded independently; both
//! chains evict their oldest member by index shift, never by enumeration.
//!
//! # On-disk layout
//!
//! ```text
//! app.log          active (index 0)
//! app.1.log        newest rotated
//! app.2.log        oldest rotated
//! app.2.log.lz4    archives, independently numbered
//! ```
//!
//! # Failure posture
//!
//! The active write path stays available even when retention bookkeeping
//! fails. A rename chain that fails twice degrades to truncating the
//! active file (bounded disk usage wins over the pending data); a failed
//! compression leaves the rotated file in place. Both are recovered
//! locally, counted, and reported through a rate-limited side channel -
//! only real I/O errors on the active file reach the caller.

mod archive;
mod compress;
mod file_handle;
mod naming;
mod rotation;

pub use compress::{Compressor, Lz4Compressor, NoopCompressor};
pub use file_handle::FileHandle;
pub use naming::{archive_name, calc_name};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::{RecordSink, Result, SinkError};
use crate::util::{NoopRawMutex, RateLimitedReporter};

/// Upper bound on `max_rotated_files`
pub const MAX_ROTATED_FILES_LIMIT: usize = 200_000;

/// Retention policy, immutable once the sink is constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size threshold in bytes; a write that would cross it triggers
    /// rotation before the record is appended
    pub max_size: u64,

    /// Retained rotated files (0 truncates in place on rotation)
    pub max_rotated_files: usize,

    /// Retained archives (0 disables the archive chain)
    pub max_archives: usize,

    /// Rotate at construction when the file is already non-empty
    pub rotate_on_open: bool,
}

impl RotationPolicy {
    /// Create a validated policy
    pub fn new(max_size: u64, max_rotated_files: usize, max_archives: usize) -> Result<Self> {
        let policy = Self {
            max_size,
            max_rotated_files,
            max_archives,
            rotate_on_open: false,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Enable rotate-on-open
    #[must_use]
    pub fn rotate_on_open(mut self) -> Self {
        self.rotate_on_open = true;
        self
    }

    /// Reject unusable policy values
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(SinkError::config("max_size", "must be greater than zero"));
        }
        if self.max_rotated_files > MAX_ROTATED_FILES_LIMIT {
            return Err(SinkError::config(
                "max_rotated_files",
                format!("must not exceed {MAX_ROTATED_FILES_LIMIT}"),
            ));
        }
        Ok(())
    }
}

/// Counters for one rotating sink
#[derive(Debug, Default)]
pub struct RotatingSinkMetrics {
    /// Records appended to the active file
    pub records_written: AtomicU64,

    /// Bytes appended to the active file
    pub bytes_written: AtomicU64,

    /// Completed rotations
    pub rotations: AtomicU64,

    /// Rotations that degraded to truncating the active file
    pub rotation_failures: AtomicU64,

    /// Archives produced by the retention chain
    pub archives_created: AtomicU64,

    /// Staging attempts that left the rotated file uncompressed
    pub compression_failures: AtomicU64,
}

impl RotatingSinkMetrics {
    /// Create a zeroed metrics instance
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            rotation_failures: AtomicU64::new(0),
            archives_created: AtomicU64::new(0),
            compression_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    fn record_write(&self, bytes: u64) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot
    pub fn snapshot(&self) -> RotatingSinkSnapshot {
        RotatingSinkSnapshot {
            records_written: self.records_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_failures: self.rotation_failures.load(Ordering::Relaxed),
            archives_created: self.archives_created.load(Ordering::Relaxed),
            compression_failures: self.compression_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink counters
#[derive(Debug, Clone, Copy, Default)]
pub struct RotatingSinkSnapshot {
    pub records_written: u64,
    pub bytes_written: u64,
    pub rotations: u64,
    pub rotation_failures: u64,
    pub archives_created: u64,
    pub compression_failures: u64,
}

/// State serialized behind the sink's lock
struct SinkState {
    handle: FileHandle,
    active_size: u64,
    compressor: Box<dyn Compressor>,
}

/// Rotating file sink
///
/// Generic over the raw mutex so the locking strategy is chosen at the
/// type level: [`RotatingFileSinkMt`] serializes concurrent writers
/// through a real mutex, [`RotatingFileSinkSt`] pays nothing for a sink
/// owned by a single thread. All file-mutating operations (size check,
/// rotate, stage, write) run under the lock; a rotation always completes,
/// including reopening the active file, before the next write proceeds.
pub struct RotatingFileSink<R: lock_api::RawMutex = parking_lot::RawMutex> {
    state: lock_api::Mutex<R, SinkState>,
    base: PathBuf,
    policy: RotationPolicy,
    metrics: Arc<RotatingSinkMetrics>,
    reporter: RateLimitedReporter,
}

impl<R: lock_api::RawMutex> std::fmt::Debug for RotatingFileSink<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileSink")
            .field("base", &self.base)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Rotating sink safe to share between threads
pub type RotatingFileSinkMt = RotatingFileSink<parking_lot::RawMutex>;

/// Rotating sink for single-threaded exclusive ownership (`!Sync`)
pub type RotatingFileSinkSt = RotatingFileSink<NoopRawMutex>;

impl<R: lock_api::RawMutex> RotatingFileSink<R> {
    /// Open a sink with the default LZ4 archive compressor
    pub fn create(base: impl Into<PathBuf>, policy: RotationPolicy) -> Result<Self> {
        Self::with_compressor(base, policy, Box::new(Lz4Compressor))
    }

    /// Open a sink with a caller-supplied archive compressor
    pub fn with_compressor(
        base: impl Into<PathBuf>,
        policy: RotationPolicy,
        compressor: Box<dyn Compressor>,
    ) -> Result<Self> {
        policy.validate()?;
        let base = base.into();
        // fail fast on paths the rotation chain could never name
        naming::calc_name(&base, 1)?;

        let mut handle = FileHandle::open(&base)?;
        // expensive; queried once here, then tracked incrementally
        let mut active_size = handle.size()?;
        let metrics = Arc::new(RotatingSinkMetrics::new());
        let reporter = RateLimitedReporter::default();

        if policy.rotate_on_open && active_size > 0 {
            run_rotation_cycle(
                &base,
                &policy,
                &mut handle,
                compressor.as_ref(),
                &metrics,
                &reporter,
            );
            active_size = 0;
        }

        Ok(Self {
            state: lock_api::Mutex::new(SinkState {
                handle,
                active_size,
                compressor,
            }),
            base,
            policy,
            metrics,
            reporter,
        })
    }

    /// Append one pre-formatted record, rotating first if it would push
    /// the active file past the size bound
    pub fn write(&self, record: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        self.write_locked(&mut state, record)
    }

    /// Flush buffered bytes to the OS
    pub fn flush(&self) -> Result<()> {
        self.state.lock().handle.flush()
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.base
    }

    /// The sink's retention policy
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Live counters
    pub fn metrics(&self) -> &RotatingSinkMetrics {
        &self.metrics
    }

    /// Counters handle that stays valid after the sink is dropped
    pub fn metrics_handle(&self) -> Arc<RotatingSinkMetrics> {
        Arc::clone(&self.metrics)
    }

    fn write_locked(&self, state: &mut SinkState, record: &[u8]) -> Result<()> {
        let len = record.len() as u64;
        let mut projected = state.active_size + len;

        if projected > self.policy.max_size {
            state.handle.flush()?;
            // only a file that really has bytes rotates: an already-empty
            // active file (full disk, just-rotated) must not spin
            if state.handle.size()? > 0 {
                self.rotate_and_stage(state);
                projected = len;
            }
        }

        state.handle.write(record)?;
        state.active_size = projected;
        self.metrics.record_write(len);
        Ok(())
    }

    /// Run one rotation followed by one staging pass
    ///
    /// Both failure modes are terminal for this cycle but not for the
    /// sink: they are counted, reported, and the caller keeps writing.
    fn rotate_and_stage(&self, state: &mut SinkState) {
        run_rotation_cycle(
            &self.base,
            &self.policy,
            &mut state.handle,
            state.compressor.as_ref(),
            &self.metrics,
            &self.reporter,
        );
    }
}

fn run_rotation_cycle(
    base: &Path,
    policy: &RotationPolicy,
    handle: &mut FileHandle,
    compressor: &dyn Compressor,
    metrics: &RotatingSinkMetrics,
    reporter: &RateLimitedReporter,
) {
    match rotation::rotate(handle, base, policy.max_rotated_files) {
        Ok(()) => {
            metrics.rotations.fetch_add(1, Ordering::Relaxed);
        }
        Err(err) => {
            metrics.rotation_failures.fetch_add(1, Ordering::Relaxed);
            reporter.warn("rotation failed, active file truncated", &err);
            return;
        }
    }

    match archive::stage(base, policy.max_archives, compressor) {
        Ok(Some(_)) => {
            metrics.archives_created.fetch_add(1, Ordering::Relaxed);
        }
        Ok(None) => {}
        Err(err) => {
            metrics.compression_failures.fetch_add(1, Ordering::Relaxed);
            reporter.warn("archiving failed, rotated file retained", &err);
        }
    }
}

impl<R> RecordSink for RotatingFileSink<R>
where
    R: lock_api::RawMutex + Send + Sync,
{
    fn write(&self, record: &[u8]) -> Result<()> {
        RotatingFileSink::write(self, record)
    }

    fn flush(&self) -> Result<()> {
        RotatingFileSink::flush(self)
    }
}
