//! Index-shift rotation of the retained-file chain
//!
//! ```text
//! app.log   -> app.1.log
//! app.1.log -> app.2.log
//! app.2.log -> app.3.log
//! app.3.log -> overwritten (aged out)
//! ```
//!
//! Shifting runs from the highest index down so no slot is overwritten
//! before its own contents have been relocated; the slot at the retention
//! bound is discarded implicitly by the overwrite of its neighbor.

use std::path::Path;
use std::time::Duration;

use crate::common::{Result, SinkError};
use crate::rotating::file_handle::FileHandle;
use crate::rotating::naming;

/// Backoff before the single rename retry
///
/// Transient failures (file locked by a scanner, momentary permission
/// denial) usually clear within this window.
pub(crate) const RENAME_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Delete the target if it exists, then move src over it
pub(crate) fn rename_file(src: &Path, target: &Path) -> std::io::Result<()> {
    let _ = std::fs::remove_file(target);
    std::fs::rename(src, target)
}

/// Shift every slot up one index and reopen a fresh active file
///
/// `handle` must be bound to `base`. It is closed before any rename and
/// reopened truncated on return - including the failure path, where the
/// pending active data is sacrificed to keep disk usage bounded and
/// `RotationFailed` is surfaced.
pub(crate) fn rotate(
    handle: &mut FileHandle,
    base: &Path,
    max_rotated_files: usize,
) -> Result<()> {
    handle.close()?;
    for i in (1..=max_rotated_files).rev() {
        let src = naming::calc_name(base, i - 1)?;
        if !src.exists() {
            continue;
        }
        let target = naming::calc_name(base, i)?;
        if rename_file(&src, &target).is_err() {
            std::thread::sleep(RENAME_RETRY_BACKOFF);
            if let Err(retry) = rename_file(&src, &target) {
                handle.reopen(true)?;
                return Err(SinkError::RotationFailed {
                    src,
                    target,
                    source: retry,
                });
            }
        }
    }
    handle.reopen(true)?;
    Ok(())
}

#[cfg(test)]
#[path = "rotation_test.rs"]
mod rotation_test;
