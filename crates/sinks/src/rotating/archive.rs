//! Staged compressed retention
//!
//! Archives form a second chain beside the rotated files, numbered
//! independently but sharing the same naming grammar:
//!
//! ```text
//! app.log          active
//! app.1.log        newest rotated
//! app.2.log        oldest rotated
//! app.1.log.lz4    oldest archive
//! app.3.log.lz4    newest archive (chain of 3, full)
//! ```
//!
//! Staging runs once per successful rotation and consumes exactly one
//! rotated file - the one at rotated-index 1. When the slot at the
//! archive bound is occupied the whole chain shifts toward index 1,
//! retiring the oldest archive without ever enumerating it.

use std::path::{Path, PathBuf};

use crate::common::{Result, SinkError};
use crate::rotating::compress::Compressor;
use crate::rotating::naming;
use crate::rotating::rotation::rename_file;

/// Archive the just-rotated file into the retention chain
///
/// Returns the archive path, or `None` when there is nothing to do
/// (`max_archives == 0`, or no file at rotated-index 1). On compression
/// failure the rotated file is retained uncompressed and
/// `CompressionFailed` is surfaced; rotation is never undone.
pub(crate) fn stage(
    base: &Path,
    max_archives: usize,
    compressor: &dyn Compressor,
) -> Result<Option<PathBuf>> {
    if max_archives == 0 {
        return Ok(None);
    }

    let rotated = naming::calc_name(base, 1)?;
    if !rotated.exists() {
        return Ok(None);
    }

    let ext = compressor.extension();
    let target = resolve_target_slot(base, max_archives, ext)?;

    match compressor.compress(&rotated, &target) {
        Ok(size) => {
            tracing::debug!(
                archive = %target.display(),
                bytes = size,
                "rotated file archived"
            );
            if let Err(err) = std::fs::remove_file(&rotated) {
                tracing::warn!(
                    path = %rotated.display(),
                    error = %err,
                    "archived source could not be removed"
                );
            }
            Ok(Some(target))
        }
        Err(source) => Err(SinkError::CompressionFailed {
            path: rotated,
            source,
        }),
    }
}

/// Find the slot the new archive goes to
///
/// Slot `max_archives` holds the newest archive. If it is occupied the
/// chain is full: shift every slot toward index 1 (`k` receives `k+1`),
/// which frees the top slot and implicitly evicts the oldest archive at
/// index 1. Otherwise the first unoccupied index counting up from 1 is
/// the target.
fn resolve_target_slot(base: &Path, max_archives: usize, ext: &str) -> Result<PathBuf> {
    let newest = naming::archive_name(base, max_archives, ext)?;
    if newest.exists() {
        for k in 1..max_archives {
            let target = naming::archive_name(base, k, ext)?;
            let src = naming::archive_name(base, k + 1, ext)?;
            if src.exists()
                && let Err(err) = rename_file(&src, &target)
            {
                tracing::warn!(
                    src = %src.display(),
                    target = %target.display(),
                    error = %err,
                    "archive shift failed, slot will be overwritten"
                );
            }
        }
        return Ok(newest);
    }
    for k in 1..=max_archives {
        let candidate = naming::archive_name(base, k, ext)?;
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    // top slot became occupied between checks; overwrite the newest
    Ok(newest)
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod archive_test;
