//! Rotated-file and archive naming
//!
//! `calc_name("logs/app.log", 3)` yields `logs/app.3.log`; archive names
//! stack the compressed-format suffix on top of the rotated name, e.g.
//! `logs/app.3.log.lz4`. A slot name is a pure computation - slots come to
//! exist on disk only through rename.

use std::path::{Path, PathBuf};

use crate::common::{Result, SinkError};

/// Derive the file name for a slot index
///
/// Index 0 is the active file and returns `base` unchanged. Higher indices
/// insert `.{index}` before the extension of the final path component.
pub fn calc_name(base: &Path, index: usize) -> Result<PathBuf> {
    if index == 0 {
        return Ok(base.to_path_buf());
    }
    let (stem, ext) = split_by_extension(base)?;
    Ok(PathBuf::from(format!("{stem}.{index}{ext}")))
}

/// Derive the archive name for a slot index
///
/// Composition of [`calc_name`] with a suffix append; `ext` is the
/// compressed-format token without a leading dot.
pub fn archive_name(base: &Path, index: usize, ext: &str) -> Result<PathBuf> {
    let rotated = calc_name(base, index)?;
    let mut name = rotated.into_os_string();
    name.push(".");
    name.push(ext);
    Ok(PathBuf::from(name))
}

/// Split a path at the extension of its final component
///
/// `logs/app.log` becomes `("logs/app", ".log")`. A component without a dot,
/// or with only a leading dot (`.profile`), has no extension. Paths without
/// a file-name component, or with non-UTF-8 names, are rejected.
fn split_by_extension(base: &Path) -> Result<(&str, &str)> {
    let full = base.to_str().ok_or_else(|| SinkError::invalid_path(base))?;
    let name = base
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SinkError::invalid_path(base))?;
    match name.rfind('.') {
        Some(dot) if dot > 0 => {
            let split = full.len() - (name.len() - dot);
            Ok((&full[..split], &full[split..]))
        }
        _ => Ok((full, "")),
    }
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod naming_test;
