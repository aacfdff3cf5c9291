//! Buffered handle over the active log file
//!
//! Owns at most one open descriptor at a time. The descriptor must be
//! closed (or replaced via `reopen`) before any rename targeting the same
//! path - an open handle blocks rename on some platforms, so the ordering
//! is a correctness requirement.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::common::Result;

/// Capacity of the in-process write buffer
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Exclusive handle for one log file path
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileHandle {
    /// Open the file in append mode, creating parent directories as needed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut handle = Self { path, writer: None };
        handle.reopen(false)?;
        Ok(handle)
    }

    /// Append bytes through the write buffer
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        match self.writer.as_mut() {
            Some(writer) => {
                writer.write_all(bytes)?;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "file handle is closed",
            )
            .into()),
        }
    }

    /// Flush buffered bytes to the OS
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flush and release the descriptor
    ///
    /// Idempotent; `write` after `close` fails until the next `reopen`.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Close and open again, optionally truncating
    pub fn reopen(&mut self, truncate: bool) -> Result<()> {
        self.close()?;
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let file = if truncate {
            File::options()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)?
        } else {
            File::options().create(true).append(true).open(&self.path)?
        };
        self.writer = Some(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file));
        Ok(())
    }

    /// On-disk size of the file
    ///
    /// A metadata query, so relatively expensive: callers cache the result
    /// and re-query only at rotation-decision points, never per write.
    /// Reports 0 when the file does not exist.
    pub fn size(&self) -> Result<u64> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    /// Path this handle is bound to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the descriptor is currently open
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}

#[cfg(test)]
#[path = "file_handle_test.rs"]
mod file_handle_test;
