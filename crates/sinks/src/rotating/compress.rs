//! Pluggable archive compression
//!
//! The retention chain decides *when* to compress and *which* file; the
//! byte format is a plug-in behind [`Compressor`]. The default is LZ4
//! frame compression. Implementations write to a temporary sibling and
//! persist via rename, so a failed run never leaves a partial archive.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use lz4_flex::frame::FrameEncoder;

/// Turns one rotated file into one archive file
pub trait Compressor: Send + Sync {
    /// File-name suffix for archives, without a leading dot
    fn extension(&self) -> &'static str;

    /// Compress `src` into `dst`, returning the archive size in bytes
    ///
    /// `src` is left untouched; the caller decides whether to remove it.
    fn compress(&self, src: &Path, dst: &Path) -> io::Result<u64>;
}

/// LZ4 frame compression
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Compressor;

impl Compressor for Lz4Compressor {
    fn extension(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        stage_via_temp(dst, |tmp| {
            let mut reader = BufReader::new(File::open(src)?);
            let mut encoder = FrameEncoder::new(BufWriter::new(File::create(tmp)?));
            io::copy(&mut reader, &mut encoder)?;
            let mut writer = encoder
                .finish()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writer.flush()?;
            Ok(())
        })
    }
}

/// Plain copy, no compression
///
/// Keeps the staging behavior of the retention chain without the CPU cost;
/// also the stand-in compressor in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCompressor;

impl Compressor for NoopCompressor {
    fn extension(&self) -> &'static str {
        "raw"
    }

    fn compress(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        stage_via_temp(dst, |tmp| {
            std::fs::copy(src, tmp)?;
            Ok(())
        })
    }
}

/// Run `write` against a temporary sibling of `dst`, then rename into place
fn stage_via_temp(
    dst: &Path,
    write: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<u64> {
    let tmp = temp_sibling(dst);
    if let Err(err) = write(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err);
    }
    let size = std::fs::metadata(&tmp)?.len();
    let _ = std::fs::remove_file(dst);
    std::fs::rename(&tmp, dst)?;
    Ok(size)
}

fn temp_sibling(dst: &Path) -> PathBuf {
    let mut name = dst.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
#[path = "compress_test.rs"]
mod compress_test;
