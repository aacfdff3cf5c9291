//! Tests for archive compression

use std::io::Read;

use tempfile::TempDir;

use crate::rotating::compress::{Compressor, Lz4Compressor, NoopCompressor};

#[test]
fn test_lz4_round_trip() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("app.1.log");
    let dst = dir.path().join("app.1.log.lz4");

    let payload = b"a line of log output\n".repeat(500);
    std::fs::write(&src, &payload).unwrap();

    let size = Lz4Compressor.compress(&src, &dst).unwrap();
    assert!(dst.exists());
    assert_eq!(size, std::fs::metadata(&dst).unwrap().len());
    // repetitive input should actually shrink
    assert!(size < payload.len() as u64);
    // source is left in place for the caller to remove
    assert!(src.exists());

    let mut decoder =
        lz4_flex::frame::FrameDecoder::new(std::fs::File::open(&dst).unwrap());
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn test_lz4_extension() {
    assert_eq!(Lz4Compressor.extension(), "lz4");
}

#[test]
fn test_noop_copies_verbatim() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("app.1.log");
    let dst = dir.path().join("app.1.log.raw");

    std::fs::write(&src, b"payload").unwrap();
    let size = NoopCompressor.compress(&src, &dst).unwrap();

    assert_eq!(size, 7);
    assert_eq!(std::fs::read(&dst).unwrap(), b"payload");
}

#[test]
fn test_missing_source_fails_without_partial_archive() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("absent.log");
    let dst = dir.path().join("absent.log.lz4");

    assert!(Lz4Compressor.compress(&src, &dst).is_err());
    assert!(!dst.exists());
    assert!(!dir.path().join("absent.log.lz4.tmp").exists());
}

#[test]
fn test_existing_archive_is_replaced() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("app.1.log");
    let dst = dir.path().join("app.1.log.raw");

    std::fs::write(&src, b"new contents").unwrap();
    std::fs::write(&dst, b"stale archive").unwrap();

    NoopCompressor.compress(&src, &dst).unwrap();
    assert_eq!(std::fs::read(&dst).unwrap(), b"new contents");
}
