//! Tests for the rotation chain

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::common::SinkError;
use crate::rotating::file_handle::FileHandle;
use crate::rotating::rotation::rotate;

fn write_active(path: &Path, content: &[u8]) -> FileHandle {
    let mut handle = FileHandle::open(path).unwrap();
    handle.write(content).unwrap();
    handle.flush().unwrap();
    handle
}

fn rotated(base: &Path, index: usize) -> PathBuf {
    crate::rotating::naming::calc_name(base, index).unwrap()
}

#[test]
fn test_single_rotation_moves_active_to_slot_one() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("app.log");
    let mut handle = write_active(&base, b"generation 1");

    rotate(&mut handle, &base, 3).unwrap();

    assert_eq!(std::fs::read(rotated(&base, 1)).unwrap(), b"generation 1");
    // active file reopened empty
    assert!(handle.is_open());
    assert_eq!(handle.size().unwrap(), 0);
}

#[test]
fn test_indices_stay_contiguous_across_rotations() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("app.log");
    let mut handle = write_active(&base, b"gen 1");

    for n in 2..=4 {
        rotate(&mut handle, &base, 5).unwrap();
        handle.write(format!("gen {n}").as_bytes()).unwrap();
        handle.flush().unwrap();
    }

    // three rotations: slots 1..=3 present, no gaps, newest first
    assert_eq!(std::fs::read(rotated(&base, 1)).unwrap(), b"gen 3");
    assert_eq!(std::fs::read(rotated(&base, 2)).unwrap(), b"gen 2");
    assert_eq!(std::fs::read(rotated(&base, 3)).unwrap(), b"gen 1");
    assert!(!rotated(&base, 4).exists());
}

#[test]
fn test_oldest_slot_ages_out_at_bound() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("app.log");
    let mut handle = write_active(&base, b"gen 1");

    for n in 2..=4 {
        rotate(&mut handle, &base, 2).unwrap();
        handle.write(format!("gen {n}").as_bytes()).unwrap();
        handle.flush().unwrap();
    }

    // bound of 2: gen 1 has been shifted out past index 2 and discarded
    assert_eq!(std::fs::read(rotated(&base, 1)).unwrap(), b"gen 3");
    assert_eq!(std::fs::read(rotated(&base, 2)).unwrap(), b"gen 2");
    assert!(!rotated(&base, 3).exists());
}

#[test]
fn test_zero_retained_files_truncates_in_place() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("app.log");
    let mut handle = write_active(&base, b"dropped");

    rotate(&mut handle, &base, 0).unwrap();

    assert_eq!(handle.size().unwrap(), 0);
    assert!(!rotated(&base, 1).exists());
}

#[test]
fn test_rename_failure_truncates_active_and_reports() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("app.log");
    let mut handle = write_active(&base, b"sacrificed");
    std::fs::write(rotated(&base, 1), b"previous generation").unwrap();

    // a non-empty directory squatting on the slot-2 name defeats the
    // rename of slot 1, and is not removable as a file either
    let blocker = rotated(&base, 2);
    std::fs::create_dir(&blocker).unwrap();
    std::fs::write(blocker.join("occupied"), b"x").unwrap();

    let err = rotate(&mut handle, &base, 2).unwrap_err();
    assert!(matches!(err, SinkError::RotationFailed { .. }));

    // bounded disk usage wins: active file truncated and usable again
    assert!(handle.is_open());
    assert_eq!(handle.size().unwrap(), 0);
    handle.write(b"still alive").unwrap();
    handle.flush().unwrap();
    assert_eq!(std::fs::read(&base).unwrap(), b"still alive");
}
