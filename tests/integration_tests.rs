//! Integration tests
//!
//! End-to-end tests running the shell against files on disk.

use detailer::cli::{OutputMode, RunOptions, process_file};
use detailer::formats::png::PNG_SIGNATURE;
use detailer::{Error, ParseError};
use rstest::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

const JPEG_DATA_SIZE: usize = 800;
const JPEG_FILE_SIZE: usize = 1000;

/// A JPEG whose image data ends at byte 800, followed by 200 bytes of junk.
fn jpeg_bytes() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    data.extend_from_slice(b"JFIF\x00\x01\x01\x00\x00\x48\x00\x48\x00\x00");
    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    data.resize(JPEG_DATA_SIZE - 2, 0x5C);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data.resize(JPEG_FILE_SIZE, 0xA7);
    data
}

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).unwrap().len()
}

#[fixture]
fn jpeg_with_junk() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "photo.jpg", &jpeg_bytes());
    (dir, path)
}

#[fixture]
fn png_with_junk() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&[0, 0, 0, 4]);
    data.extend_from_slice(b"IDAT");
    data.extend_from_slice(&[1, 2, 3, 4]);
    data.extend_from_slice(&[0, 0, 0, 0]);
    data.extend_from_slice(&[0, 0, 0, 0, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82]);
    data.extend_from_slice(b"PK\x03\x04 zip archive glued on");
    let path = write_file(&dir, "IMAGE.PNG", &data);
    (dir, path)
}

fn truncating() -> RunOptions {
    RunOptions {
        truncate: true,
        output: OutputMode::Json,
    }
}

// ============================================================================
// JPEG
// ============================================================================

#[rstest]
fn test_truncate_jpeg(jpeg_with_junk: (TempDir, PathBuf)) {
    let (_dir, path) = jpeg_with_junk;

    let report = process_file(&path, &truncating()).unwrap();
    assert_eq!(report.format, "JPEG");
    assert_eq!(report.size, JPEG_FILE_SIZE as u64);
    assert_eq!(report.data_size, JPEG_DATA_SIZE as u64);
    assert!(report.truncated);
    assert_eq!(file_size(&path), JPEG_DATA_SIZE as u64);

    let json: serde_json::Value =
        serde_json::from_str(&report.render(OutputMode::Json).unwrap()).unwrap();
    assert_eq!(json["truncated"], true);
    assert_eq!(json["size"], 1000);
    assert_eq!(json["data_size"], 800);
}

#[rstest]
fn test_report_only_leaves_file_alone(jpeg_with_junk: (TempDir, PathBuf)) {
    let (_dir, path) = jpeg_with_junk;

    let report = process_file(&path, &RunOptions::default()).unwrap();
    assert_eq!(report.data_size, JPEG_DATA_SIZE as u64);
    assert!(!report.truncated);
    assert_eq!(file_size(&path), JPEG_FILE_SIZE as u64);
    assert_eq!(fs::read(&path).unwrap(), jpeg_bytes());
}

#[rstest]
fn test_truncate_twice_is_noop(jpeg_with_junk: (TempDir, PathBuf)) {
    let (_dir, path) = jpeg_with_junk;

    assert!(process_file(&path, &truncating()).unwrap().truncated);

    let again = process_file(&path, &truncating()).unwrap();
    assert!(!again.truncated);
    assert_eq!(again.size, JPEG_DATA_SIZE as u64);
    assert_eq!(again.data_size, JPEG_DATA_SIZE as u64);
    assert_eq!(file_size(&path), JPEG_DATA_SIZE as u64);
}

// ============================================================================
// PNG
// ============================================================================

#[rstest]
fn test_truncate_png(png_with_junk: (TempDir, PathBuf)) {
    let (_dir, path) = png_with_junk;

    let report = process_file(&path, &truncating()).unwrap();
    assert_eq!(report.format, "PNG");
    assert_eq!(report.data_size, 8 + 16 + 12);
    assert!(report.truncated);
    assert_eq!(file_size(&path), 36);
    assert!(fs::read(&path).unwrap().ends_with(b"IEND\xAE\x42\x60\x82"));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unrecognized_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "photo.gif", &jpeg_bytes());

    let err = process_file(&path, &truncating()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::UnrecognizedFormat(ext)) if ext == "gif"
    ));
    assert_eq!(file_size(&path), JPEG_FILE_SIZE as u64);
}

#[test]
fn test_signature_mismatch_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "photo.png", &jpeg_bytes());

    let err = process_file(&path, &truncating()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::Parse(ParseError::NotPng))
    ));
    assert_eq!(err.to_string(), "not a PNG file");
    assert_eq!(file_size(&path), JPEG_FILE_SIZE as u64);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nowhere.jpeg");

    let err = process_file(&path, &RunOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to open"));
}
