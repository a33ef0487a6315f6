use std::fs;

use clipq_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_download_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn write_replaces_existing_result() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("downloads"));

    let first = writer.write("talk_segments.zip", b"first").unwrap();
    assert_eq!(first.file_name().unwrap(), "talk_segments.zip");
    assert_eq!(fs::read(&first).unwrap(), b"first");

    let second = writer.write("talk_segments.zip", b"second").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"second");
}

#[test]
fn server_supplied_name_cannot_escape_directory() {
    let temp = TempDir::new().unwrap();
    let downloads = temp.path().join("downloads");
    let writer = AtomicFileWriter::new(downloads.clone());

    let path = writer.write("../../escape.zip", b"data").unwrap();
    assert_eq!(path, downloads.join("escape.zip"));
    assert!(!temp.path().join("escape.zip").exists());

    let err = writer.write("..", b"data").unwrap_err();
    assert!(matches!(err, PersistError::FileName(_)));
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("result.zip", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("result.zip").exists());
}
