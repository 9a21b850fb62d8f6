//! Integration tests for the disk download sink.

use std::path::PathBuf;

use stego_desk_app::{AppError, DiskDownloadSink, DownloadSink};
use stego_desk_core::ENCODED_ARTIFACT_NAME;

fn scratch_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("stego-desk-{tag}-{}", std::process::id()))
}

#[test]
fn artifact_download_tests_save_creates_directory_and_file() {
    let dir = scratch_dir("create");
    let _ = std::fs::remove_dir_all(&dir);

    let sink = DiskDownloadSink::new(dir.clone());
    let path = sink
        .save(ENCODED_ARTIFACT_NAME, &[0x89, 0x50, 0x4E, 0x47])
        .expect("save should succeed");

    assert_eq!(path, dir.join("encoded_image.png"));
    let written = std::fs::read(&path).expect("artifact should be readable");
    assert_eq!(written, vec![0x89, 0x50, 0x4E, 0x47]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn artifact_download_tests_save_reaches_nested_directories() {
    let dir = scratch_dir("nested").join("deep").join("deeper");
    let _ = std::fs::remove_dir_all(scratch_dir("nested"));

    let sink = DiskDownloadSink::new(dir.clone());
    let path = sink
        .save(ENCODED_ARTIFACT_NAME, b"payload")
        .expect("nested save should succeed");

    assert!(path.starts_with(&dir));
    assert!(path.exists());

    let _ = std::fs::remove_dir_all(scratch_dir("nested"));
}

#[test]
fn artifact_download_tests_save_overwrites_the_previous_artifact() {
    let dir = scratch_dir("overwrite");
    let _ = std::fs::remove_dir_all(&dir);

    let sink = DiskDownloadSink::new(dir.clone());
    sink.save(ENCODED_ARTIFACT_NAME, b"old")
        .expect("first save should succeed");
    sink.save(ENCODED_ARTIFACT_NAME, b"new")
        .expect("second save should succeed");

    let written =
        std::fs::read(dir.join(ENCODED_ARTIFACT_NAME)).expect("artifact should be readable");
    assert_eq!(written, b"new");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn artifact_download_tests_unwritable_target_reports_artifact_error() {
    let dir = scratch_dir("blocked");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::write(&dir, b"not a directory").expect("placeholder file should write");

    let sink = DiskDownloadSink::new(dir.clone());
    let err = sink
        .save(ENCODED_ARTIFACT_NAME, b"payload")
        .expect_err("saving under a file should fail");
    assert!(matches!(err, AppError::Artifact(_)));

    let _ = std::fs::remove_file(&dir);
}
