use std::fs;
use tempfile::TempDir;
use vanity_engine::{ensure_output_dir, AtomicFileWriter};

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_previous_download() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write_bytes("wallets_task_1.txt", b"first run").unwrap();
    assert_eq!(fs::read(&first).unwrap(), b"first run");

    let second = writer.write_bytes("wallets_task_1.txt", b"second").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"second");
}

#[test]
fn text_write_leaves_no_temp_files_behind() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    writer.write(".vanity_profile.ron", "(host: \"h\")").unwrap();

    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from(".vanity_profile.ron")]);
}

#[test]
fn output_path_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write_bytes("wallets.txt", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("wallets.txt").exists());
}
