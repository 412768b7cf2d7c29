//! Corruption recovery tests for the hablar binary.
//!
//! These tests verify the system can handle:
//! - Corrupted progress logs
//! - Corrupted CSV archives
//! - Missing files
//! - Partial writes

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

const GREETINGS_ANSWERS: &str = "Hola|Buenos días|Buenos|Thank you|Por favor";

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("hablar"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_wal_file_ignored_during_read() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("wal")).unwrap();

    let wal_path = data_dir.join("wal/progress.wal");
    fs::write(&wal_path, "{ invalid json }\n{ more invalid }")
        .expect("Failed to write corrupted WAL");

    // Corrupted lines are logged as warnings and skipped
    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 pts"))
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_partial_wal_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // A partial last line simulates a crash during write
    fs::create_dir_all(data_dir.join("wal")).unwrap();
    let wal_path = data_dir.join("wal/progress.wal");

    let mut file = fs::File::create(&wal_path).unwrap();
    writeln!(
        file,
        r#"{{"_id":"a1","lessonId":"greetings","completed":true,"score":50,"completedExercises":5,"totalExercises":5,"lastAccessed":"2024-03-01T10:00:00Z"}}"#
    )
    .unwrap();
    write!(file, r#"{{"_id":"partial"#).unwrap();
    drop(file);

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("50 pts"));
}

#[test]
fn test_impossible_progress_record_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("wal")).unwrap();
    fs::write(
        data_dir.join("wal/progress.wal"),
        r#"{"_id":"bad","lessonId":"greetings","completed":true,"score":90,"completedExercises":9,"totalExercises":5,"lastAccessed":"2024-03-01T10:00:00Z"}"#,
    )
    .unwrap();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 pts"));
}

#[test]
fn test_corrupted_csv_rows_skipped() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(&data_dir).unwrap();
    fs::write(
        data_dir.join("progress.csv"),
        "id,lesson_id,completed,score,completed_exercises,total_exercises,last_accessed\n\
         a,numbers,true,40,4,4,2024-01-01T10:00:00+00:00\n\
         b,greetings,maybe,50,5,5,2024-01-01T10:00:00+00:00\n",
    )
    .unwrap();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("40 pts"));
}

#[test]
fn test_unreadable_log_falls_back_to_defaults() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // A directory where the log file should be cannot be read as lines
    fs::create_dir_all(data_dir.join("wal/progress.wal")).unwrap();

    cli()
        .arg("lessons")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("greetings"))
        .stdout(predicate::str::contains("verbs"))
        .stderr(predicate::str::contains("Failed to"));

    cli()
        .arg("study")
        .arg("greetings")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();
}

#[test]
fn test_invalid_utf8_in_log_keeps_course() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("wal")).unwrap();
    fs::write(data_dir.join("wal/progress.wal"), b"\xff\xfe garbage\n").unwrap();

    cli()
        .arg("lessons")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("greetings"))
        .stderr(predicate::str::contains("Failed to parse"));

    cli()
        .arg("play")
        .arg("greetings")
        .arg("--answers")
        .arg(GREETINGS_ANSWERS)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("50 pts"));
}

#[test]
fn test_missing_data_dir() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("does/not/exist/yet");

    cli()
        .arg("play")
        .arg("greetings")
        .arg("--answers")
        .arg(GREETINGS_ANSWERS)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    assert!(data_dir.join("wal/progress.wal").exists());
}

#[test]
fn test_empty_files() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::create_dir_all(data_dir.join("wal")).unwrap();
    fs::write(data_dir.join("wal/progress.wal"), "").unwrap();
    fs::write(data_dir.join("progress.csv"), "").unwrap();

    cli()
        .arg("play")
        .arg("greetings")
        .arg("--answers")
        .arg(GREETINGS_ANSWERS)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    cli()
        .arg("stats")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("50 pts"));
}

#[test]
fn test_rollup_skips_corrupted_lines() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("play")
        .arg("greetings")
        .arg("--answers")
        .arg(GREETINGS_ANSWERS)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let mut wal = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("wal/progress.wal"))
        .unwrap();
    writeln!(wal, "not json at all").unwrap();
    drop(wal);

    cli()
        .arg("rollup")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 1 progress records"));

    assert!(data_dir.join("progress.csv").exists());
}
