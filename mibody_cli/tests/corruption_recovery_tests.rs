//! Corruption recovery tests for mibody.
//!
//! These tests verify the system can handle:
//! - Empty export files
//! - Records with invalid fields
//! - Truncated files
//! - Oversized input

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mibody"));
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("mibody-no-config"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn weigh_in() -> [u8; 18] {
    [
        0x07, 0xDC, 2, 10, 19, 9, 11, 0x80 | 21, 175, 0, 0x02, 0x9B, 0x00, 0x91, 0, 0x01, 0xD2, 3,
    ]
}

fn write_bytes(dir: &Path, bytes: &[u8]) -> PathBuf {
    let path = dir.join("BODYDATA.TXT");
    fs::write(&path, bytes).expect("Failed to write export");
    path
}

/// Ten records with the fifth one carrying an invalid month
fn ten_with_bad_fifth() -> Vec<u8> {
    let mut bytes = Vec::new();
    for i in 0..10 {
        let mut block = weigh_in();
        if i == 4 {
            block[2] = 13;
        }
        bytes.extend_from_slice(&block);
    }
    bytes
}

#[test]
fn test_empty_file_exports_nothing() {
    let temp_dir = setup_test_dir();
    let input = write_bytes(temp_dir.path(), &[]);

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-f")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_unused_slots_are_ignored() {
    let temp_dir = setup_test_dir();
    let mut bytes = weigh_in().to_vec();
    bytes.extend_from_slice(&[0u8; 18 * 4]);
    let input = write_bytes(temp_dir.path(), &bytes);

    let output = cli()
        .arg("-i")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped").not())
        .get_output()
        .stdout
        .clone();

    let rows: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
}

#[test]
fn test_bad_record_is_skipped_and_reported() {
    let temp_dir = setup_test_dir();
    let input = write_bytes(temp_dir.path(), &ten_with_bad_fifth());

    let output = cli()
        .arg("-i")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped 1 of 10 records"))
        .stderr(predicate::str::contains("record 4 (byte 72): invalid timestamp"))
        .get_output()
        .stdout
        .clone();

    let rows: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 9);
}

#[test]
fn test_skipped_record_is_reported_once() {
    let temp_dir = setup_test_dir();
    let input = write_bytes(temp_dir.path(), &ten_with_bad_fifth());

    let output = cli()
        .env_remove("RUST_LOG")
        .arg("-i")
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stderr
        .clone();

    let stderr = String::from_utf8(output).unwrap();
    assert_eq!(stderr.matches("invalid timestamp").count(), 1, "{}", stderr);
}

#[test]
fn test_strict_mode_fails_on_bad_record() {
    let temp_dir = setup_test_dir();
    let input = write_bytes(temp_dir.path(), &ten_with_bad_fifth());
    let out = temp_dir.path().join("BODYDATA.JSON");

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 record(s) could not be decoded"));

    assert!(!out.exists());
}

#[test]
fn test_truncated_file() {
    let temp_dir = setup_test_dir();
    let mut bytes = weigh_in().to_vec();
    bytes.extend_from_slice(&weigh_in()[..11]);
    let input = write_bytes(temp_dir.path(), &bytes);

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-f")
        .arg("csv")
        .assert()
        .success()
        .stderr(predicate::str::contains("truncated record: 11 of 18 bytes"))
        .stdout(predicate::str::contains("1661"));
}

#[test]
fn test_oversized_input_is_refused() {
    let temp_dir = setup_test_dir();
    let input = write_bytes(temp_dir.path(), &[weigh_in(), weigh_in()].concat());
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[input]\nmax_input_bytes = 18\n").unwrap();

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("-i")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input exceeds the 18 byte limit"));
}

#[test]
fn test_corrupted_config_file() {
    let temp_dir = setup_test_dir();
    let input = write_bytes(temp_dir.path(), &weigh_in());
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[export\nformat = ").unwrap();

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("-i")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TOML error"));
}
