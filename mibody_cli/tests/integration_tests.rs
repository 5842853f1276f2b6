//! Integration tests for the mibody binary.
//!
//! These tests verify end-to-end behavior including:
//! - Input path handling
//! - CSV and JSON export to stdout and to files
//! - Unit selection
//! - Option validation before any output is written

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mibody"));
    // Keep a user's config file out of the tests
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("mibody-no-config"));
    cmd
}

/// One 18-byte block: 2012-02-10 19:09:11, male, 21, 175cm
fn weigh_in(weight_tenths: u16) -> [u8; 18] {
    let weight = weight_tenths.to_be_bytes();
    [
        0x07, 0xDC, 2, 10, 19, 9, 11, 0x80 | 21, 175, 0, weight[0], weight[1], 0x00, 0x91, 0,
        0x01, 0xD2, 3,
    ]
}

/// Write a BODYDATA.TXT with the given weights (in tenths of a kg)
fn write_export(dir: &Path, weights: &[u16]) -> PathBuf {
    let path = dir.join("BODYDATA.TXT");
    let bytes: Vec<u8> = weights.iter().flat_map(|w| weigh_in(*w)).collect();
    fs::write(&path, bytes).expect("Failed to write export");
    path
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Read Salter MiBody scale data"));
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("-i")
        .arg(temp_dir.path().join("NON_BODYDATA.TXT"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("NON_BODYDATA.TXT"));
}

#[test]
fn test_default_input_is_bodydata_txt() {
    let temp_dir = setup_test_dir();

    // No BODYDATA.TXT in the working directory yet
    cli()
        .current_dir(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("BODYDATA.TXT"));

    write_export(temp_dir.path(), &[667]);
    cli().current_dir(temp_dir.path()).assert().success();
}

#[test]
fn test_json_to_stdout() {
    let temp_dir = setup_test_dir();
    let input = write_export(temp_dir.path(), &[667, 666]);

    let output = cli()
        .arg("-i")
        .arg(&input)
        .arg("-f")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let rows: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Weight (KG)"], serde_json::json!(66.7));
    assert_eq!(rows[0]["Height (CM)"], 175);
    assert_eq!(rows[0]["BMI"], serde_json::json!(21.78));
    assert_eq!(rows[0]["BMR"], 1661);
    assert_eq!(rows[1]["BMR"], 1660);
    assert_eq!(rows[0]["Classification"], "healthy weight");
}

#[test]
fn test_csv_to_stdout() {
    let temp_dir = setup_test_dir();
    let input = write_export(temp_dir.path(), &[667]);

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-f")
        .arg("csv")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Date/time,Gender,Age (years),Height (CM),Fitness level,Weight (KG),BMI",
        ))
        .stdout(predicate::str::contains(
            "2012-02-10 19:09:11,Male,21,175,0,66.7,21.78,14.5,46.6,3,1661,healthy weight",
        ));
}

#[test]
fn test_csv_file_matches_stdout() {
    let temp_dir = setup_test_dir();
    let input = write_export(temp_dir.path(), &[667, 679, 650]);
    let csv_path = temp_dir.path().join("out").join("BODYDATA.CSV");

    let stdout = cli()
        .arg("-i")
        .arg(&input)
        .arg("-f")
        .arg("csv")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-f")
        .arg("csv")
        .arg("-o")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let file_contents = fs::read(&csv_path).expect("Failed to read CSV");
    assert_eq!(file_contents, stdout);

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.records().count(), 3);
}

#[test]
fn test_imperial_units() {
    let temp_dir = setup_test_dir();
    let input = write_export(temp_dir.path(), &[667]);

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-f")
        .arg("csv")
        .arg("-H")
        .arg("ft_in")
        .arg("-w")
        .arg("st_lbs")
        .assert()
        .success()
        .stdout(predicate::str::contains("),\"Height (feet, inches)\",Fi"))
        .stdout(predicate::str::contains("21,\"5, 8.897637795275593\",0"))
        .stdout(predicate::str::contains("vel,\"Weight (stones, lbs)\",BMI"))
        .stdout(predicate::str::contains("0,\"10, 7.045486000000004\",21.78"));
}

#[test]
fn test_json_pairs_are_arrays() {
    let temp_dir = setup_test_dir();
    let input = write_export(temp_dir.path(), &[666]);
    let json_path = temp_dir.path().join("BODYDATA.JSON");

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-H")
        .arg("ft_in")
        .arg("-w")
        .arg("lbs")
        .arg("-o")
        .arg(&json_path)
        .assert()
        .success();

    let rows: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(
        rows[0]["Height (feet, inches)"],
        serde_json::json!([5, 8.897637795275593])
    );
    assert_eq!(rows[0]["Weight (lbs)"], serde_json::json!(146.82786661187998));
}

#[test]
fn test_invalid_format_writes_nothing() {
    let temp_dir = setup_test_dir();
    let input = write_export(temp_dir.path(), &[667]);
    let out = temp_dir.path().join("BODYDATA.CSV");

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-f")
        .arg("blah")
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Format, 'blah' is invalid"));

    assert!(!out.exists());
}

#[test]
fn test_invalid_units_rejected() {
    let temp_dir = setup_test_dir();
    let input = write_export(temp_dir.path(), &[667]);

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-H")
        .arg("metres")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Height unit, 'metres' is invalid"));

    cli()
        .arg("-i")
        .arg(&input)
        .arg("-w")
        .arg("tons")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Weight unit, 'tons' is invalid"));
}

#[test]
fn test_config_file_sets_defaults() {
    let temp_dir = setup_test_dir();
    let input = write_export(temp_dir.path(), &[667]);
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[input]\npath = {:?}\n\n[export]\nformat = \"csv\"\nweight_unit = \"st_lbs\"\n",
            input.display().to_string()
        ),
    )
    .unwrap();

    cli()
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight (stones, lbs)"));

    // Flags win over the config file
    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("-w")
        .arg("kg")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight (KG)"));
}
