//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Build command for the netplace-cli binary.
fn netplace_cli() -> Command {
    cargo_bin_cmd!("netplace-cli")
}

/// Path to netplace library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("netplace")
        .join("tests")
        .join("fixtures")
}

fn library() -> PathBuf {
    fixtures_dir().join("library.json")
}

fn place_json(args: &[&str]) -> serde_json::Value {
    let mut cmd = netplace_cli();
    cmd.arg("place")
        .arg(fixtures_dir().join("board.enet"))
        .arg("--library")
        .arg(library())
        .arg("--yes")
        .arg("--format")
        .arg("json")
        .args(args);

    let output = cmd.output().expect("Failed to run CLI");
    serde_json::from_slice(&output.stdout).expect("Output should be JSON")
}

#[test]
fn test_cli_help() {
    let mut cmd = netplace_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Netlist"));
}

#[test]
fn test_cli_version() {
    let mut cmd = netplace_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_formats() {
    let mut cmd = netplace_cli();

    cmd.arg("formats");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(".json"))
        .stdout(predicate::str::contains(".enet"));
}

#[test]
fn test_cli_place_basic() {
    let mut cmd = netplace_cli();

    cmd.arg("place")
        .arg(fixtures_dir().join("basic.json"))
        .arg("--library")
        .arg(library())
        .arg("--yes");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Placed all 1 components"))
        .stdout(predicate::str::contains("R1"));
}

#[test]
fn test_cli_place_json_output() {
    let output = place_json(&[]);

    assert_eq!(output["outcome"], "partial_success");
    assert_eq!(output["summary"]["total"], 4);
    assert_eq!(output["summary"]["succeeded"], 3);
    assert_eq!(output["summary"]["failed_designators"][0], "X9");
    assert_eq!(output["summary"]["wires"]["stubs_created"], 8);
    assert_eq!(output["schematic"]["symbols"].as_array().unwrap().len(), 3);
}

#[test]
fn test_cli_place_grouped_config() {
    let config = fixtures_dir().join("grouped.json");
    let output = place_json(&["--config", config.to_str().unwrap()]);

    assert_eq!(output["summary"]["wires"]["stubs_created"], 7);
    assert_eq!(output["summary"]["wires"]["skipped_single_pin_nets"], 1);
}

#[test]
fn test_cli_place_strategy_flags() {
    let output = place_json(&["--strategy", "grouped", "--drop-single-pin-nets"]);

    assert_eq!(output["summary"]["wires"]["skipped_single_pin_nets"], 1);
}

#[test]
fn test_cli_partial_success_exit_code() {
    let mut cmd = netplace_cli();

    cmd.arg("place")
        .arg(fixtures_dir().join("board.enet"))
        .arg("--library")
        .arg(library())
        .arg("--yes");
    cmd.assert().success();

    let mut cmd = netplace_cli();
    cmd.arg("place")
        .arg(fixtures_dir().join("board.enet"))
        .arg("--library")
        .arg(library())
        .arg("--yes")
        .arg("--fail-on-partial");
    cmd.assert().failure().code(1);
}

#[test]
fn test_cli_writes_snapshot() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let out = dir.path().join("schematic.json");

    let mut cmd = netplace_cli();
    cmd.arg("place")
        .arg(fixtures_dir().join("basic.json"))
        .arg("--library")
        .arg(library())
        .arg("--yes")
        .arg("--output")
        .arg(&out);
    cmd.assert().success();

    let content = std::fs::read_to_string(&out).expect("Snapshot should be written");
    let snapshot: serde_json::Value = serde_json::from_str(&content).unwrap();
    let labels: Vec<&str> = snapshot["wires"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["VCC", "GND"]);
}

#[test]
fn test_cli_declined_confirmation() {
    let mut cmd = netplace_cli();

    cmd.arg("place")
        .arg(fixtures_dir().join("basic.json"))
        .arg("--library")
        .arg(library())
        .write_stdin("n\n");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Cancelled"));
}

#[test]
fn test_cli_accepted_confirmation() {
    let mut cmd = netplace_cli();

    cmd.arg("place")
        .arg(fixtures_dir().join("basic.json"))
        .arg("--library")
        .arg(library())
        .write_stdin("y\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Placed all 1 components"));
}

#[test]
fn test_cli_malformed_netlist() {
    let mut cmd = netplace_cli();

    cmd.arg("place")
        .arg(fixtures_dir().join("malformed.json"))
        .arg("--library")
        .arg(library())
        .arg("--yes");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Malformed netlist"));
}

#[test]
fn test_cli_missing_library_namespace() {
    let mut cmd = netplace_cli();

    cmd.arg("place")
        .arg(fixtures_dir().join("basic.json"))
        .arg("--library")
        .arg(fixtures_dir().join("no_library.json"))
        .arg("--yes");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Device library is not available"));
}

#[test]
fn test_cli_unsupported_extension() {
    let mut cmd = netplace_cli();

    cmd.arg("place")
        .arg(fixtures_dir().join("library.txt"))
        .arg("--library")
        .arg(library())
        .arg("--yes");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(".json or .enet"));
}

#[test]
fn test_cli_missing_catalog_file() {
    let mut cmd = netplace_cli();

    cmd.arg("place")
        .arg(fixtures_dir().join("basic.json"))
        .arg("--library")
        .arg(fixtures_dir().join("nonexistent_catalog.json"))
        .arg("--yes");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read device catalog"));
}

#[test]
fn test_cli_inspect_json() {
    let mut cmd = netplace_cli();
    cmd.arg("inspect")
        .arg(fixtures_dir().join("board.enet"))
        .arg("--format")
        .arg("json");

    let output = cmd.output().expect("Failed to run CLI");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(value["components"].as_array().unwrap().len(), 4);
    let nets: Vec<&str> = value["nets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap())
        .collect();
    assert_eq!(nets, vec!["VCC", "GND", "LED_DRV", "NC_SENSE"]);
}

#[test]
fn test_cli_inspect_human() {
    let mut cmd = netplace_cli();
    cmd.arg("inspect").arg(fixtures_dir().join("basic.json"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Components (1)"))
        .stdout(predicate::str::contains("C1.1"));
}
