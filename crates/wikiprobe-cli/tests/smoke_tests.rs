//! Smoke tests for the wikiprobe CLI
//!
//! Runs go through `--offline` so no browser or network is needed.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the wikiprobe binary
fn wikiprobe() -> Command {
    let mut cmd = Command::cargo_bin("wikiprobe").expect("wikiprobe binary should exist");
    cmd.env_remove("WIKIPROBE_BASE_URL")
        .env_remove("WIKIPROBE_CHROMIUM_PATH")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    wikiprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    wikiprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_no_args_shows_usage() {
    wikiprobe()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_run_help_lists_flags() {
    wikiprobe()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--offline"))
        .stdout(predicate::str::contains("--retries"));
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_shows_suites() {
    wikiprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search System"))
        .stdout(predicate::str::contains("Main Menu Functionality"))
        .stdout(predicate::str::contains("skipped"));
}

#[test]
fn test_list_filter() {
    wikiprobe()
        .args(["list", "--filter", "login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successful login"))
        .stdout(predicate::str::contains("Search System").not());
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn test_offline_run_json() {
    let temp = TempDir::new().unwrap();
    let output = wikiprobe()
        .args(["run", "--offline", "--format", "json", "--quiet", "--output"])
        .arg(temp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let scenarios = report["scenarios"].as_array().unwrap();
    assert_eq!(scenarios.len(), 15);
    assert!(scenarios.iter().any(|s| s["status"] == "passed"));
    assert!(scenarios.iter().any(|s| s["status"] == "skipped"));

    let written = fs::read_to_string(temp.path().join("report.json")).unwrap();
    assert!(written.contains("\"base_url\""));
}

#[test]
fn test_offline_run_text() {
    let temp = TempDir::new().unwrap();
    wikiprobe()
        .args(["run", "--offline", "--color", "never", "--filter", "search", "--output"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Search System"))
        .stdout(predicate::str::contains("PASSED"));
}

#[test]
fn test_offline_run_filter_matches_nothing() {
    let temp = TempDir::new().unwrap();
    wikiprobe()
        .args(["run", "--offline", "--filter", "nonexistent-xyz", "--output"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 scenarios"));
}

#[test]
fn test_invalid_jobs_rejected() {
    let temp = TempDir::new().unwrap();
    wikiprobe()
        .args(["run", "--offline", "--jobs", "0", "--output"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_defaults() {
    wikiprobe()
        .args(["config", "--defaults"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url:"))
        .stdout(predicate::str::contains("en.wikipedia.org"));
}

#[test]
fn test_config_file_is_used() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ci.yaml");
    fs::write(&path, "jobs: 6\nretries: 2\n").unwrap();
    wikiprobe()
        .arg("config")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("jobs: 6"))
        .stdout(predicate::str::contains("retries: 2"));
}

#[test]
fn test_bad_config_file_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.yaml");
    fs::write(&path, "jobz: 6\n").unwrap();
    wikiprobe()
        .arg("config")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
