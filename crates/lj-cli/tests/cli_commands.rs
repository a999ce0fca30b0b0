//! CLI command integration tests.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lumberjack() -> Command {
    Command::cargo_bin("lumberjack").unwrap()
}

/// A script that walks up to the oak and swings three times.
fn chop_script(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("chop.json");
    fs::write(
        &path,
        r#"{
    "dt": 0.016666668,
    "steps": [
        { "frames": 50, "move_axis": [0.0, 1.0] },
        { "frames": 30 },
        { "strike": true },
        { "frames": 10 },
        { "strike": true },
        { "frames": 10 },
        { "strike": true },
        { "frames": 10 }
    ]
}"#,
    )
    .unwrap();
    path
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_prints_default_json() {
    let output = lumberjack().arg("config").output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["seed"], 42);
    assert!(json["camera"]["min_pitch"].is_number());
    assert!(json["tree"]["respawn_delay"].is_number());
}

#[test]
fn printed_config_is_accepted_back() {
    let dir = TempDir::new().unwrap();
    let output = lumberjack().arg("config").output().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, &output.stdout).unwrap();

    lumberjack()
        .args(["run", "--frames", "10", "--config"])
        .arg(&path)
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_prints_summary() {
    lumberjack()
        .args(["run", "--frames", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Autopilot"))
        .stdout(predicate::str::contains("Clearing"))
        .stdout(predicate::str::contains("Balance"))
        .stdout(predicate::str::contains("Oak"));
}

#[test]
fn run_with_events_lists_the_log() {
    lumberjack()
        .args(["run", "--frames", "600", "--seed", "7", "--events"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Event Log"))
        .stdout(predicate::str::contains("felled"));
}

#[test]
fn run_rejects_bad_dt() {
    lumberjack()
        .args(["run", "--dt", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dt"));
}

#[test]
fn run_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "camera": { "min_pitch": 60.0, "max_pitch": 10.0 } }"#).unwrap();

    lumberjack()
        .args(["run", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("pitch"));
}

#[test]
fn run_rejects_malformed_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    lumberjack()
        .args(["run", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn run_missing_config_file_fails() {
    lumberjack()
        .args(["run", "--config", "/nonexistent/lumberjack.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lumberjack.json"));
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

#[test]
fn replay_script_fells_the_tree() {
    let dir = TempDir::new().unwrap();
    let script = chop_script(&dir);

    lumberjack()
        .arg("replay")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Replay"))
        .stdout(predicate::str::contains("Felled"));
}

#[test]
fn replay_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let script = chop_script(&dir);

    let run = || {
        lumberjack()
            .args(["replay", "--seed", "3"])
            .arg(&script)
            .env("NO_COLOR", "1")
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn replay_missing_script_fails() {
    lumberjack()
        .args(["replay", "/nonexistent/script.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn replay_invalid_script_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("script.json");
    fs::write(&path, r#"{ "steps": "nope" }"#).unwrap();

    lumberjack()
        .arg("replay")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input script"));
}
