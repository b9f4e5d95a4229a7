//! CLI end-to-end tests
//!
//! Tests for the pixshelf command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the pixshelf binary
#[allow(deprecated)]
fn pixshelf_cmd() -> Command {
    Command::cargo_bin("pixshelf").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    pixshelf_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    pixshelf_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version: "))
        .stdout(predicate::str::contains("Working tree: "));
}

#[test]
fn test_cli_version_json() {
    let output = pixshelf_cmd().args(["version", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["version"].is_string());
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pixshelf.toml");
    fs::write(
        &path,
        r#"
[server]
port = 4000

[store]
backend = "sqlite"

[thumbnails]
width = 64
height = 64
"#,
    )
    .unwrap();

    pixshelf_cmd()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("0.0.0.0:4000"))
        .stdout(predicate::str::contains("Thumbnails: 64x64"))
        .stdout(predicate::str::contains("store.path is not set"));
}

#[test]
fn test_cli_validate_rejects_bad_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[server\nport = ").unwrap();

    pixshelf_cmd()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config parse error"));
}

#[test]
fn test_cli_validate_missing_file() {
    pixshelf_cmd()
        .args(["validate", "/nonexistent/pixshelf.toml"])
        .assert()
        .failure();
}
