//! Integration tests for argument parsing and the offline commands.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

/// The binary with colors off and an isolated config and PATH.
fn hvdriver(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hvdriver"));
    cmd.env("NO_COLOR", "1")
        .env("HOME", home.path())
        .env("HVDRIVER_CONFIG", home.path().join("config.yaml"))
        .env("PATH", home.path().join("empty-path"))
        .env_remove("HVDRIVER_LOG");
    cmd
}

fn home() -> tempfile::TempDir {
    tempfile::tempdir().expect("tempdir")
}

// --- Help and version ---

#[test]
fn test_cli_no_args_shows_help() {
    let home = home();
    hvdriver(&home)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_help_lists_commands() {
    let home = home();
    hvdriver(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reconcile"))
        .stdout(predicate::str::contains("provision"));
}

#[test]
fn test_version_command_shows_version() {
    let home = home();
    hvdriver(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "hvdriver ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let home = home();
    let output = hvdriver(&home)
        .args(["version", "--json"])
        .output()
        .expect("run");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_no_color_env_accepts_common_values() {
    let home = home();
    for value in ["1", "true", "yes", ""] {
        hvdriver(&home)
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("hvdriver "));
    }
}

#[test]
fn test_no_color_flag_with_env_set() {
    let home = home();
    hvdriver(&home)
        .args(["--no-color", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}

// --- Registry ---

#[test]
fn test_drivers_json_lists_builtin_kvm2() {
    let home = home();
    let output = hvdriver(&home)
        .args(["drivers", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(rows[0]["name"], "docker-machine-driver-kvm2");
    assert_eq!(rows[0]["minimum_version"], "1.0.0");
}

#[test]
fn test_drivers_includes_config_entries() {
    let home = home();
    std::fs::write(
        home.path().join("config.yaml"),
        "drivers:\n  docker-machine-driver-hyperkit:\n    url: https://example.com/hyperkit\n    minimum_version: v0.12.0\n",
    )
    .expect("write config");

    hvdriver(&home)
        .arg("drivers")
        .assert()
        .success()
        .stdout(predicate::str::contains("docker-machine-driver-hyperkit"))
        .stdout(predicate::str::contains(">= 0.12.0"));
}

#[test]
fn test_insecure_config_url_is_rejected() {
    let home = home();
    std::fs::write(
        home.path().join("config.yaml"),
        "drivers:\n  drv:\n    url: http://example.com/drv\n    minimum_version: 1.0.0\n",
    )
    .expect("write config");

    hvdriver(&home)
        .arg("drivers")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("http://example.com/drv"));
}

// --- Probe and reconcile ---

#[test]
fn test_probe_missing_driver_json() {
    let home = home();
    let output = hvdriver(&home)
        .args(["probe", "docker-machine-driver-kvm2", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["driver"], "docker-machine-driver-kvm2");
    assert_eq!(value["state"], "not_found");
}

#[test]
fn test_reconcile_unregistered_driver_is_noop() {
    let home = home();
    let output = hvdriver(&home)
        .args(["reconcile", "docker-machine-driver-none", "--json"])
        .arg("--dest")
        .arg(home.path().join("bin"))
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["outcome"], "unregistered");
    assert_eq!(value["reason"]["reason"], "not_found");
    assert!(!home.path().join("bin").exists());
}

#[test]
fn test_reconcile_rejects_malformed_min_version() {
    let home = home();
    hvdriver(&home)
        .args(["reconcile", "--min-version", "one.two"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--min-version"));
}

#[cfg(unix)]
#[test]
fn test_reconcile_keeps_satisfying_driver() {
    use std::os::unix::fs::PermissionsExt;

    let home = home();
    let bin = home.path().join("path-bin");
    std::fs::create_dir_all(&bin).expect("mkdir");
    let driver = bin.join("docker-machine-driver-kvm2");
    std::fs::write(&driver, "#!/bin/sh\necho 'version: v1.3.0'\necho 'commit: abc123'\n")
        .expect("write driver");
    std::fs::set_permissions(&driver, std::fs::Permissions::from_mode(0o755)).expect("chmod");

    let output = hvdriver(&home)
        .env("PATH", format!("{}:/bin:/usr/bin", bin.display()))
        .args(["reconcile", "--json"])
        .output()
        .expect("run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["outcome"], "up_to_date");
    assert_eq!(value["version"], "1.3.0");
}

#[cfg(unix)]
#[test]
fn test_reconcile_malformed_driver_version_fails() {
    use std::os::unix::fs::PermissionsExt;

    let home = home();
    let bin = home.path().join("path-bin");
    std::fs::create_dir_all(&bin).expect("mkdir");
    let driver = bin.join("docker-machine-driver-kvm2");
    std::fs::write(&driver, "#!/bin/sh\necho 'version: banana'\n").expect("write driver");
    std::fs::set_permissions(&driver, std::fs::Permissions::from_mode(0o755)).expect("chmod");

    let output = hvdriver(&home)
        .env("PATH", format!("{}:/bin:/usr/bin", bin.display()))
        .args(["reconcile", "--json"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "probe_parse_failure");
}
