//! Integration tests for the `keyfly` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling without requiring a live gateway.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `keyfly` binary with env isolation.
///
/// Clears all `KEYFLY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn keyfly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("keyfly");
    cmd.env("HOME", "/tmp/keyfly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/keyfly-cli-test-nonexistent")
        .env_remove("KEYFLY_CONFIG")
        .env_remove("KEYFLY_HOST")
        .env_remove("KEYFLY_OUTPUT")
        .env_remove("KEYFLY_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = keyfly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    keyfly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("smart-lock")
            .and(predicate::str::contains("gateway"))
            .and(predicate::str::contains("locker"))
            .and(predicate::str::contains("benchmark"))
            .and(predicate::str::contains("discover")),
    );
}

#[test]
fn test_version_flag() {
    keyfly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("keyfly"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    keyfly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    keyfly_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = keyfly_cmd().arg("frobnicate").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("frobnicate"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_unknown_locker_exit_code() {
    // No config file exists, so no lockers are configured.
    let output = keyfly_cmd()
        .args(["locker", "ghost", "status"])
        .output()
        .unwrap();
    assert_eq!(
        output.status.code(),
        Some(4),
        "Expected exit code 4 for unknown locker:\n{}",
        combined_output(&output)
    );
}

#[test]
fn test_invalid_output_format() {
    let output = keyfly_cmd()
        .args(["--output", "invalid", "gateway", "status"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_negative_discover_delay_is_usage_error() {
    let output = keyfly_cmd()
        .args(["discover", "127.0.0.1", "--delay", "-1"])
        .output()
        .unwrap();
    assert_eq!(
        output.status.code(),
        Some(2),
        "Expected usage exit code:\n{}",
        combined_output(&output)
    );
}

#[test]
fn test_connection_failure_exit_code() {
    // Port 1 on loopback refuses connections; short timeout keeps this fast.
    let output = keyfly_cmd()
        .args(["--host", "127.0.0.1:1", "--timeout", "2", "gateway", "status"])
        .output()
        .unwrap();
    assert_eq!(
        output.status.code(),
        Some(7),
        "Expected connection exit code:\n{}",
        combined_output(&output)
    );
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // A missing config file renders the built-in defaults.
    keyfly_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("192.168.0.129"));
}

#[test]
fn test_config_show_redacts_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[gateway]\nhost = \"10.0.0.7\"\n\n\
         [lockers.front]\nidentifier = \"abc\"\nsecret = \"hunter2\"\n",
    )
    .unwrap();

    keyfly_cmd()
        .args(["--config", path.to_str().unwrap(), "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("<redacted>")
                .and(predicate::str::contains("hunter2").not()),
        );
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_gateway_subcommands_exist() {
    keyfly_cmd()
        .args(["gateway", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("status"))
                .and(predicate::str::contains("sync"))
                .and(predicate::str::contains("update")),
        );
}

#[test]
fn test_locker_subcommands_exist() {
    keyfly_cmd()
        .args(["locker", "front", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("open")
                .and(predicate::str::contains("close"))
                .and(predicate::str::contains("calibrate"))
                .and(predicate::str::contains("status")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    keyfly_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("set-secret")),
        );
}
