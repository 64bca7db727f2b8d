//! End-to-end tests: the real binary against a mock gateway.
//!
//! Uses a multi-threaded runtime so the mock server keeps serving while
//! the test thread blocks on the child process.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn keyfly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("keyfly");
    cmd.env("HOME", "/tmp/keyfly-e2e-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/keyfly-e2e-test-nonexistent")
        .env_remove("KEYFLY_CONFIG")
        .env_remove("KEYFLY_HOST")
        .env_remove("KEYFLY_OUTPUT")
        .env_remove("KEYFLY_TIMEOUT");
    cmd
}

/// A config file pointing at the mock server, with zero delays so tests
/// don't sit in the rate limiter.
fn write_config(dir: &tempfile::TempDir, server: &MockServer) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            "[gateway]\nhost = \"{}\"\n\n\
             [lockers.front]\nidentifier = \"front-id\"\nsecret = \"front-secret\"\n\n\
             [delays]\nheavy = 0.0\nlight = 0.0\n",
            server.uri()
        ),
    )
    .unwrap();
    path
}

#[tokio::test(flavor = "multi_thread")]
async fn gateway_list_renders_lockers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lockers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"identifier": "front-id", "name": "Front door"},
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &server);

    keyfly_cmd()
        .args(["--config", config.to_str().unwrap(), "gateway", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("front-id").and(predicate::str::contains("Front door")));
}

#[tokio::test(flavor = "multi_thread")]
async fn locker_open_signs_and_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/open"))
        .and(body_string_contains("identifier=front-id"))
        .and(body_string_contains("hash="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 0})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &server);

    keyfly_cmd()
        .args(["--config", config.to_str().unwrap(), "locker", "front", "open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[tokio::test(flavor = "multi_thread")]
async fn locker_status_reports_door_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/locker_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 50})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &server);

    keyfly_cmd()
        .args(["--config", config.to_str().unwrap(), "locker", "front", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("door open"));
}

#[tokio::test(flavor = "multi_thread")]
async fn benchmark_positional_host_overrides_config() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 0})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lockers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/locker_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 0})))
        .mount(&server)
        .await;

    // The config points at a dead address; the positional host wins.
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        "[gateway]\nhost = \"http://127.0.0.1:1\"\n\n\
         [lockers.front]\nidentifier = \"front-id\"\nsecret = \"front-secret\"\n\n\
         [delays]\nheavy = 0.0\nlight = 0.0\n",
    )
    .unwrap();

    keyfly_cmd()
        .args([
            "--config",
            config.to_str().unwrap(),
            "-o",
            "json",
            "benchmark",
            &server.uri(),
            "-n",
            "1",
            "--no-report",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(server.uri()).and(predicate::str::contains("recommendations")));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_status_code_fails_the_command() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/close"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 7})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &server);

    let output = keyfly_cmd()
        .args(["--config", config.to_str().unwrap(), "locker", "front", "close"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}
