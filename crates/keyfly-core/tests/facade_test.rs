//! End-to-end tests of the rate-limited facade and the benchmark
//! harness against a mock gateway. Delays are zeroed so the limiter
//! admits immediately; timing behavior is covered by the limiter's
//! paused-clock unit tests.

use std::collections::BTreeMap;
use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keyfly_core::{
    Credential, DoorState, Gateway, GatewayCommand, GatewayConfig, LockerOp, Operation, RateDelays,
    run_benchmark,
};

fn test_config(server: &MockServer, lockers: BTreeMap<String, Credential>) -> GatewayConfig {
    GatewayConfig {
        host: server.uri(),
        lockers,
        delays: RateDelays {
            heavy: Duration::ZERO,
            light: Duration::ZERO,
        },
        timeout: Duration::from_secs(5),
        ..GatewayConfig::default()
    }
}

fn one_locker(name: &str) -> BTreeMap<String, Credential> {
    let mut lockers = BTreeMap::new();
    lockers.insert(name.to_owned(), Credential::new("front-id", "front-secret"));
    lockers
}

#[tokio::test]
async fn open_interprets_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/open"))
        .and(body_string_contains("identifier=front-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 0})))
        .mount(&server)
        .await;

    let config = test_config(&server, one_locker("front"));
    let gateway = Gateway::new(&config).unwrap();

    let result = gateway
        .execute(&Operation::Locker {
            credential: Credential::new("front-id", "front-secret"),
            op: LockerOp::Open,
        })
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.code, 0);
    assert_eq!(result.door, None);
}

#[tokio::test]
async fn status_reports_door_states() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/locker_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 49})))
        .mount(&server)
        .await;

    let config = test_config(&server, one_locker("front"));
    let gateway = Gateway::new(&config).unwrap();

    let result = gateway
        .execute(&Operation::Locker {
            credential: Credential::new("front-id", "front-secret"),
            op: LockerOp::Status,
        })
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.door, Some(DoorState::Closed));
}

#[tokio::test]
async fn maintenance_tolerates_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/locker/synchronize"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = test_config(&server, one_locker("front"));
    let gateway = Gateway::new(&config).unwrap();

    let result = gateway
        .execute(&Operation::Locker {
            credential: Credential::new("front-id", "front-secret"),
            op: LockerOp::Synchronize,
        })
        .await
        .unwrap();

    // No payload: success is judged by the HTTP status.
    assert!(result.success);
    assert_eq!(result.code, 200);
}

#[tokio::test]
async fn gateway_list_passes_payload_through() {
    let server = MockServer::start().await;
    let lockers = serde_json::json!([{"identifier": "front-id"}, {"identifier": "back-id"}]);
    Mock::given(method("GET"))
        .and(path("/lockers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lockers.clone()))
        .mount(&server)
        .await;

    let config = test_config(&server, BTreeMap::new());
    let gateway = Gateway::new(&config).unwrap();

    let result = gateway
        .execute(&Operation::Gateway(GatewayCommand::ListLockers))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.raw, lockers);
}

#[tokio::test]
async fn benchmark_samples_successes_and_skips_failures() {
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
    // Locker status answers with an unknown error code every time.
    Mock::given(method("POST"))
        .and(path("/locker_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 7})))
        .mount(&server)
        .await;

    let config = test_config(&server, one_locker("front"));
    let gateway = Gateway::new(&config).unwrap();

    let mut ticks = 0;
    let report = run_benchmark(&gateway, &config, 3, |_| ticks += 1)
        .await
        .unwrap();

    // 3 iterations x (2 light targets + 1 heavy target).
    assert_eq!(ticks, 9);
    assert_eq!(report.iterations, 3);
    assert_eq!(report.samples.len(), 6);
    assert_eq!(report.skipped, 3);
    // Only the light class produced samples, so only it is summarized.
    assert_eq!(report.summaries.len(), 1);
    assert!(report.suggested_scan_workers.is_some());
}

#[tokio::test]
async fn placeholder_credentials_are_excluded_from_benchmark() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": 0})))
        .mount(&server)
        .await;

    let mut lockers = BTreeMap::new();
    lockers.insert("stub".to_owned(), Credential::new("stub-id", "changeme"));
    let config = test_config(&server, lockers);
    let gateway = Gateway::new(&config).unwrap();

    let report = run_benchmark(&gateway, &config, 2, |_| {}).await.unwrap();

    // Only the two gateway targets ran.
    assert_eq!(report.samples.len() + report.skipped, 4);
    assert!(
        report
            .samples
            .iter()
            .all(|s| s.target.starts_with("gateway/"))
    );
}
