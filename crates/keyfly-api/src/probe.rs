//! Raw discovery probes: TCP port checks and single-endpoint HTTP tries.
//!
//! These are the building blocks for `keyfly-core`'s scanner. A probe
//! never returns `Err` for a remote failure (unreachability is data,
//! not an error), so one bad target can never abort a scan.

use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tracing::trace;

/// How a probe failed to get an HTTP answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeErrorKind {
    /// The probe hit its deadline.
    Timeout,
    /// Connection-level failure (refused, DNS, reset).
    Connect,
    /// The server answered with something the HTTP client rejected.
    Malformed,
}

/// HTTP method used for an endpoint probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeMethod {
    Get,
    Post,
}

/// Result of one endpoint probe.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProbeOutcome {
    /// HTTP status when an answer arrived.
    pub http_status: Option<u16>,
    #[serde(rename = "latency_secs", serialize_with = "serialize_secs")]
    pub latency: Duration,
    pub error: Option<ProbeErrorKind>,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Check whether `host:port` accepts a TCP connection within `timeout`.
pub async fn check_port(host: &str, port: u16, timeout: Duration) -> bool {
    let open = matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    );
    trace!(host, port, open, "port probe");
    open
}

/// Try one HTTP endpoint and report what came back.
///
/// POST probes send an empty body, matching how the gateway's action
/// endpoints are expected to reject a parameterless request (HTTP 400
/// still proves the endpoint exists).
pub async fn try_endpoint(http: &reqwest::Client, url: &str, method: ProbeMethod) -> ProbeOutcome {
    let start = Instant::now();

    let request = match method {
        ProbeMethod::Get => http.get(url),
        ProbeMethod::Post => http.post(url).body(""),
    };

    match request.send().await {
        Ok(resp) => {
            let status = resp.status().as_u16();
            // Drain the body so latency covers the full exchange.
            let _ = resp.bytes().await;
            trace!(url, status, "endpoint probe");
            ProbeOutcome {
                http_status: Some(status),
                latency: start.elapsed(),
                error: None,
            }
        }
        Err(e) => {
            let kind = if e.is_timeout() {
                ProbeErrorKind::Timeout
            } else if e.is_connect() {
                ProbeErrorKind::Connect
            } else {
                ProbeErrorKind::Malformed
            };
            trace!(url, ?kind, "endpoint probe failed");
            ProbeOutcome {
                http_status: None,
                latency: start.elapsed(),
                error: Some(kind),
            }
        }
    }
}
