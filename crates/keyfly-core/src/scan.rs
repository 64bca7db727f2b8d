//! Network discovery for gateways with unknown addresses.
//!
//! Scanning runs in two phases: a TCP sweep over candidate ports, then
//! HTTP probes of candidate endpoints on every port that accepted a
//! connection. Both phases bound in-flight probes with a semaphore and
//! pace dispatch with a fixed delay, so a scan never hammers the target
//! harder than the configured budget allows.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use keyfly_api::probe::{check_port, try_endpoint};
use keyfly_api::{ProbeMethod, ProbeOutcome, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Ports gateways have been observed listening on in the field.
pub const DEFAULT_PORTS: &[u16] = &[
    80, 443, 8080, 8443, 8888, 9090, 9856, 3000, 5000, 8000, 8001, 9000, 9001,
];

const DEFAULT_GET_PATHS: &[&str] = &[
    "/status",
    "/synchronize",
    "/lockers",
    "/version",
    "/info",
    "/health",
    "/api",
    "/api/status",
    "/api/lockers",
    "/locks",
    "/devices",
    "/",
];

const DEFAULT_POST_PATHS: &[&str] = &[
    "/open",
    "/close",
    "/calibrate",
    "/locker_status",
    "/locker/synchronize",
    "/locker/update",
    "/update",
    "/lock",
    "/unlock",
    "/sync",
    "/api/open",
    "/api/close",
    "/api/lock",
    "/api/unlock",
];

/// One HTTP endpoint candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub method: ProbeMethod,
    pub path: String,
}

impl Endpoint {
    pub fn new(method: ProbeMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// The candidate list the vendor's gateways are known to answer on.
    pub fn default_set() -> Vec<Self> {
        DEFAULT_GET_PATHS
            .iter()
            .map(|p| Self::new(ProbeMethod::Get, *p))
            .chain(
                DEFAULT_POST_PATHS
                    .iter()
                    .map(|p| Self::new(ProbeMethod::Post, *p)),
            )
            .collect()
    }
}

/// One probe target: an endpoint on a specific open port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanTarget {
    pub port: u16,
    pub endpoint: Endpoint,
}

/// The outcome of probing one target.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    #[serde(flatten)]
    pub target: ScanTarget,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
    /// Whether the response indicates a live gateway endpoint. A `400` on
    /// a POST counts: it means the route exists and rejected our empty
    /// body, which is exactly what an unauthenticated probe expects.
    pub reachable: bool,
}

/// Everything one scan run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub host: String,
    pub open_ports: Vec<u16>,
    pub results: Vec<ScanResult>,
}

impl ScanReport {
    /// Targets that look like live gateway endpoints.
    pub fn reachable(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter().filter(|r| r.reachable)
    }
}

/// Tunable knobs for one scan run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub ports: Vec<u16>,
    pub endpoints: Vec<Endpoint>,
    /// Pause between consecutive endpoint probe dispatches.
    pub delay: Duration,
    /// Pause between consecutive port check dispatches. TCP connects are
    /// cheaper than HTTP probes, so the sweep paces faster.
    pub port_delay: Duration,
    /// Upper bound on in-flight probes in either phase.
    pub max_concurrency: usize,
    pub probe_timeout: Duration,
    pub port_timeout: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
            endpoints: Endpoint::default_set(),
            delay: Duration::from_millis(200),
            port_delay: Duration::from_millis(50),
            max_concurrency: 3,
            probe_timeout: Duration::from_secs(3),
            port_timeout: Duration::from_secs(2),
        }
    }
}

impl ScanOptions {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}

/// Concurrency-bounded, paced gateway discovery.
pub struct Scanner {
    options: ScanOptions,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Token callers can use to stop the scan (Ctrl-C handling lives in
    /// the CLI). Cancelling stops new dispatches; probes already in
    /// flight run to completion and their results are kept.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Sweep `host` for open ports, then probe endpoint candidates on
    /// each. A cancelled scan returns the partial report collected so
    /// far; an uncancelled scan's `results` has exactly one entry per
    /// `(open port, endpoint)` pair.
    pub async fn scan(&self, host: &str) -> Result<ScanReport, CoreError> {
        let open_ports = self.sweep_ports(host).await?;
        info!(host, open = open_ports.len(), "port sweep complete");

        let results = self.probe_endpoints(host, &open_ports).await?;

        Ok(ScanReport {
            host: host.to_owned(),
            open_ports,
            results,
        })
    }

    async fn sweep_ports(&self, host: &str) -> Result<Vec<u16>, CoreError> {
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency));
        let mut tasks: JoinSet<(u16, bool)> = JoinSet::new();

        for (i, &port) in self.options.ports.iter().enumerate() {
            if i > 0 && !self.pace(self.options.port_delay).await {
                break;
            }
            let permit = acquire(&semaphore).await?;
            let host = host.to_owned();
            let timeout = self.options.port_timeout;
            tasks.spawn(async move {
                let open = check_port(&host, port, timeout).await;
                drop(permit);
                (port, open)
            });
        }

        let mut open = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (port, is_open) = joined.map_err(|e| CoreError::Internal(e.to_string()))?;
            debug!(port, is_open, "port checked");
            if is_open {
                open.push(port);
            }
        }
        open.sort_unstable();
        Ok(open)
    }

    async fn probe_endpoints(
        &self,
        host: &str,
        open_ports: &[u16],
    ) -> Result<Vec<ScanResult>, CoreError> {
        let transport = TransportConfig {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: self.options.probe_timeout,
        };
        let http = transport.build_client()?;

        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency));
        let mut tasks: JoinSet<ScanResult> = JoinSet::new();

        let mut first = true;
        'dispatch: for &port in open_ports {
            for endpoint in &self.options.endpoints {
                if !first && !self.pace(self.options.delay).await {
                    break 'dispatch;
                }
                first = false;

                let permit = acquire(&semaphore).await?;
                let http = http.clone();
                let url = format!("http://{host}:{port}{}", endpoint.path);
                let target = ScanTarget {
                    port,
                    endpoint: endpoint.clone(),
                };
                tasks.spawn(async move {
                    let outcome = try_endpoint(&http, &url, target.endpoint.method).await;
                    drop(permit);
                    let reachable = is_reachable(target.endpoint.method, &outcome);
                    ScanResult {
                        target,
                        outcome,
                        reachable,
                    }
                });
            }
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let result = joined.map_err(|e| CoreError::Internal(e.to_string()))?;
            debug!(
                port = result.target.port,
                path = %result.target.endpoint.path,
                reachable = result.reachable,
                "endpoint probed"
            );
            results.push(result);
        }
        Ok(results)
    }

    /// Sleep the inter-dispatch delay, or return `false` when the scan
    /// was cancelled during the wait.
    async fn pace(&self, delay: Duration) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }
}

async fn acquire(semaphore: &Arc<Semaphore>) -> Result<tokio::sync::OwnedSemaphorePermit, CoreError> {
    Arc::clone(semaphore)
        .acquire_owned()
        .await
        .map_err(|e| CoreError::Internal(e.to_string()))
}

fn is_reachable(method: ProbeMethod, outcome: &ProbeOutcome) -> bool {
    match outcome.http_status {
        Some(200 | 201) => true,
        // A POST route that exists but dislikes an empty body.
        Some(400) => method == ProbeMethod::Post,
        _ => false,
    }
}
