// Hand-crafted async HTTP client for The Keys gateway API.
//
// One method per wire-level operation; every call is a single timed
// exchange. Throttling and result interpretation live in keyfly-core.

use std::time::{Duration, Instant};

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::signer::{self, Credential};
use crate::transport::TransportConfig;
use crate::types::{GatewayCommand, LockerAction, MaintenanceKind};

/// The raw outcome of one gateway exchange.
///
/// `payload` is `None` when the body was empty or non-JSON and the
/// endpoint tolerates that (locker maintenance calls answer with empty
/// bodies on success).
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub http_status: u16,
    pub payload: Option<serde_json::Value>,
    /// Wall-clock duration of the network exchange.
    pub latency: Duration,
}

/// Async client for the gateway's HTTP surface.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl GatewayClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a gateway host (`192.168.0.129`, `tkgw.example.net:8080`,
    /// or a full URL) and transport settings.
    pub fn new(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url: normalize_base_url(host)?,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client` (tests, shared transports).
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join a relative path (e.g. `"locker_status"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/` and paths are static, so joining
        // cannot fail.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Perform one signed locker action.
    ///
    /// Signs a fresh timestamp with the locker's secret and POSTs the
    /// `hash`/`identifier`/`ts` form the gateway expects.
    pub async fn locker_action(
        &self,
        action: LockerAction,
        credential: &Credential,
    ) -> Result<ApiResponse, Error> {
        let ts = signer::unix_timestamp();
        let token = signer::sign(credential, ts)?;

        let url = self.url(action.path());
        debug!(%url, identifier = %credential.identifier, "signed locker action");

        let form = [
            ("hash", token),
            ("identifier", credential.identifier.clone()),
            ("ts", ts.to_string()),
        ];
        self.exchange(self.http.post(url).form(&form), BodyPolicy::Strict)
            .await
    }

    /// Perform one locker maintenance call (sync or firmware update).
    ///
    /// These are identifier-only POSTs; the gateway frequently answers
    /// with an empty or non-JSON body on success.
    pub async fn locker_maintenance(
        &self,
        kind: MaintenanceKind,
        identifier: &str,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(kind.path());
        debug!(%url, identifier, "locker maintenance");

        let form = [("identifier", identifier)];
        self.exchange(self.http.post(url).form(&form), BodyPolicy::Lenient)
            .await
    }

    /// Perform one gateway-level command (unauthenticated).
    pub async fn gateway_command(&self, cmd: GatewayCommand) -> Result<ApiResponse, Error> {
        let url = self.url(cmd.path());
        debug!(%url, post = cmd.is_post(), "gateway command");

        let request = if cmd.is_post() {
            // `/update` expects a POST with an empty body.
            self.http.post(url).body("")
        } else {
            self.http.get(url)
        };
        self.exchange(request, BodyPolicy::Strict).await
    }

    // ── Exchange ─────────────────────────────────────────────────────

    async fn exchange(
        &self,
        request: reqwest::RequestBuilder,
        policy: BodyPolicy,
    ) -> Result<ApiResponse, Error> {
        let start = Instant::now();

        let resp = request.send().await.map_err(|e| self.map_send_error(e))?;
        let http_status = resp.status().as_u16();
        let success = resp.status().is_success();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;

        let latency = start.elapsed();

        let payload = match serde_json::from_str(&body) {
            Ok(value) => Some(value),
            // Empty/non-JSON bodies: tolerated on lenient endpoints and on
            // HTTP-level failures (the raw status is the signal there);
            // a parse failure on a successful strict call is a bug worth
            // surfacing with the body attached.
            Err(e) if matches!(policy, BodyPolicy::Strict) && success => {
                return Err(Error::UnexpectedResponse {
                    message: e.to_string(),
                    body,
                });
            }
            Err(_) => None,
        };

        Ok(ApiResponse {
            http_status,
            payload,
            latency,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(e)
        }
    }
}

/// How to treat a body that is not valid JSON on a 2xx response.
#[derive(Debug, Clone, Copy)]
enum BodyPolicy {
    /// Parse failure is an [`Error::UnexpectedResponse`].
    Strict,
    /// Empty/non-JSON bodies are success with no payload.
    Lenient,
}

/// Build the base URL from a bare host, host:port, or full URL.
fn normalize_base_url(host: &str) -> Result<Url, Error> {
    let raw = if host.contains("://") {
        host.to_owned()
    } else {
        format!("http://{host}")
    };

    let mut url = Url::parse(&raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        let url = normalize_base_url("192.168.0.129").unwrap();
        assert_eq!(url.as_str(), "http://192.168.0.129/");
    }

    #[test]
    fn host_with_port_is_preserved() {
        let url = normalize_base_url("tkgw.example.net:8080").unwrap();
        assert_eq!(url.as_str(), "http://tkgw.example.net:8080/");
    }

    #[test]
    fn full_url_is_kept() {
        let url = normalize_base_url("https://gw.example.net/proxy").unwrap();
        assert_eq!(url.as_str(), "https://gw.example.net/proxy/");
    }
}
