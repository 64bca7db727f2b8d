//! The rate-limited gateway facade.
//!
//! Every command the CLI issues goes through [`Gateway::execute`]:
//! classify the operation, acquire the class's rate budget (which may
//! suspend the caller), perform the exchange via `keyfly-api`, and
//! interpret the response into an [`OperationResult`].

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use keyfly_api::{
    ApiResponse, Credential, GatewayClient, GatewayCommand, LockerAction, MaintenanceKind,
    TransportConfig, status_code,
};

use crate::config::GatewayConfig;
use crate::error::CoreError;
use crate::limiter::{OperationClass, RateLimiter};

// ── Operations ───────────────────────────────────────────────────────

/// A locker-scoped operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LockerOp {
    Open,
    Close,
    Calibrate,
    Status,
    Synchronize,
    Update,
}

/// One logical operation against the gateway or a specific locker.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Locker-scoped call. Actuation/status/calibrate are signed with the
    /// credential; sync/update send the identifier only.
    Locker {
        credential: Credential,
        op: LockerOp,
    },
    /// Gateway-level command (unauthenticated per the vendor API).
    Gateway(GatewayCommand),
}

impl Operation {
    /// Which rate budget this operation draws from.
    pub fn class(&self) -> OperationClass {
        match self {
            Self::Locker { .. } => OperationClass::Heavy,
            Self::Gateway(_) => OperationClass::Light,
        }
    }
}

// ── Results ──────────────────────────────────────────────────────────

/// Door state reported by the locker status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    Open,
    Closed,
}

/// The interpreted outcome of one operation. Immutable after construction.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    /// Whether the gateway reported success (including the door-state
    /// codes, which are successful status reports).
    pub success: bool,
    /// The gateway's status code when the payload carried one, otherwise
    /// the raw HTTP status.
    pub code: i64,
    /// Door state for the 49/50 vocabulary.
    pub door: Option<DoorState>,
    /// The raw payload, for callers that need fields beyond `status`.
    pub raw: serde_json::Value,
    /// Wall-clock duration of the network exchange.
    #[serde(rename = "latency_secs", serialize_with = "serialize_secs")]
    pub latency: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl OperationResult {
    /// Interpret a raw exchange into the domain vocabulary:
    /// 0 = success, 49 = door closed, 50 = door open; any other payload
    /// status passes through opaque; payloads without a `status` field
    /// (e.g. the locker list) fall back to the HTTP status.
    fn interpret(resp: ApiResponse) -> Self {
        let http_ok = (200..300).contains(&resp.http_status);

        let (success, code, door) = match resp.payload.as_ref().and_then(|p| p["status"].as_i64()) {
            Some(status_code::SUCCESS) => (true, status_code::SUCCESS, None),
            Some(status_code::DOOR_CLOSED) => {
                (true, status_code::DOOR_CLOSED, Some(DoorState::Closed))
            }
            Some(status_code::DOOR_OPEN) => (true, status_code::DOOR_OPEN, Some(DoorState::Open)),
            Some(other) => (false, other, None),
            None => (http_ok, i64::from(resp.http_status), None),
        };

        Self {
            success,
            code,
            door,
            raw: resp.payload.unwrap_or(serde_json::Value::Null),
            latency: resp.latency,
        }
    }
}

// ── Facade ───────────────────────────────────────────────────────────

/// Rate-limited facade over the gateway HTTP API.
///
/// Owns the shared [`RateLimiter`]; all calls made through one `Gateway`
/// share the two budgets for the process lifetime.
pub struct Gateway {
    client: GatewayClient,
    limiter: RateLimiter,
}

impl Gateway {
    /// Build from runtime configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
        };
        let client = GatewayClient::new(&config.host, &transport)?;
        Ok(Self {
            client,
            limiter: RateLimiter::new(&config.delays),
        })
    }

    /// Assemble from pre-built parts (tests, custom transports).
    pub fn with_parts(client: GatewayClient, limiter: RateLimiter) -> Self {
        Self { client, limiter }
    }

    pub fn base_url(&self) -> &url::Url {
        self.client.base_url()
    }

    /// Execute one operation: acquire the rate budget, exchange, interpret.
    ///
    /// The budget is updated at admission time, before the exchange; a
    /// subsequent timeout does not refund the slot. Timeouts and transport
    /// failures surface as typed errors and are never retried here.
    pub async fn execute(&self, operation: &Operation) -> Result<OperationResult, CoreError> {
        let class = operation.class();
        self.limiter.acquire(class).await;
        debug!(%class, ?operation, "admitted");

        let resp = match operation {
            Operation::Locker { credential, op } => match op {
                LockerOp::Open => {
                    self.client
                        .locker_action(LockerAction::Open, credential)
                        .await?
                }
                LockerOp::Close => {
                    self.client
                        .locker_action(LockerAction::Close, credential)
                        .await?
                }
                LockerOp::Calibrate => {
                    self.client
                        .locker_action(LockerAction::Calibrate, credential)
                        .await?
                }
                LockerOp::Status => {
                    self.client
                        .locker_action(LockerAction::Status, credential)
                        .await?
                }
                LockerOp::Synchronize => {
                    self.client
                        .locker_maintenance(MaintenanceKind::Synchronize, &credential.identifier)
                        .await?
                }
                LockerOp::Update => {
                    self.client
                        .locker_maintenance(MaintenanceKind::Update, &credential.identifier)
                        .await?
                }
            },
            Operation::Gateway(cmd) => self.client.gateway_command(*cmd).await?,
        };

        Ok(OperationResult::interpret(resp))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn resp(http_status: u16, payload: Option<serde_json::Value>) -> ApiResponse {
        ApiResponse {
            http_status,
            payload,
            latency: Duration::from_millis(42),
        }
    }

    #[test]
    fn code_zero_is_generic_success() {
        let r = OperationResult::interpret(resp(200, Some(serde_json::json!({"status": 0}))));
        assert!(r.success);
        assert_eq!(r.code, 0);
        assert_eq!(r.door, None);
    }

    #[test]
    fn code_49_means_door_closed() {
        let r = OperationResult::interpret(resp(200, Some(serde_json::json!({"status": 49}))));
        assert!(r.success);
        assert_eq!(r.code, 49);
        assert_eq!(r.door, Some(DoorState::Closed));
    }

    #[test]
    fn code_50_means_door_open() {
        let r = OperationResult::interpret(resp(200, Some(serde_json::json!({"status": 50}))));
        assert!(r.success);
        assert_eq!(r.code, 50);
        assert_eq!(r.door, Some(DoorState::Open));
    }

    #[test]
    fn unknown_code_passes_through_opaque() {
        let r = OperationResult::interpret(resp(200, Some(serde_json::json!({"status": 7}))));
        assert!(!r.success);
        assert_eq!(r.code, 7);
        assert_eq!(r.door, None);
    }

    #[test]
    fn statusless_payload_falls_back_to_http() {
        let r = OperationResult::interpret(resp(200, Some(serde_json::json!([{"id": 1}]))));
        assert!(r.success);
        assert_eq!(r.code, 200);
    }

    #[test]
    fn empty_body_on_http_error_is_failure() {
        let r = OperationResult::interpret(resp(503, None));
        assert!(!r.success);
        assert_eq!(r.code, 503);
    }

    #[test]
    fn locker_ops_are_heavy_gateway_ops_light() {
        let locker = Operation::Locker {
            credential: Credential::new("id", "secret"),
            op: LockerOp::Open,
        };
        assert_eq!(locker.class(), OperationClass::Heavy);
        assert_eq!(
            Operation::Gateway(GatewayCommand::Status).class(),
            OperationClass::Light
        );
    }
}
