// ── Runtime gateway configuration ──
//
// These types describe *how* to reach a gateway and how hard it may be
// driven. They carry credential data and tuning, but never touch disk.
// The CLI constructs a `GatewayConfig` (via keyfly-config) and hands it in.

use std::collections::BTreeMap;
use std::time::Duration;

use keyfly_api::{Credential, TlsMode};

/// Minimum spacing between admitted exchanges, per operation class.
///
/// Defaults are deliberately conservative for an actuator API: two seconds
/// between locker calls, half a second between gateway queries. Run
/// `keyfly benchmark` against a real gateway to derive tighter values.
#[derive(Debug, Clone, PartialEq)]
pub struct RateDelays {
    /// Minimum delay between Heavy (locker) calls.
    pub heavy: Duration,
    /// Minimum delay between Light (gateway) calls.
    pub light: Duration,
}

impl Default for RateDelays {
    fn default() -> Self {
        Self {
            heavy: Duration::from_secs(2),
            light: Duration::from_millis(500),
        }
    }
}

/// Configuration for driving a single gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway host, host:port, or full URL.
    pub host: String,
    /// Per-locker credentials, keyed by the short locker name used on the
    /// command line. BTreeMap for deterministic iteration order.
    pub lockers: BTreeMap<String, Credential>,
    /// Per-class minimum delays.
    pub delays: RateDelays,
    /// TLS verification for HTTPS gateways.
    pub tls: TlsMode,
    /// Per-request deadline.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Look up a locker credential by short name.
    pub fn locker(&self, name: &str) -> Option<&Credential> {
        self.lockers.get(name)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "192.168.0.129".into(),
            lockers: BTreeMap::new(),
            delays: RateDelays::default(),
            tls: TlsMode::default(),
            timeout: Duration::from_secs(10),
        }
    }
}
