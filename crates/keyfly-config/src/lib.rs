//! Configuration loading and credential resolution for keyfly.
//!
//! TOML config file plus `KEYFLY_`-prefixed environment overrides,
//! per-locker secret resolution (env var, then system keyring, then
//! plaintext), and translation to `keyfly_core::GatewayConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use keyfly_core::{Credential, GatewayConfig, RateDelays, TlsMode};

/// Keyring service name; entries are keyed `<locker>/secret`.
const KEYRING_SERVICE: &str = "keyfly";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no secret configured for locker '{locker}'")]
    NoSecret { locker: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewaySection,

    /// Named lockers. BTreeMap keeps listing order stable.
    #[serde(default)]
    pub lockers: BTreeMap<String, LockerEntry>,

    #[serde(default)]
    pub delays: DelaySection,
}

/// The `[gateway]` section.
#[derive(Debug, Deserialize, Serialize)]
pub struct GatewaySection {
    /// Gateway host, host:port, or full URL.
    #[serde(default = "default_host")]
    pub host: String,

    /// Skip TLS verification (self-signed gateways).
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            host: default_host(),
            insecure: default_insecure(),
            timeout: default_timeout(),
        }
    }
}

fn default_host() -> String {
    // The vendor ships gateways preconfigured with this LAN address.
    "192.168.0.129".into()
}
fn default_insecure() -> bool {
    true
}
fn default_timeout() -> u64 {
    10
}

/// One `[lockers.<name>]` entry.
#[derive(Debug, Deserialize, Serialize)]
pub struct LockerEntry {
    /// Locker identifier sent on the wire.
    pub identifier: String,

    /// Signing secret in plaintext (prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Environment variable name holding the signing secret.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_env: Option<String>,
}

/// The `[delays]` section, in seconds.
#[derive(Debug, Deserialize, Serialize)]
pub struct DelaySection {
    #[serde(default = "default_heavy_delay")]
    pub heavy: f64,
    #[serde(default = "default_light_delay")]
    pub light: f64,
}

impl Default for DelaySection {
    fn default() -> Self {
        Self {
            heavy: default_heavy_delay(),
            light: default_light_delay(),
        }
    }
}

fn default_heavy_delay() -> f64 {
    2.0
}
fn default_light_delay() -> f64 {
    0.5
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "keyfly", "keyfly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("keyfly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full `Config` from a specific file plus environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KEYFLY_").split("_"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), lockers = config.lockers.len(), "config loaded");
    Ok(config)
}

/// Load from the canonical config path.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent
/// directories as needed.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Save to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Secret resolution ───────────────────────────────────────────────

/// Resolve a locker's signing secret through the credential chain:
/// `secret_env` environment variable, then the system keyring, then
/// plaintext from the config file.
pub fn resolve_secret(entry: &LockerEntry, locker_name: &str) -> Result<String, ConfigError> {
    // 1. Environment variable named in the config
    if let Some(ref env_name) = entry.secret_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(val);
        }
    }

    // 2. System keyring
    if let Ok(keyring_entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{locker_name}/secret"))
    {
        if let Ok(secret) = keyring_entry.get_password() {
            return Ok(secret);
        }
    }

    // 3. Plaintext in config
    if let Some(ref secret) = entry.secret {
        return Ok(secret.clone());
    }

    Err(ConfigError::NoSecret {
        locker: locker_name.into(),
    })
}

/// Store a locker's signing secret in the system keyring.
pub fn store_secret(locker_name: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{locker_name}/secret"))?;
    entry.set_password(secret)?;
    Ok(())
}

// ── Translation to core ─────────────────────────────────────────────

/// Build the runtime `GatewayConfig`, resolving every locker secret.
///
/// A locker whose secret cannot be resolved fails the whole load; a
/// partially usable config silently dropping lockers would be worse.
pub fn to_gateway_config(cfg: &Config) -> Result<GatewayConfig, ConfigError> {
    for (field, value) in [("delays.heavy", cfg.delays.heavy), ("delays.light", cfg.delays.light)] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation {
                field: field.into(),
                reason: format!("delay must be a non-negative number, got {value}"),
            });
        }
    }

    let mut lockers = BTreeMap::new();
    for (name, entry) in &cfg.lockers {
        let secret = resolve_secret(entry, name)?;
        lockers.insert(name.clone(), Credential::new(entry.identifier.clone(), secret));
    }

    let tls = if cfg.gateway.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    Ok(GatewayConfig {
        host: cfg.gateway.host.clone(),
        lockers,
        delays: RateDelays {
            heavy: Duration::from_secs_f64(cfg.delays.heavy),
            light: Duration::from_secs_f64(cfg.delays.light),
        },
        tls,
        timeout: Duration::from_secs(cfg.gateway.timeout),
    })
}
