//! Bridges the config file and global CLI flags into a runtime
//! `GatewayConfig`.

use std::path::PathBuf;
use std::time::Duration;

use keyfly_core::GatewayConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file path to use: `--config`, else the platform default.
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(keyfly_config::config_path)
}

/// Load the TOML config. A missing file yields the built-in defaults,
/// so commands that only touch the gateway work with zero setup.
pub fn load(global: &GlobalOpts) -> Result<keyfly_config::Config, CliError> {
    Ok(keyfly_config::load_config_from(&effective_path(global))?)
}

/// Build the runtime `GatewayConfig` with CLI flag overrides applied.
pub fn build_gateway_config(global: &GlobalOpts) -> Result<GatewayConfig, CliError> {
    let cfg = load(global)?;
    let mut gateway = keyfly_config::to_gateway_config(&cfg)?;

    if let Some(ref host) = global.host {
        gateway.host.clone_from(host);
    }
    if let Some(timeout) = global.timeout {
        gateway.timeout = Duration::from_secs(timeout);
    }

    Ok(gateway)
}
