//! Config command handlers: init, show, set-secret.

use dialoguer::{Confirm, Input, Password};

use keyfly_config::{Config, LockerEntry};

use crate::cli::{ConfigArgs, ConfigCmd, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCmd::Init => init(global),
        ConfigCmd::Show => show(global),
        ConfigCmd::SetSecret { name } => set_secret(&name, global),
    }
}

// ── init ────────────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::effective_path(global);
    if path.exists()
        && !Confirm::new()
            .with_prompt(format!("Overwrite existing config at {}?", path.display()))
            .default(false)
            .interact()
            .map_err(io_err)?
    {
        return Ok(());
    }

    let host: String = Input::new()
        .with_prompt("Gateway host")
        .default("192.168.0.129".into())
        .interact_text()
        .map_err(io_err)?;

    let mut cfg = Config::default();
    cfg.gateway.host = host;

    if Confirm::new()
        .with_prompt("Add a locker now?")
        .default(true)
        .interact()
        .map_err(io_err)?
    {
        let name: String = Input::new()
            .with_prompt("Locker name")
            .interact_text()
            .map_err(io_err)?;
        let identifier: String = Input::new()
            .with_prompt("Locker identifier")
            .interact_text()
            .map_err(io_err)?;
        let secret = Password::new()
            .with_prompt("Signing secret (stored in system keyring)")
            .interact()
            .map_err(io_err)?;

        keyfly_config::store_secret(&name, &secret)?;
        cfg.lockers.insert(
            name,
            LockerEntry {
                identifier,
                secret: None,
                secret_env: None,
            },
        );
    }

    keyfly_config::save_config_to(&cfg, &path)?;
    if !global.quiet {
        eprintln!("Config written to {}", path.display());
    }
    Ok(())
}

// ── show ────────────────────────────────────────────────────────────

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load(global)?;

    // Never print plaintext secrets, whatever the output format.
    for entry in cfg.lockers.values_mut() {
        if entry.secret.is_some() {
            entry.secret = Some("<redacted>".into());
        }
    }

    let out = toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
        field: "config".into(),
        reason: e.to_string(),
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── set-secret ──────────────────────────────────────────────────────

fn set_secret(name: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    if !cfg.lockers.contains_key(name) && !global.yes {
        eprintln!("Note: locker '{name}' is not in the config file yet.");
    }

    let secret = Password::new()
        .with_prompt(format!("Signing secret for '{name}'"))
        .interact()
        .map_err(io_err)?;

    keyfly_config::store_secret(name, &secret)?;
    if !global.quiet {
        eprintln!("Secret stored in system keyring for '{name}'");
    }
    Ok(())
}

fn io_err(e: dialoguer::Error) -> CliError {
    CliError::Io(std::io::Error::other(e))
}
