//! Locker command handlers.

use keyfly_core::{Credential, Gateway, GatewayConfig, LockerOp, Operation};

use crate::cli::{GlobalOpts, LockerArgs, LockerCmd};
use crate::error::CliError;

use super::util;

/// Resolve a locker name to its credential, with a helpful not-found error.
fn resolve_credential(config: &GatewayConfig, name: &str) -> Result<Credential, CliError> {
    config
        .locker(name)
        .cloned()
        .ok_or_else(|| CliError::LockerNotFound {
            name: name.to_owned(),
            available: if config.lockers.is_empty() {
                "(none)".to_owned()
            } else {
                config
                    .lockers
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        })
}

pub async fn handle(
    gw: &Gateway,
    config: &GatewayConfig,
    args: LockerArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let credential = resolve_credential(config, &args.name)?;

    let op = match args.command {
        LockerCmd::Open => LockerOp::Open,
        LockerCmd::Close => LockerOp::Close,
        LockerCmd::Calibrate => LockerOp::Calibrate,
        LockerCmd::Status => LockerOp::Status,
        LockerCmd::Sync => LockerOp::Synchronize,
        LockerCmd::Update => {
            if !util::confirm(
                &format!("Trigger a firmware update on locker '{}'?", args.name),
                global.yes,
            )? {
                return Ok(());
            }
            LockerOp::Update
        }
    };

    let result = gw.execute(&Operation::Locker { credential, op }).await?;
    util::report_result(&result, global)
}
