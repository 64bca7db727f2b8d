//! Gateway-level command handlers.

use tabled::Tabled;

use keyfly_core::{Gateway, GatewayCommand, Operation};

use crate::cli::{GatewayArgs, GatewayCmd, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LockerRow {
    #[tabled(rename = "Identifier")]
    identifier: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&serde_json::Value> for LockerRow {
    fn from(v: &serde_json::Value) -> Self {
        Self {
            identifier: v["identifier"]
                .as_str()
                .unwrap_or_default()
                .to_owned(),
            name: v["name"].as_str().unwrap_or_default().to_owned(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(gw: &Gateway, args: GatewayArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        GatewayCmd::List => {
            let result = gw
                .execute(&Operation::Gateway(GatewayCommand::ListLockers))
                .await?;
            let lockers: Vec<serde_json::Value> = result
                .raw
                .as_array()
                .cloned()
                .unwrap_or_default();
            let out = output::render_list(
                &global.output,
                &lockers,
                |v| LockerRow::from(v),
                |v| v["identifier"].as_str().unwrap_or_default().to_owned(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GatewayCmd::Status => {
            let result = gw
                .execute(&Operation::Gateway(GatewayCommand::Status))
                .await?;
            // Status payloads vary by firmware; show them raw.
            let out = match global.output {
                OutputFormat::JsonCompact => output::render_json_compact(&result.raw),
                OutputFormat::Yaml => output::render_yaml(&result.raw),
                _ => output::render_json_pretty(&result.raw),
            };
            output::print_output(&out, global.quiet);
            util::check_result(&result)
        }

        GatewayCmd::Sync => {
            let result = gw
                .execute(&Operation::Gateway(GatewayCommand::Synchronize))
                .await?;
            util::report_result(&result, global)
        }

        GatewayCmd::Update => {
            if !util::confirm("Trigger a gateway firmware update?", global.yes)? {
                return Ok(());
            }
            let result = gw
                .execute(&Operation::Gateway(GatewayCommand::Update))
                .await?;
            util::report_result(&result, global)
        }
    }
}
