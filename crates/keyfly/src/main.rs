mod cli;
mod commands;
mod config;
mod error;
mod output;
mod report;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use keyfly_core::Gateway;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a gateway connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // The scanner builds its own probe transport
        Command::Discover(args) => commands::discover::handle(args, &cli.global).await,

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "keyfly", &mut std::io::stdout());
            Ok(())
        }

        // Everything else goes through the rate-limited gateway facade
        Command::Gateway(args) => {
            let (gateway, _) = connect(&cli.global, None)?;
            commands::gateway::handle(&gateway, args, &cli.global).await
        }
        Command::Locker(args) => {
            let (gateway, gateway_config) = connect(&cli.global, None)?;
            commands::locker::handle(&gateway, &gateway_config, args, &cli.global).await
        }
        Command::Benchmark(args) => {
            // The benchmark's positional host outranks config and --host.
            let (gateway, gateway_config) = connect(&cli.global, args.host.as_deref())?;
            commands::benchmark::handle(&gateway, &gateway_config, args, &cli.global).await
        }
    }
}

fn connect(
    global: &cli::GlobalOpts,
    host_override: Option<&str>,
) -> Result<(Gateway, keyfly_core::GatewayConfig), CliError> {
    let mut gateway_config = config::build_gateway_config(global)?;
    if let Some(host) = host_override {
        gateway_config.host = host.to_owned();
    }
    tracing::debug!(host = %gateway_config.host, "connecting to gateway");
    let gateway = Gateway::new(&gateway_config)?;
    Ok((gateway, gateway_config))
}
