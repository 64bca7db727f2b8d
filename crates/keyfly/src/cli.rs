//! Clap derive structures for the `keyfly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// keyfly -- command-line client for The Keys smart-lock gateways
#[derive(Debug, Parser)]
#[command(
    name = "keyfly",
    version,
    about = "Control smart-lock gateways from the command line",
    long_about = "A CLI for The Keys-style smart-lock gateways.\n\n\
        Sends HMAC-signed commands to lockers, queries the gateway, and\n\
        ships two auxiliary tools: a latency benchmarker that derives safe\n\
        request rates and a network scanner that finds gateways on the LAN.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (default: XDG config dir)
    #[arg(long, env = "KEYFLY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Gateway host, host:port, or URL (overrides config)
    #[arg(long, short = 'H', env = "KEYFLY_HOST", global = true)]
    pub host: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "KEYFLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "KEYFLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Gateway-level queries and maintenance
    #[command(alias = "gw")]
    Gateway(GatewayArgs),

    /// Operate a configured locker
    #[command(alias = "l")]
    Locker(LockerArgs),

    /// Measure gateway latency and derive safe request rates
    #[command(alias = "bench")]
    Benchmark(BenchmarkArgs),

    /// Scan a host for gateway ports and API endpoints
    #[command(alias = "scan")]
    Discover(DiscoverArgs),

    /// Manage CLI configuration and locker secrets
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GATEWAY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GatewayArgs {
    #[command(subcommand)]
    pub command: GatewayCmd,
}

#[derive(Debug, Subcommand)]
pub enum GatewayCmd {
    /// List lockers known to the gateway
    #[command(alias = "ls")]
    List,

    /// Query gateway status
    Status,

    /// Trigger a gateway-wide synchronization
    Sync,

    /// Trigger a gateway firmware update
    Update,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOCKER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LockerArgs {
    /// Locker name from the config file
    pub name: String,

    #[command(subcommand)]
    pub command: LockerCmd,
}

#[derive(Debug, Subcommand)]
pub enum LockerCmd {
    /// Unlock
    Open,

    /// Lock
    Close,

    /// Run the locker's calibration routine
    Calibrate,

    /// Query lock and door state
    Status,

    /// Synchronize the locker with the gateway
    Sync,

    /// Trigger a locker firmware update
    Update,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  BENCHMARK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct BenchmarkArgs {
    /// Gateway host to benchmark (default: configured host)
    pub host: Option<String>,

    /// Rounds of calls per target
    #[arg(long, short = 'n', default_value = "5")]
    pub iterations: u32,

    /// Skip writing the JSON report file
    #[arg(long)]
    pub no_report: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DISCOVER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Host or IP to scan
    pub host: String,

    /// Delay between endpoint probes, in seconds
    #[arg(long, default_value = "0.2")]
    pub delay: f64,

    /// Max probes in flight at once
    #[arg(long, short = 'c', default_value = "3")]
    pub concurrency: usize,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCmd,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    /// Create a config file interactively
    Init,

    /// Show the effective configuration (secrets redacted)
    Show,

    /// Store a locker's signing secret in the system keyring
    SetSecret {
        /// Locker name
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
