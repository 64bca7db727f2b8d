//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and a documented exit-code map.

use miette::Diagnostic;
use thiserror::Error;

use keyfly_config::ConfigError;
use keyfly_core::CoreError;

/// Exit codes per the CLI contract.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CREDENTIALS: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to gateway at {url}")]
    #[diagnostic(
        code(keyfly::connection_failed),
        help(
            "Check that the gateway is powered and reachable.\n\
             URL: {url}\n\
             Try: keyfly discover <subnet-host> to locate it"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Gateway did not answer{}", seconds.map_or_else(String::new, |s| format!(" within {s}s")))]
    #[diagnostic(
        code(keyfly::timeout),
        help("Increase the deadline with --timeout or check gateway responsiveness.")
    )]
    Timeout { seconds: Option<u64> },

    // ── Credentials ──────────────────────────────────────────────────
    #[error("Credential problem: {reason}")]
    #[diagnostic(
        code(keyfly::credentials),
        help(
            "Store a real secret with: keyfly config set-secret <locker>\n\
             Or set the locker's secret_env variable."
        )
    )]
    Credentials { reason: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Unknown locker '{name}'")]
    #[diagnostic(
        code(keyfly::locker_not_found),
        help("Configured lockers: {available}\nAdd one with: keyfly config init")
    )]
    LockerNotFound { name: String, available: String },

    // ── Gateway API ──────────────────────────────────────────────────
    #[error("Gateway error ({code}): {message}")]
    #[diagnostic(code(keyfly::gateway_error))]
    GatewayError { code: String, message: String },

    #[error("Operation failed with gateway status {status}")]
    #[diagnostic(
        code(keyfly::operation_failed),
        help("The gateway rejected the command. Run with -v for the raw response.")
    )]
    OperationFailed { status: i64 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(keyfly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration problem")]
    #[diagnostic(
        code(keyfly::config),
        help("Create or repair the config file with: keyfly config init")
    )]
    Config(#[source] Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(keyfly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(keyfly::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Credentials { .. } => exit_code::CREDENTIALS,
            Self::LockerNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },

            CoreError::InvalidCredential { reason } => Self::Credentials { reason },

            CoreError::UnexpectedResponse { message, body } => Self::GatewayError {
                code: "unexpected_response".into(),
                message: format!("{message}: {body}"),
            },

            CoreError::LockerNotFound { name } => Self::LockerNotFound {
                name,
                available: String::new(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::GatewayError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoSecret { locker } => Self::Credentials {
                reason: format!("no secret configured for locker '{locker}'"),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}
