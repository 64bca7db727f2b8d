use thiserror::Error;

/// Top-level error type for the `keyfly-api` crate.
///
/// Covers every failure mode of a single gateway exchange: credential
/// validation, transport, timeout, and payload interpretation.
/// `keyfly-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Credentials ─────────────────────────────────────────────────
    /// The locker secret or identifier is unusable for signing.
    /// Fatal for the single operation; never retried.
    #[error("Invalid credential: {reason}")]
    InvalidCredential { reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The exchange exceeded its deadline. Surfaced to the caller,
    /// never silently retried inside this crate.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data ────────────────────────────────────────────────────────
    /// The response body could not be parsed into the expected shape.
    /// Carries the raw body for diagnosis.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a connection-level failure
    /// (as opposed to a timeout or a malformed payload).
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Returns `true` if the exchange hit its deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}
