// ── Core error types ──
//
// User-facing errors from keyfly-core. Consumers never see reqwest errors
// directly; the `From<keyfly_api::Error>` impl translates transport-layer
// failures into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// `timeout_secs` is absent when the deadline that fired is not
    /// known at the point the failure was observed.
    #[error("Gateway did not answer{}", timeout_secs.map_or_else(String::new, |s| format!(" within {s}s")))]
    Timeout { timeout_secs: Option<u64> },

    // ── Credential errors ────────────────────────────────────────────
    #[error("Invalid credential: {reason}")]
    InvalidCredential { reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected gateway response: {message}")]
    UnexpectedResponse { message: String, body: String },

    #[error("Unknown locker: {name}")]
    LockerNotFound { name: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<keyfly_api::Error> for CoreError {
    fn from(err: keyfly_api::Error) -> Self {
        match err {
            keyfly_api::Error::InvalidCredential { reason } => {
                CoreError::InvalidCredential { reason }
            }
            keyfly_api::Error::Timeout { timeout_secs } => CoreError::Timeout {
                timeout_secs: Some(timeout_secs),
            },
            keyfly_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: None }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                }
            }
            keyfly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid gateway URL: {e}"),
            },
            keyfly_api::Error::UnexpectedResponse { message, body } => {
                CoreError::UnexpectedResponse { message, body }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_display_includes_deadline_when_known() {
        let err = CoreError::Timeout {
            timeout_secs: Some(10),
        };
        assert_eq!(err.to_string(), "Gateway did not answer within 10s");
    }

    #[test]
    fn timeout_display_omits_unknown_deadline() {
        let err = CoreError::Timeout { timeout_secs: None };
        assert_eq!(err.to_string(), "Gateway did not answer");
    }

    #[test]
    fn api_timeout_carries_its_deadline_through() {
        let err: CoreError = keyfly_api::Error::Timeout { timeout_secs: 7 }.into();
        assert!(matches!(
            err,
            CoreError::Timeout {
                timeout_secs: Some(7)
            }
        ));
    }
}
