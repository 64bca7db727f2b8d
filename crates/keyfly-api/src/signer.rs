//! Authentication token construction for signed locker actions.
//!
//! The gateway authenticates locker actuation with a per-call token:
//!
//! ```text
//! token = base64( HMAC-SHA256( key = locker secret, message = ts ) )
//! ```
//!
//! where `ts` is the ASCII decimal unix timestamp at whole-second
//! granularity. The signed form body is `hash=<token>&identifier=<id>&ts=<ts>`;
//! the field layout matches the vendor's reference client byte for byte.
//!
//! Signing is a pure function of its inputs: no I/O, no retries, no clock
//! access (the caller supplies the timestamp).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

/// Credentials for one locker: an opaque identifier plus the shared
/// secret used as the HMAC key. Immutable once loaded from configuration.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Locker identifier sent alongside the token.
    pub identifier: String,
    /// Shared signing secret. Never logged or serialized.
    pub secret: SecretString,
}

impl Credential {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// The gateway treats empty and `changeme` secrets as unconfigured
    /// placeholders; signing with one would produce a valid-looking but
    /// meaningless token.
    pub fn is_placeholder(&self) -> bool {
        let secret = self.secret.expose_secret();
        secret.is_empty() || secret.eq_ignore_ascii_case("changeme")
    }
}

/// Derive the authentication token for one call.
///
/// Deterministic: the same `(credential, timestamp)` pair always yields the
/// same token. Fails with [`Error::InvalidCredential`] when the secret is
/// empty or not pure ASCII (the vendor client encodes both secret and
/// timestamp as ASCII before hashing).
pub fn sign(credential: &Credential, timestamp: u64) -> Result<String, Error> {
    let secret = credential.secret.expose_secret();

    if secret.is_empty() {
        return Err(Error::InvalidCredential {
            reason: format!("empty secret for locker '{}'", credential.identifier),
        });
    }
    if !secret.is_ascii() {
        return Err(Error::InvalidCredential {
            reason: format!(
                "secret for locker '{}' contains non-ASCII bytes",
                credential.identifier
            ),
        });
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| Error::InvalidCredential {
            reason: "secret rejected as HMAC key".into(),
        })?;
    mac.update(timestamp.to_string().as_bytes());

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Current unix timestamp at the wire contract's whole-second granularity.
pub fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
