//! Async HTTP client for The Keys lock-gateway API.
//!
//! The gateway fronts one or more lockers and exposes a small plain-HTTP
//! surface:
//!
//! - **Locker actions** (`/open`, `/close`, `/calibrate`, `/locker_status`):
//!   signed POSTs carrying an HMAC token derived from the locker secret.
//! - **Locker maintenance** (`/locker/synchronize`, `/locker/update`):
//!   identifier-only POSTs, no token.
//! - **Gateway commands** (`/lockers`, `/status`, `/synchronize`, `/update`):
//!   unauthenticated GET/POST calls.
//!
//! This crate owns the wire layer only: token construction ([`signer`]),
//! `reqwest` client assembly ([`TransportConfig`]), the per-call exchange
//! ([`GatewayClient`]), and the raw discovery probes ([`probe`]). Rate
//! limiting and result interpretation live in `keyfly-core`.

pub mod client;
pub mod error;
pub mod probe;
pub mod signer;
pub mod transport;
pub mod types;

pub use client::{ApiResponse, GatewayClient};
pub use error::Error;
pub use probe::{ProbeErrorKind, ProbeMethod, ProbeOutcome};
pub use signer::Credential;
pub use transport::{TlsMode, TransportConfig};
pub use types::{GatewayCommand, LockerAction, MaintenanceKind, status_code};
