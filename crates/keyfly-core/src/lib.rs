//! Business logic between `keyfly-api` and the CLI.
//!
//! This crate owns everything that is not wire plumbing:
//!
//! - **[`RateLimiter`]**: two independent [`RateBudget`](limiter) instances
//!   (Heavy for locker calls, Light for gateway queries) enforcing a minimum
//!   spacing between admitted exchanges, safe under concurrent callers.
//!
//! - **[`Gateway`]**: the rate-limited facade every command goes through:
//!   classify the operation, acquire the budget, perform the signed exchange
//!   via `keyfly-api`, interpret the `{"status": N}` vocabulary into an
//!   [`OperationResult`].
//!
//! - **[`Scanner`]**: bounded-concurrency, paced discovery of open ports
//!   and live API endpoints on a candidate gateway host.
//!
//! - **[`bench`]**: the latency benchmark harness: drives real `Gateway`
//!   calls, aggregates per-class statistics, and derives recommended rate
//!   budgets.
//!
//! The CLI constructs a [`GatewayConfig`] (from `keyfly-config`) and hands
//! it in; core never reads config files.

pub mod bench;
pub mod config;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod scan;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bench::{
    BenchProgress, BenchmarkReport, ClassSummary, LatencySample, Recommendation, run_benchmark,
};
pub use config::{GatewayConfig, RateDelays};
pub use error::CoreError;
pub use gateway::{DoorState, Gateway, LockerOp, Operation, OperationResult};
pub use limiter::{OperationClass, RateLimiter};
pub use scan::{Endpoint, ScanOptions, ScanReport, ScanResult, ScanTarget, Scanner};

// Re-export the wire types consumers need, so the CLI doesn't depend on
// keyfly-api directly.
pub use keyfly_api::{Credential, GatewayCommand, ProbeErrorKind, ProbeMethod, TlsMode};
