//! Per-class rate limiting for outbound gateway calls.
//!
//! The gateway is a small embedded device; overlapping actuation calls can
//! wedge it. Every outbound call is therefore admitted through one of two
//! independent budgets: **Heavy** for locker operations, **Light** for
//! gateway-level queries. Within a class, no two admitted exchanges start
//! less than the configured minimum delay apart; across classes there is
//! no ordering guarantee.

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tracing::trace;

use crate::config::RateDelays;

/// Which budget an operation draws from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperationClass {
    /// Locker actuation/status/calibrate/sync/update.
    Heavy,
    /// Gateway-level list/status/sync/update.
    Light,
}

/// One class's budget: the minimum spacing plus the last admission time.
///
/// The mutex is held across the compare-sleep-record sequence, so under
/// concurrent callers at most one is in the sleep/record step and the
/// recorded timestamp is the actual admission time. Releasing before the
/// sleep would let two callers compute a stale "last admitted" and
/// under-throttle.
#[derive(Debug)]
struct RateBudget {
    min_delay: Duration,
    last_admitted: Mutex<Option<Instant>>,
}

impl RateBudget {
    fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_admitted: Mutex::new(None),
        }
    }

    async fn acquire(&self) -> Instant {
        let mut last = self.last_admitted.lock().await;

        if let Some(prev) = *last {
            let earliest = prev + self.min_delay;
            let now = Instant::now();
            if earliest > now {
                trace!(wait_ms = (earliest - now).as_millis() as u64, "throttling");
                tokio::time::sleep_until(earliest).await;
            }
        }

        let admitted = Instant::now();
        *last = Some(admitted);
        admitted
    }
}

/// Two independent budgets. Heavy and Light callers never block each other.
#[derive(Debug)]
pub struct RateLimiter {
    heavy: RateBudget,
    light: RateBudget,
}

impl RateLimiter {
    pub fn new(delays: &RateDelays) -> Self {
        Self {
            heavy: RateBudget::new(delays.heavy),
            light: RateBudget::new(delays.light),
        }
    }

    /// Block until the class's budget admits a new exchange, then record
    /// the admission. Returns the admission instant (useful for tests and
    /// latency accounting). Bounded wait: never longer than the class's
    /// minimum delay past the previous admission.
    pub async fn acquire(&self, class: OperationClass) -> Instant {
        match class {
            OperationClass::Heavy => self.heavy.acquire().await,
            OperationClass::Light => self.light.acquire().await,
        }
    }

    /// The configured minimum delay for a class.
    pub fn min_delay(&self, class: OperationClass) -> Duration {
        match class {
            OperationClass::Heavy => self.heavy.min_delay,
            OperationClass::Light => self.light.min_delay,
        }
    }
}
