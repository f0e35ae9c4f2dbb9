//! Retry with exponential backoff and jitter.
//!
//! One utility shared by every read-only provider call instead of ad hoc
//! loops per route. Only idempotent operations go through here: availability
//! checks, status probes, uniqueness lookups. Purchases and DNS mutations
//! are called exactly once; retrying those risks duplicate charges or
//! double record replacement.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Backoff policy: capped exponential delays with full jitter.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub base: Duration,
    /// Upper bound on any single delay.
    pub cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base: Duration::from_millis(500),
            cap: Duration::from_secs(8),
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based), jittered.
    fn delay(&self, attempt: u32) -> Duration {
        let exp = self.base.saturating_mul(2u32.saturating_pow(attempt));
        let capped = exp.min(self.cap);
        // Full jitter: uniform in [capped/2, capped].
        let millis = capped.as_millis().min(u128::from(u64::MAX));
        #[allow(clippy::cast_possible_truncation)]
        let millis = millis as u64;
        let jittered = rand::rng().random_range(millis / 2..=millis.max(1));
        Duration::from_millis(jittered)
    }
}

/// Run `op`, retrying on failure up to the policy's attempt ceiling.
///
/// The operation must be idempotent; see the module docs. The last error is
/// returned once the ceiling is reached.
///
/// # Errors
///
/// Returns the final attempt's error after exhausting retries.
pub async fn retry<T, E, F, Fut>(policy: Backoff, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < attempts => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    operation = what,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
