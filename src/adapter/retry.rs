//! Bounded, fixed-interval retries for broker calls.
//!
//! The gateway rejects portfolio calls until its session bootstrap calls have
//! succeeded, and snapshots come back empty while it subscribes to a contract.
//! Both settle within a few seconds, so a handful of attempts with a constant
//! pause is all the resilience needed here.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::{Backoff, Constant};
use tracing::warn;

use crate::error::{AdapterError, ApiError};

/// How often to attempt a broker operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Single attempt; the error is returned unchanged.
    Never,
    /// Up to `max_attempts` attempts with `interval` between them.
    Fixed { max_attempts: u32, interval: Duration },
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        RetryPolicy::Fixed {
            max_attempts,
            interval,
        }
    }

    /// Total attempts, including the first one.
    pub fn max_attempts(&self) -> u32 {
        match self {
            RetryPolicy::Never => 1,
            RetryPolicy::Fixed { max_attempts, .. } => (*max_attempts).max(1),
        }
    }
}

/// Pause between attempts. Swapped out in tests to avoid real delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `call` under `policy`.
///
/// With `RetryPolicy::Never` a failure is passed through as
/// `AdapterError::Broker`; with a fixed policy the last failure is wrapped in
/// `AdapterError::MaxRetriesExceeded` once every attempt has failed.
pub async fn with_retries<T, F, Fut>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    operation: &'static str,
    mut call: F,
) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let (max_attempts, interval) = match policy {
        RetryPolicy::Never => return call().await.map_err(AdapterError::from),
        RetryPolicy::Fixed { interval, .. } => (policy.max_attempts(), interval),
    };

    let mut backoff = Constant::new(interval);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                return Err(AdapterError::MaxRetriesExceeded {
                    operation,
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                warn!(
                    operation,
                    attempt,
                    max_attempts,
                    error = %e,
                    "Broker call failed, retrying"
                );
                if let Some(delay) = backoff.next_backoff() {
                    sleeper.sleep(delay).await;
                }
            }
        }
    }
}
