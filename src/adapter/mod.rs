//! Translation layer between the broker web API and the domain models.
//!
//! Every operation performs its broker round-trips one after another and
//! builds fresh domain values from the responses. Which calls are retried is
//! decided per operation by [`AdapterConfig`].

mod account;
mod contracts;
mod orders;
mod retry;
mod snapshot;
mod timeseries;

#[cfg(test)]
mod testing;

use std::future::Future;
use std::sync::Arc;

use crate::api::BrokerApi;
use crate::config::AdapterConfig;
use crate::error::{ApiError, Result};

pub use account::build_account;
pub use contracts::ContractMap;
pub use orders::{acknowledged_order_id, from_live_order, to_order_request};
pub use retry::{with_retries, RetryPolicy, Sleeper, TokioSleeper};
pub use snapshot::build_market_snapshot;
pub use timeseries::{bar_length, build_timeseries};

/// Adapter over a broker client.
pub struct IbkrAdapter<B> {
    broker: B,
    config: AdapterConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl<B: BrokerApi> IbkrAdapter<B> {
    /// Create an adapter with the default retry policies.
    pub fn new(broker: B) -> Self {
        Self::with_config(broker, AdapterConfig::default())
    }

    pub fn with_config(broker: B, config: AdapterConfig) -> Self {
        Self {
            broker,
            config,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace how the adapter waits between retry attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    async fn call<T, F, Fut>(&self, policy: RetryPolicy, operation: &'static str, call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, ApiError>>,
    {
        with_retries(policy, self.sleeper.as_ref(), operation, call).await
    }
}
