//! Client and adapter configuration.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::adapter::RetryPolicy;

/// Local Client Portal gateway address.
pub const DEFAULT_BASE_URL: &str = "https://localhost:5000/v1/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Position pages read before giving up on an account (100 entries each).
pub const DEFAULT_MAX_POSITION_PAGES: u32 = 50;

/// Connection settings for the broker web client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, including the `/v1/api` prefix
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Accept the gateway's self-signed certificate
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: true,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables, falling back to defaults:
    /// - IBKR_BASE_URL
    /// - IBKR_TIMEOUT_SECS
    /// - IBKR_ACCEPT_INVALID_CERTS
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("IBKR_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(secs) = std::env::var("IBKR_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().context("Invalid IBKR_TIMEOUT_SECS")?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Ok(flag) = std::env::var("IBKR_ACCEPT_INVALID_CERTS") {
            config.accept_invalid_certs = flag
                .parse()
                .context("Invalid IBKR_ACCEPT_INVALID_CERTS")?;
        }

        Ok(config)
    }
}

/// Retry policy per broker operation, plus bootstrap behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Account and subaccount listings that must succeed before portfolio calls
    pub bootstrap: RetryPolicy,

    /// Also list accounts during bootstrap, not only subaccounts
    pub bootstrap_accounts: bool,

    pub ledger: RetryPolicy,
    pub positions: RetryPolicy,

    /// Ceiling on position pages per account, in case the gateway keeps
    /// returning full pages
    pub max_position_pages: u32,

    pub snapshot: RetryPolicy,
    pub history: RetryPolicy,
    pub live_orders: RetryPolicy,

    /// Order creation is not idempotent: a retry after a lost response can
    /// submit the same order twice.
    pub place_order: RetryPolicy,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            bootstrap: RetryPolicy::fixed(3, Duration::from_secs(1)),
            bootstrap_accounts: true,
            ledger: RetryPolicy::Never,
            positions: RetryPolicy::Never,
            max_position_pages: DEFAULT_MAX_POSITION_PAGES,
            snapshot: RetryPolicy::fixed(5, Duration::from_secs(1)),
            history: RetryPolicy::Never,
            live_orders: RetryPolicy::Never,
            place_order: RetryPolicy::Never,
        }
    }
}

impl AdapterConfig {
    /// Replace the sleep interval of every fixed policy.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        for policy in [
            &mut self.bootstrap,
            &mut self.ledger,
            &mut self.positions,
            &mut self.snapshot,
            &mut self.history,
            &mut self.live_orders,
            &mut self.place_order,
        ] {
            if let RetryPolicy::Fixed { interval: i, .. } = policy {
                *i = interval;
            }
        }
        self
    }
}
