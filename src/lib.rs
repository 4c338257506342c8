//! Interactive Brokers Web API adapter.
//!
//! Translates account ledgers, positions, market snapshots, historical bars,
//! and orders between the broker's wire model and broker-independent domain
//! models, retrying the calls that are safe to retry.

pub mod adapter;
pub mod api;
pub mod config;
pub mod error;
pub mod models;

pub use adapter::{ContractMap, IbkrAdapter, RetryPolicy};
pub use api::{BrokerApi, IbkrClient};
pub use config::{AdapterConfig, ClientConfig};
pub use error::{AdapterError, ApiError};
