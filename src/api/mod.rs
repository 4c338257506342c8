//! Interactive Brokers Web API: the broker port and its HTTP client.

mod client;
mod types;

use async_trait::async_trait;

use crate::error::ApiError;

pub use client::IbkrClient;
pub use types::*;

/// Logical operations of the broker web API consumed by the adapter.
#[async_trait]
pub trait BrokerApi: Send + Sync {
    /// List brokerage accounts. Part of the session bootstrap.
    async fn get_accounts(&self) -> Result<AccountsResponse, ApiError>;

    /// List portfolio subaccounts. Must succeed before portfolio endpoints.
    async fn get_portfolio_subaccounts(&self) -> Result<Vec<Subaccount>, ApiError>;

    async fn get_account_ledger(&self, account_id: &str) -> Result<Ledger, ApiError>;

    /// One page of positions, pages numbered from 0.
    async fn get_positions(
        &self,
        account_id: &str,
        page: u32,
    ) -> Result<Vec<PositionResponse>, ApiError>;

    async fn market_data_snapshot(
        &self,
        con_ids: &[ConId],
    ) -> Result<Vec<MarketDataSnapshot>, ApiError>;

    async fn market_data_history(
        &self,
        con_id: ConId,
        period: &str,
        bar: &str,
    ) -> Result<HistoryResponse, ApiError>;

    async fn place_order(
        &self,
        account_id: &str,
        order: &OrderRequest,
    ) -> Result<Vec<PlaceOrderReply>, ApiError>;

    async fn get_live_orders(&self) -> Result<LiveOrdersResponse, ApiError>;
}
