//! Client Portal Web API client for account, market data, and order endpoints.

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;

use super::types::*;
use super::BrokerApi;

/// HTTP client for the local Client Portal gateway.
pub struct IbkrClient {
    client: Client,
    base_url: String,
}

impl IbkrClient {
    /// Create a new client from connection settings.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let config = ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        };
        Self::new(&config)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        self.send(path, self.client.get(&url)).await
    }

    /// Send a request, check the status, and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl BrokerApi for IbkrClient {
    async fn get_accounts(&self) -> Result<AccountsResponse, ApiError> {
        self.get_json("/iserver/accounts").await
    }

    async fn get_portfolio_subaccounts(&self) -> Result<Vec<Subaccount>, ApiError> {
        self.get_json("/portfolio/subaccounts").await
    }

    async fn get_account_ledger(&self, account_id: &str) -> Result<Ledger, ApiError> {
        self.get_json(&format!("/portfolio/{}/ledger", account_id))
            .await
    }

    async fn get_positions(
        &self,
        account_id: &str,
        page: u32,
    ) -> Result<Vec<PositionResponse>, ApiError> {
        self.get_json(&format!("/portfolio/{}/positions/{}", account_id, page))
            .await
    }

    async fn market_data_snapshot(
        &self,
        con_ids: &[ConId],
    ) -> Result<Vec<MarketDataSnapshot>, ApiError> {
        let conids = con_ids
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!(
            "/iserver/marketdata/snapshot?conids={}&fields={}",
            conids, FIELD_LAST_PRICE
        );

        let raw: Vec<RawSnapshot> = self.get_json(&path).await?;
        raw.into_iter().map(parse_snapshot).collect()
    }

    async fn market_data_history(
        &self,
        con_id: ConId,
        period: &str,
        bar: &str,
    ) -> Result<HistoryResponse, ApiError> {
        let path = "/iserver/marketdata/history";
        let url = self.url(path);
        debug!(url = %url, con_id, period, bar, "GET");

        let request = self.client.get(&url).query(&[
            ("conid", con_id.to_string()),
            ("period", period.to_string()),
            ("bar", bar.to_string()),
        ]);
        self.send(path, request).await
    }

    async fn place_order(
        &self,
        account_id: &str,
        order: &OrderRequest,
    ) -> Result<Vec<PlaceOrderReply>, ApiError> {
        let path = format!("/iserver/account/{}/orders", account_id);
        let url = self.url(&path);
        debug!(url = %url, ticker = %order.ticker, side = %order.side, "POST");

        let body = PlaceOrdersRequest {
            orders: vec![order.clone()],
        };
        self.send(&path, self.client.post(&url).json(&body)).await
    }

    async fn get_live_orders(&self) -> Result<LiveOrdersResponse, ApiError> {
        self.get_json("/iserver/account/orders").await
    }
}

/// Interpret field 31: a "C" prefix marks the prior close (no trading),
/// an "H" prefix marks a halt.
pub(crate) fn parse_snapshot(raw: RawSnapshot) -> Result<MarketDataSnapshot, ApiError> {
    let invalid = |value: String| ApiError::InvalidField {
        endpoint: "/iserver/marketdata/snapshot".to_string(),
        field: "31",
        value,
    };

    let value = raw.last_price.ok_or_else(|| invalid(String::new()))?;
    let trimmed = value.trim();

    let (price, trading_active, trading_halted) = if let Some(rest) = trimmed.strip_prefix('C') {
        (rest, false, false)
    } else if let Some(rest) = trimmed.strip_prefix('H') {
        (rest, true, true)
    } else {
        (trimmed, true, false)
    };

    let last_price =
        Decimal::from_str(&price.replace(',', "")).map_err(|_| invalid(value.clone()))?;

    Ok(MarketDataSnapshot {
        con_id: raw.conid,
        last_price,
        trading_active,
        trading_halted,
    })
}
