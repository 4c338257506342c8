//! Wire types for the Interactive Brokers Client Portal Web API.
//!
//! Decimal fields are read from the JSON number text, or from a string, so
//! no broker amount passes through `f64` on the way in.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broker-internal numeric contract identifier.
pub type ConId = i64;

/// Snapshot field holding the last price.
pub const FIELD_LAST_PRICE: &str = "31";

/// Entries per page on the positions endpoint.
pub const POSITIONS_PAGE_SIZE: usize = 100;

/// Response from /iserver/accounts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub selected_account: Option<String>,
}

/// Entry from /portfolio/subaccounts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subaccount {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub currency: String,
    #[serde(rename = "type", default)]
    pub account_type: String,
}

/// One currency row of /portfolio/{accountId}/ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "cashbalance", default, with = "rust_decimal::serde::arbitrary_precision")]
    pub cash_balance: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(rename = "netliquidationvalue", default, with = "rust_decimal::serde::arbitrary_precision")]
    pub net_liquidation_value: Decimal,
}

/// Ledger keyed by currency; "BASE" aggregates into the base currency.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    pub entries: HashMap<String, LedgerEntry>,
}

impl Ledger {
    pub const BASE: &'static str = "BASE";

    pub fn base(&self) -> Option<&LedgerEntry> {
        self.entries.get(Self::BASE)
    }
}

/// Entry from /portfolio/{accountId}/positions/{pageId}.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionResponse {
    #[serde(default)]
    pub acct_id: String,
    pub conid: ConId,
    #[serde(default)]
    pub contract_desc: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub position: Decimal,
    #[serde(rename = "mktPrice", default, with = "rust_decimal::serde::arbitrary_precision")]
    pub market_price: Decimal,
    #[serde(rename = "mktValue", default, with = "rust_decimal::serde::arbitrary_precision")]
    pub market_value: Decimal,
    #[serde(default)]
    pub currency: String,
}

impl PositionResponse {
    /// Ticker, or the contract description when the broker sent no ticker.
    pub fn security(&self) -> &str {
        if self.ticker.is_empty() {
            &self.contract_desc
        } else {
            &self.ticker
        }
    }
}

/// Raw entry from /iserver/marketdata/snapshot; fields are keyed by number.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSnapshot {
    pub conid: ConId,
    #[serde(rename = "31", default)]
    pub last_price: Option<String>,
}

/// Snapshot with the last-price prefixes already interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDataSnapshot {
    pub con_id: ConId,
    pub last_price: Decimal,
    pub trading_active: bool,
    pub trading_halted: bool,
}

/// Response from /iserver/marketdata/history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub data: Vec<HistoryBar>,
}

/// One bar of history; `t` is seconds since the Unix epoch.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryBar {
    pub t: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub o: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub h: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub l: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub c: Decimal,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    pub v: Decimal,
}

/// Single order in a submission request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub acct_id: String,
    /// Contract id; the gateway resolves the instrument by `ticker` alone
    /// only for unambiguous stock symbols
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conid: Option<ConId>,
    pub ticker: String,
    pub order_type: String,
    pub side: String,
    pub tif: String,
    pub quantity: f64,
}

/// Body of POST /iserver/account/{accountId}/orders.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrdersRequest {
    pub orders: Vec<OrderRequest>,
}

/// Entry of the order submission reply.
///
/// A confirmation prompt comes back with `id` and `message` instead of `order_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderReply {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub message: Vec<String>,
}

/// Response from /iserver/account/orders.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveOrdersResponse {
    #[serde(default)]
    pub orders: Vec<LiveOrder>,
    #[serde(default)]
    pub snapshot: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveOrder {
    #[serde(default)]
    pub acct: String,
    pub order_id: i64,
    #[serde(default)]
    pub conid: Option<ConId>,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub time_in_force: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    pub remaining_quantity: Decimal,
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision")]
    pub filled_quantity: Decimal,
}
