//! In-memory broker and sleeper used by the adapter tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;

use crate::api::*;
use crate::error::ApiError;

use super::retry::Sleeper;

/// Records requested sleeps instead of sleeping.
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    pub(crate) sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub(crate) fn unavailable(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "service unavailable".to_string(),
    }
}

/// Scripted broker. Each `*_failures` count makes that many leading calls fail.
#[derive(Default)]
pub(crate) struct StubBroker {
    pub(crate) accounts_failures: u32,
    pub(crate) subaccounts_failures: u32,
    pub(crate) snapshot_failures: u32,
    pub(crate) fail_ledger: bool,
    pub(crate) fail_positions: bool,
    pub(crate) fail_history: bool,
    pub(crate) fail_place_order: bool,
    pub(crate) fail_live_orders: bool,

    /// Cash for the BASE ledger row; `None` leaves the row out
    pub(crate) base_cash: Option<Decimal>,
    pub(crate) positions: Vec<PositionResponse>,
    /// Answer every positions page with the first page, as a gateway that
    /// ignores the page index would
    pub(crate) repeat_positions_page: bool,
    pub(crate) snapshots: Vec<MarketDataSnapshot>,
    pub(crate) history: Vec<HistoryBar>,
    pub(crate) order_replies: Vec<PlaceOrderReply>,
    pub(crate) live_orders: Vec<LiveOrder>,

    pub(crate) calls: Mutex<Vec<&'static str>>,
    pub(crate) placed: Mutex<Vec<OrderRequest>>,
    pub(crate) snapshot_requests: Mutex<Vec<Vec<ConId>>>,
    pub(crate) history_requests: Mutex<Vec<(ConId, String, String)>>,
}

impl StubBroker {
    /// Record a call and return how many times `name` has now been called.
    fn record(&self, name: &'static str) -> u32 {
        let mut calls = self.calls.lock().unwrap();
        calls.push(name);
        calls.iter().filter(|c| **c == name).count() as u32
    }

    pub(crate) fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    pub(crate) fn call_log(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrokerApi for StubBroker {
    async fn get_accounts(&self) -> Result<AccountsResponse, ApiError> {
        if self.record("accounts") <= self.accounts_failures {
            return Err(unavailable("/iserver/accounts"));
        }
        Ok(AccountsResponse {
            accounts: vec!["U123".to_string()],
            selected_account: Some("U123".to_string()),
        })
    }

    async fn get_portfolio_subaccounts(&self) -> Result<Vec<Subaccount>, ApiError> {
        if self.record("subaccounts") <= self.subaccounts_failures {
            return Err(unavailable("/portfolio/subaccounts"));
        }
        Ok(vec![Subaccount {
            id: "U123".to_string(),
            account_id: "U123".to_string(),
            currency: "USD".to_string(),
            account_type: "INDIVIDUAL".to_string(),
        }])
    }

    async fn get_account_ledger(&self, _account_id: &str) -> Result<Ledger, ApiError> {
        self.record("ledger");
        if self.fail_ledger {
            return Err(unavailable("/portfolio/U123/ledger"));
        }

        let mut entries = HashMap::new();
        if let Some(cash) = self.base_cash {
            entries.insert(
                Ledger::BASE.to_string(),
                LedgerEntry {
                    cash_balance: cash,
                    currency: "BASE".to_string(),
                    net_liquidation_value: Decimal::ZERO,
                },
            );
        }
        Ok(Ledger { entries })
    }

    async fn get_positions(
        &self,
        _account_id: &str,
        page: u32,
    ) -> Result<Vec<PositionResponse>, ApiError> {
        self.record("positions");
        if self.fail_positions {
            return Err(unavailable("/portfolio/U123/positions/0"));
        }

        let page = if self.repeat_positions_page { 0 } else { page };
        Ok(self
            .positions
            .chunks(POSITIONS_PAGE_SIZE)
            .nth(page as usize)
            .map(<[PositionResponse]>::to_vec)
            .unwrap_or_default())
    }

    async fn market_data_snapshot(
        &self,
        con_ids: &[ConId],
    ) -> Result<Vec<MarketDataSnapshot>, ApiError> {
        self.snapshot_requests.lock().unwrap().push(con_ids.to_vec());
        if self.record("snapshot") <= self.snapshot_failures {
            return Err(unavailable("/iserver/marketdata/snapshot"));
        }
        Ok(self.snapshots.clone())
    }

    async fn market_data_history(
        &self,
        con_id: ConId,
        period: &str,
        bar: &str,
    ) -> Result<HistoryResponse, ApiError> {
        self.record("history");
        self.history_requests.lock().unwrap().push((
            con_id,
            period.to_string(),
            bar.to_string(),
        ));
        if self.fail_history {
            return Err(unavailable("/iserver/marketdata/history"));
        }
        Ok(HistoryResponse {
            symbol: "AAPL".to_string(),
            data: self.history.clone(),
        })
    }

    async fn place_order(
        &self,
        _account_id: &str,
        order: &OrderRequest,
    ) -> Result<Vec<PlaceOrderReply>, ApiError> {
        self.record("place_order");
        self.placed.lock().unwrap().push(order.clone());
        if self.fail_place_order {
            return Err(unavailable("/iserver/account/U123/orders"));
        }
        Ok(self.order_replies.clone())
    }

    async fn get_live_orders(&self) -> Result<LiveOrdersResponse, ApiError> {
        self.record("live_orders");
        if self.fail_live_orders {
            return Err(unavailable("/iserver/account/orders"));
        }
        Ok(LiveOrdersResponse {
            orders: self.live_orders.clone(),
            snapshot: true,
        })
    }
}

pub(crate) fn position(ticker: &str, quantity: Decimal, price: Decimal) -> PositionResponse {
    PositionResponse {
        acct_id: "U123".to_string(),
        conid: 0,
        contract_desc: ticker.to_string(),
        ticker: ticker.to_string(),
        position: quantity,
        market_price: price,
        market_value: quantity * price,
        currency: "USD".to_string(),
    }
}

pub(crate) fn snapshot(con_id: ConId, price: Decimal, active: bool, halted: bool) -> MarketDataSnapshot {
    MarketDataSnapshot {
        con_id,
        last_price: price,
        trading_active: active,
        trading_halted: halted,
    }
}
