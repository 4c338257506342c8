//! Order submission and live order retrieval.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::api::{BrokerApi, ConId, LiveOrder, OrderRequest, PlaceOrderReply};
use crate::error::{AdapterError, ApiError, Result};
use crate::models::{Order, OrderSide, OrderStatus, OrderType, TimeInForce};

use super::contracts::ContractMap;
use super::IbkrAdapter;

impl<B: BrokerApi> IbkrAdapter<B> {
    /// Submit an order by ticker and return the broker's order id.
    ///
    /// The gateway only resolves unambiguous stock tickers; use
    /// [`execute_contract_order`](Self::execute_contract_order) for anything
    /// else. Runs under `AdapterConfig::place_order`, which defaults to a
    /// single attempt.
    pub async fn execute_order(&self, account_id: &str, order: &Order) -> Result<String> {
        self.submit_order(account_id, order, None).await
    }

    /// Submit an order with the contract id looked up from `contracts`.
    pub async fn execute_contract_order(
        &self,
        account_id: &str,
        order: &Order,
        contracts: &ContractMap,
    ) -> Result<String> {
        let con_id = contracts
            .con_id(&order.security)
            .ok_or_else(|| AdapterError::UnknownSymbol(order.security.clone()))?;

        self.submit_order(account_id, order, Some(con_id)).await
    }

    async fn submit_order(
        &self,
        account_id: &str,
        order: &Order,
        con_id: Option<ConId>,
    ) -> Result<String> {
        let request = to_order_request(account_id, order, con_id)?;

        let replies = self
            .call(self.config.place_order, "place order", || {
                self.broker.place_order(account_id, &request)
            })
            .await?;

        let order_id = acknowledged_order_id(replies)?;

        info!(
            account_id,
            order_id = %order_id,
            security = %order.security,
            con_id,
            side = %order.side,
            amount = %order.amount,
            "Order submitted"
        );

        Ok(order_id)
    }

    /// Live orders for the session, with normalized statuses.
    pub async fn get_orders(&self) -> Result<Vec<Order>> {
        let response = self
            .call(self.config.live_orders, "live orders", || {
                self.broker.get_live_orders()
            })
            .await?;

        let total = response.orders.len();
        let orders: Vec<Order> = response
            .orders
            .into_iter()
            .filter_map(from_live_order)
            .collect();

        debug!(total, translated = orders.len(), "Fetched live orders");
        Ok(orders)
    }
}

/// Build the broker submission for a domain order.
///
/// The broker takes the quantity as a JSON number, so the amount goes
/// through `f64`; digits beyond its precision are lost.
pub fn to_order_request(
    account_id: &str,
    order: &Order,
    con_id: Option<ConId>,
) -> Result<OrderRequest> {
    if order.amount <= Decimal::ZERO {
        return Err(AdapterError::InvalidQuantity(order.amount));
    }
    let quantity = order
        .amount
        .to_f64()
        .filter(|q| q.is_finite())
        .ok_or(AdapterError::InvalidQuantity(order.amount))?;

    Ok(OrderRequest {
        acct_id: account_id.to_string(),
        conid: con_id,
        ticker: order.security.clone(),
        order_type: order.order_type.as_str().to_string(),
        side: order.side.as_str().to_string(),
        tif: order.time_in_force.as_str().to_string(),
        quantity,
    })
}

/// First order id in the submission reply. Replies without one are
/// confirmation prompts and fail with their messages.
pub fn acknowledged_order_id(replies: Vec<PlaceOrderReply>) -> Result<String> {
    let mut messages = Vec::new();

    for reply in replies {
        if let Some(id) = reply.order_id {
            return Ok(id);
        }
        messages.extend(reply.message);
    }

    Err(ApiError::OrderNotAcknowledged { messages }.into())
}

/// Translate a live order. The amount is the original size
/// (remaining + filled), not what is left to fill.
///
/// Returns `None` for records whose side cannot be read.
pub fn from_live_order(o: LiveOrder) -> Option<Order> {
    let side = match o.side.parse::<OrderSide>() {
        Ok(side) => side,
        Err(_) => {
            warn!(order_id = o.order_id, side = %o.side, "Unknown order side, skipping");
            return None;
        }
    };

    Some(Order {
        side,
        security: o.ticker,
        order_type: OrderType(o.order_type),
        amount: o.remaining_quantity + o.filled_quantity,
        time_in_force: TimeInForce(o.time_in_force),
        status: Some(OrderStatus::from_broker(&o.status)),
        id: Some(o.order_id.to_string()),
    })
}
