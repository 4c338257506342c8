//! Order model and the broker-independent order enums.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" | "B" => Ok(OrderSide::Buy),
            "SELL" | "S" => Ok(OrderSide::Sell),
            other => Err(format!("unknown order side: {other}")),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Order type, carried to and from the broker as a literal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderType(pub String);

impl OrderType {
    pub fn market() -> Self {
        Self("MKT".to_string())
    }

    pub fn limit() -> Self {
        Self("LMT".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Time-in-force, carried to and from the broker as a literal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeInForce(pub String);

impl TimeInForce {
    pub fn day() -> Self {
        Self("DAY".to_string())
    }

    pub fn good_till_cancelled() -> Self {
        Self("GTC".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TimeInForce {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Normalized order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Filled,
    Pending,
    Cancelled,
    Other,
}

impl OrderStatus {
    /// Map a broker status string to a normalized status.
    ///
    /// Unknown strings map to `Other`, so this never fails.
    pub fn from_broker(status: &str) -> Self {
        match status {
            "Filled" => OrderStatus::Filled,
            "Inactive" | "PendingSubmit" | "PreSubmitted" | "Submitted" => OrderStatus::Pending,
            "PendingCancel" | "Cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Filled => "FILLED",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Other => "OTHER",
        }
    }

    /// Check if the order can still be filled.
    pub fn is_open(&self) -> bool {
        *self == OrderStatus::Pending
    }
}

/// Order as seen by the trading domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Buy or sell
    pub side: OrderSide,

    /// Security identifier (ticker)
    pub security: String,

    /// Order type literal (e.g. "MKT", "LMT")
    #[serde(rename = "type")]
    pub order_type: OrderType,

    /// Requested quantity; for retrieved orders the original size
    pub amount: Decimal,

    /// Time-in-force literal (e.g. "DAY")
    pub time_in_force: TimeInForce,

    /// Normalized status, set only on orders read back from the broker
    #[serde(default)]
    pub status: Option<OrderStatus>,

    /// Broker-assigned order id, set only on orders read back from the broker
    #[serde(default)]
    pub id: Option<String>,
}

impl Order {
    /// Create a new order to submit.
    pub fn new(
        side: OrderSide,
        security: impl Into<String>,
        order_type: OrderType,
        amount: Decimal,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            side,
            security: security.into(),
            order_type,
            amount,
            time_in_force,
            status: None,
            id: None,
        }
    }

    /// Day market order.
    pub fn market(side: OrderSide, security: impl Into<String>, amount: Decimal) -> Self {
        Self::new(side, security, OrderType::market(), amount, TimeInForce::day())
    }
}
