//! Position model representing an account's holding in one security.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current holding in a single security.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Security identifier (ticker)
    pub security: String,

    /// Signed quantity held; negative for short positions
    pub amount: Decimal,

    /// Last known market price per unit
    pub price: Decimal,
}

impl Position {
    /// Create a new position.
    pub fn new(security: impl Into<String>, amount: Decimal, price: Decimal) -> Self {
        Self {
            security: security.into(),
            amount,
            price,
        }
    }

    /// Market value of the holding at the last known price.
    pub fn market_value(&self) -> Decimal {
        self.amount * self.price
    }

    /// Check if this is a short position.
    pub fn is_short(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}
