//! Account model: cash balance plus positions keyed by security.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::position::Position;

/// Trading account state built from a broker ledger and position list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Cash balance in the account's base currency
    pub cash: Decimal,

    /// Open positions keyed by security identifier
    #[serde(default)]
    pub positions: HashMap<String, Position>,
}

impl Account {
    /// Create an empty account with no cash and no positions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add cash to the account.
    pub fn deposit(&mut self, amount: Decimal) {
        self.cash += amount;
    }

    /// Insert a position, replacing any previous entry for the same security.
    pub fn set_position(&mut self, position: Position) -> Option<Position> {
        self.positions.insert(position.security.clone(), position)
    }

    /// Get the position held in a security, if any.
    pub fn position(&self, security: &str) -> Option<&Position> {
        self.positions.get(security)
    }

    /// Cash plus the market value of every position.
    pub fn equity(&self) -> Decimal {
        self.cash
            + self
                .positions
                .values()
                .map(Position::market_value)
                .sum::<Decimal>()
    }
}
