//! Market snapshot model: last prices and trading state per symbol.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Last traded price per symbol.
pub type Pricing = HashMap<String, Decimal>;

/// Whether a symbol can currently be traded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradingState {
    #[default]
    Open,
    Closed,
    Halted,
}

impl TradingState {
    /// Derive the state from the broker's two status flags.
    ///
    /// A halt always wins over the inactive flag.
    pub fn derive(inactive: bool, halted: bool) -> Self {
        let mut state = TradingState::Open;
        if inactive {
            state = TradingState::Closed;
        }
        if halted {
            state = TradingState::Halted;
        }
        state
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradingState::Open => "OPEN",
            TradingState::Closed => "CLOSED",
            TradingState::Halted => "HALTED",
        }
    }
}

/// Point-in-time view of prices and trading states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Last price per symbol
    #[serde(default)]
    pub pricing: Pricing,

    /// Trading state per symbol
    #[serde(default)]
    pub trading_state: HashMap<String, TradingState>,
}

impl MarketSnapshot {
    /// Get the last price for a symbol.
    pub fn price_for(&self, symbol: &str) -> Option<Decimal> {
        self.pricing.get(symbol).copied()
    }

    /// Get the trading state for a symbol.
    pub fn state_for(&self, symbol: &str) -> Option<TradingState> {
        self.trading_state.get(symbol).copied()
    }

    /// Check if a symbol is present and open for trading.
    pub fn is_tradeable(&self, symbol: &str) -> bool {
        self.state_for(symbol) == Some(TradingState::Open)
    }

    /// Number of symbols in the snapshot.
    pub fn len(&self) -> usize {
        self.pricing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pricing.is_empty()
    }
}
