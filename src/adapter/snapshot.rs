//! Market snapshot from the batch snapshot endpoint.

use std::collections::HashMap;

use tracing::debug;

use crate::api::{BrokerApi, ConId, MarketDataSnapshot};
use crate::error::{AdapterError, Result};
use crate::models::{MarketSnapshot, TradingState};

use super::contracts::ContractMap;
use super::IbkrAdapter;

impl<B: BrokerApi> IbkrAdapter<B> {
    /// Last prices and trading states for every contract in `contracts`.
    pub async fn get_market_snapshot(&self, contracts: &ContractMap) -> Result<MarketSnapshot> {
        if contracts.is_empty() {
            return Ok(MarketSnapshot::default());
        }

        let con_ids = contracts.con_ids();
        let snapshots = self
            .call(self.config.snapshot, "market data snapshot", || {
                self.broker.market_data_snapshot(&con_ids)
            })
            .await?;

        debug!(
            requested = con_ids.len(),
            returned = snapshots.len(),
            "Fetched market snapshot"
        );

        build_market_snapshot(contracts, &snapshots)
    }

    /// Same as [`get_market_snapshot`](Self::get_market_snapshot) for a plain
    /// symbol to contract id map.
    pub async fn get_market_snapshot_for(
        &self,
        symbols: &HashMap<String, ConId>,
    ) -> Result<MarketSnapshot> {
        let contracts = ContractMap::from_pairs(symbols.iter().map(|(s, c)| (s.clone(), *c)))?;
        self.get_market_snapshot(&contracts).await
    }
}

/// Key each snapshot by its symbol. A contract id missing from `contracts`
/// means the response does not match the request and fails the whole call.
pub fn build_market_snapshot(
    contracts: &ContractMap,
    snapshots: &[MarketDataSnapshot],
) -> Result<MarketSnapshot> {
    let mut market = MarketSnapshot::default();

    for snap in snapshots {
        let symbol = contracts
            .symbol(snap.con_id)
            .ok_or(AdapterError::UnknownContractId(snap.con_id))?;

        let state = TradingState::derive(!snap.trading_active, snap.trading_halted);

        market.pricing.insert(symbol.to_string(), snap.last_price);
        market.trading_state.insert(symbol.to_string(), state);
    }

    Ok(market)
}
