//! Bidirectional symbol / contract id lookup.

use std::collections::HashMap;

use crate::api::ConId;
use crate::error::{AdapterError, Result};

/// Symbol to contract id mapping that can also be read backwards.
///
/// Both directions are filled by the same `insert`, and a contract id can
/// belong to only one symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractMap {
    by_symbol: HashMap<String, ConId>,
    by_con_id: HashMap<ConId, String>,
}

impl ContractMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(symbol, con_id)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ConId)>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (symbol, con_id) in pairs {
            map.insert(symbol, con_id)?;
        }
        Ok(map)
    }

    /// Map a symbol to a contract id.
    ///
    /// Re-mapping a symbol moves it to the new id. Mapping an id that already
    /// belongs to a different symbol fails.
    pub fn insert(&mut self, symbol: impl Into<String>, con_id: ConId) -> Result<()> {
        let symbol = symbol.into();

        if let Some(existing) = self.by_con_id.get(&con_id) {
            if *existing != symbol {
                return Err(AdapterError::DuplicateContractId {
                    con_id,
                    existing: existing.clone(),
                    duplicate: symbol,
                });
            }
            return Ok(());
        }

        if let Some(old) = self.by_symbol.insert(symbol.clone(), con_id) {
            self.by_con_id.remove(&old);
        }
        self.by_con_id.insert(con_id, symbol);
        Ok(())
    }

    pub fn con_id(&self, symbol: &str) -> Option<ConId> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn symbol(&self, con_id: ConId) -> Option<&str> {
        self.by_con_id.get(&con_id).map(String::as_str)
    }

    /// All contract ids, sorted so requests are deterministic.
    pub fn con_ids(&self) -> Vec<ConId> {
        let mut ids: Vec<ConId> = self.by_con_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

impl TryFrom<HashMap<String, ConId>> for ContractMap {
    type Error = AdapterError;

    fn try_from(map: HashMap<String, ConId>) -> Result<Self> {
        Self::from_pairs(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_lookup_both_directions() {
        let map = ContractMap::from_pairs([("AAPL", 265598), ("MSFT", 272093)]).unwrap();

        assert_eq!(map.con_id("AAPL"), Some(265598));
        assert_eq!(map.symbol(272093), Some("MSFT"));
        assert_eq!(map.con_ids(), vec![265598, 272093]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_duplicate_con_id_rejected() {
        let err = ContractMap::from_pairs([("AAPL", 265598), ("APPLE", 265598)]).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::DuplicateContractId { con_id: 265598, .. }
        ));
    }

    #[test]
    fn test_same_pair_twice_is_fine() {
        let map = assert_ok!(ContractMap::from_pairs([("AAPL", 265598), ("AAPL", 265598)]));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remap_symbol_drops_old_id() {
        let mut map = ContractMap::new();
        assert_ok!(map.insert("AAPL", 1));
        assert_ok!(map.insert("AAPL", 2));
        assert_err!(map.insert("MSFT", 2));

        assert_eq!(map.symbol(1), None);
        assert_eq!(map.symbol(2), Some("AAPL"));
        assert_eq!(map.con_ids(), vec![2]);
    }
}
