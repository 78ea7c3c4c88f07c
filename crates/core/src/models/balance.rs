//! Account balance models

use crate::Quantity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Free balances keyed by asset symbol.
///
/// Each poll produces a fresh snapshot that replaces the previous one;
/// snapshots are never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    free: HashMap<String, Quantity>,
}

impl BalanceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly used by venue adapters while mapping a response
    pub fn with_free(mut self, asset: &str, quantity: f64) -> Self {
        self.insert(asset, quantity);
        self
    }

    /// Record the free quantity of an asset. Negative values are clamped to zero.
    pub fn insert(&mut self, asset: &str, quantity: f64) {
        self.free
            .insert(asset.to_ascii_uppercase(), Quantity::new(quantity.max(0.0)));
    }

    /// Free quantity of `asset`. An asset missing from the snapshot holds zero.
    pub fn free(&self, asset: &str) -> Quantity {
        self.free
            .get(&asset.to_ascii_uppercase())
            .copied()
            .unwrap_or(Quantity::ZERO)
    }

    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

impl FromIterator<(String, f64)> for BalanceSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (asset, quantity) in iter {
            snapshot.insert(&asset, quantity);
        }
        snapshot
    }
}
