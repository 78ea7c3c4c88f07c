//! Market data models

use crate::{MarketSymbol, Price};
use serde::{Deserialize, Serialize};

/// Last traded price for a symbol, refreshed per poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub symbol: MarketSymbol,
    /// `None` when the venue has no last trade to report
    pub last: Option<Price>,
}

impl TickerSnapshot {
    pub fn new(symbol: MarketSymbol, last: Option<Price>) -> Self {
        Self { symbol, last }
    }
}
