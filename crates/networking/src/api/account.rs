//! Account and market data conversions

use super::{BalanceData, TickerData};
use liquidator_core::{BalanceSnapshot, Error, MarketSymbol, Price, Result, TickerSnapshot};

/// OKX spot instrument id for a symbol (`GRASS/USDT` -> `GRASS-USDT`)
pub fn inst_id(symbol: &MarketSymbol) -> String {
    format!("{}-{}", symbol.base(), symbol.quote())
}

/// Collapse the account balance response into free quantities per currency
pub fn balance_from_wire(data: Vec<BalanceData>) -> BalanceSnapshot {
    data.into_iter()
        .flat_map(|account| account.details)
        .map(|detail| (detail.ccy, detail.avail_bal))
        .collect()
}

/// Pick the ticker for `symbol` out of the response
pub fn ticker_from_wire(symbol: &MarketSymbol, data: Vec<TickerData>) -> Result<TickerSnapshot> {
    let expected = inst_id(symbol);
    let ticker = data
        .into_iter()
        .find(|t| t.inst_id.eq_ignore_ascii_case(&expected))
        .ok_or_else(|| Error::InvalidData(format!("no ticker returned for {}", expected)))?;

    let last = ticker.last.filter(|p| *p > 0.0).map(Price::new);
    Ok(TickerSnapshot::new(symbol.clone(), last))
}
