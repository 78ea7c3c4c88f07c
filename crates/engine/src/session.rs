//! Liquidation session state
//!
//! A session is an immutable value. Every step of the engine produces a
//! new session instead of mutating the old one, so each transition can be
//! checked in isolation.

use liquidator_core::{
    Error, MarketSymbol, OrderRequest, OrderResult, Price, Quantity, Result,
};
use serde::Deserialize;

/// What to liquidate and when
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiquidationConfig {
    /// Market to sell on; the base asset is the one being watched
    #[serde(default = "default_symbol")]
    pub symbol: MarketSymbol,
    /// Free balance at which a session starts
    #[serde(default = "default_entry_threshold")]
    pub entry_threshold: f64,
    /// Remaining balance required to place another order
    #[serde(default = "default_execution_threshold")]
    pub execution_threshold: f64,
    /// Decimal places the session price is floored to
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
}

fn default_symbol() -> MarketSymbol { MarketSymbol::new("GRASS", "USDT") }
fn default_entry_threshold() -> f64 { 3.0 }
fn default_execution_threshold() -> f64 { 5.0 }
fn default_price_decimals() -> u32 { 3 }

impl Default for LiquidationConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            entry_threshold: default_entry_threshold(),
            execution_threshold: default_execution_threshold(),
            price_decimals: default_price_decimals(),
        }
    }
}

impl LiquidationConfig {
    pub fn entry_threshold(&self) -> Quantity {
        Quantity::new(self.entry_threshold)
    }

    pub fn execution_threshold(&self) -> Quantity {
        Quantity::new(self.execution_threshold)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.entry_threshold > 0.0) {
            return Err(Error::InvalidData(format!(
                "entry_threshold must be positive, got {}",
                self.entry_threshold
            )));
        }
        if !(self.execution_threshold > 0.0) {
            return Err(Error::InvalidData(format!(
                "execution_threshold must be positive, got {}",
                self.execution_threshold
            )));
        }
        if self.price_decimals > 12 {
            return Err(Error::InvalidData(format!(
                "price_decimals {} is out of range",
                self.price_decimals
            )));
        }
        Ok(())
    }
}

/// State of one liquidation attempt
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidationSession {
    symbol: MarketSymbol,
    execution_threshold: Quantity,
    /// Fixed when the session opens; every order in the session uses it
    price: Price,
    remaining: Quantity,
    orders_placed: u32,
    total_filled: Quantity,
    total_proceeds: f64,
}

impl LiquidationSession {
    /// Open a session for `free` units at the observed `last_price`
    pub fn open(config: &LiquidationConfig, free: Quantity, last_price: Price) -> Self {
        Self {
            symbol: config.symbol.clone(),
            execution_threshold: config.execution_threshold(),
            price: last_price.floor_to(config.price_decimals),
            remaining: free,
            orders_placed: 0,
            total_filled: Quantity::ZERO,
            total_proceeds: 0.0,
        }
    }

    pub fn symbol(&self) -> &MarketSymbol {
        &self.symbol
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn remaining(&self) -> Quantity {
        self.remaining
    }

    pub fn orders_placed(&self) -> u32 {
        self.orders_placed
    }

    pub fn total_filled(&self) -> Quantity {
        self.total_filled
    }

    pub fn total_proceeds(&self) -> f64 {
        self.total_proceeds
    }

    /// Whether another order may be placed
    pub fn can_execute(&self) -> bool {
        self.remaining >= self.execution_threshold
    }

    pub fn is_drained(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Sell everything that remains at the session price
    pub fn next_order(&self) -> OrderRequest {
        OrderRequest::ioc_limit_sell(self.symbol.clone(), self.remaining, self.price)
    }

    /// Account for a polled order result. `remaining` is left alone; the
    /// caller decides whether it drains, resyncs, or retries.
    pub fn record(&self, result: &OrderResult) -> Self {
        Self {
            orders_placed: self.orders_placed + 1,
            total_filled: Quantity::new(self.total_filled.as_f64() + result.filled.as_f64()),
            total_proceeds: self.total_proceeds + result.cost,
            ..self.clone()
        }
    }

    /// Replace the remaining quantity, e.g. with the venue's latest free balance
    pub fn with_remaining(&self, remaining: Quantity) -> Self {
        Self {
            remaining,
            ..self.clone()
        }
    }

    pub fn drained(&self) -> Self {
        self.with_remaining(Quantity::ZERO)
    }
}
