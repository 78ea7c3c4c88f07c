//! Shared type definitions and newtypes

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Asset quantity (for clarity in function signatures)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Quantity(pub f64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0.0);

    pub fn new(amount: f64) -> Self {
        Quantity(amount)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 <= 0.0
    }

    /// Truncate toward zero at `decimals` places (never rounds up)
    pub fn truncated(&self, decimals: u32) -> Self {
        Quantity(floor_to_decimals(self.0, decimals))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price per unit in quote currency
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Price(pub f64);

impl Price {
    pub fn new(price: f64) -> Self {
        Price(price)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Floor to `decimals` places. A sell limit is never placed above the observed price.
    pub fn floor_to(&self, decimals: u32) -> Self {
        Price(floor_to_decimals(self.0, decimals))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spot market symbol in `BASE/QUOTE` form (e.g. `GRASS/USDT`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarketSymbol {
    base: String,
    quote: String,
}

impl MarketSymbol {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_ascii_uppercase(),
            quote: quote.to_ascii_uppercase(),
        }
    }

    /// The asset being liquidated
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The asset received as proceeds
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl FromStr for MarketSymbol {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let (base, quote) = raw
            .trim()
            .split_once('/')
            .ok_or_else(|| Error::InvalidData(format!("symbol '{}' is not BASE/QUOTE", raw)))?;

        if base.is_empty() || quote.is_empty() {
            return Err(Error::InvalidData(format!(
                "symbol '{}' has an empty base or quote",
                raw
            )));
        }

        Ok(Self::new(base, quote))
    }
}

impl TryFrom<String> for MarketSymbol {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        raw.parse()
    }
}

impl From<MarketSymbol> for String {
    fn from(symbol: MarketSymbol) -> Self {
        symbol.to_string()
    }
}

impl fmt::Display for MarketSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Floor a float to a fixed number of decimal places
pub fn floor_to_decimals(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).floor() / factor
}
